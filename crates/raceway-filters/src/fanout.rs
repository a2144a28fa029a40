use raceway::{Component, InPort, OutPort, Readiness};
use std::array;

/// One-to-many: every received value is sent to all `N` outputs.
pub struct Split<T, const N: usize> {
    readiness: Readiness,
    pub input: InPort<T>,
    pub outputs: [OutPort<T>; N],
}

impl<T: Clone + Send + 'static, const N: usize> Split<T, N> {
    pub fn new() -> Self {
        let readiness = Readiness::new();
        Self {
            input: InPort::new(&readiness),
            outputs: array::from_fn(|_| OutPort::new()),
            readiness,
        }
    }
}

impl<T: Clone + Send + 'static, const N: usize> Default for Split<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static, const N: usize> Component for Split<T, N> {
    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn run(&mut self) {
        if let Some(value) = self.input.receive() {
            for output in &self.outputs {
                output.send(value.clone());
            }
        }
    }
}

/// Many-to-one with priority.
///
/// The input with the lower index wins: inputs are handled depth-first, so
/// every pending value of an input is forwarded before the next input is
/// looked at.
pub struct Combine<T, const N: usize> {
    readiness: Readiness,
    pub inputs: [InPort<T>; N],
    pub output: OutPort<T>,
}

impl<T: Send + 'static, const N: usize> Combine<T, N> {
    pub fn new() -> Self {
        let readiness = Readiness::new();
        Self {
            inputs: array::from_fn(|_| InPort::new(&readiness)),
            output: OutPort::new(),
            readiness,
        }
    }
}

impl<T: Send + 'static, const N: usize> Default for Combine<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static, const N: usize> Component for Combine<T, N> {
    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn run(&mut self) {
        for input in &self.inputs {
            while let Some(value) = input.receive() {
                self.output.send(value);
            }
        }
    }
}
