use raceway::{Component, InPort, OutPort, Readiness};
use std::ops::Not;

/// Inverts every value it receives, using the `!` operator.
pub struct Invert<T> {
    readiness: Readiness,
    pub input: InPort<T>,
    pub output: OutPort<T>,
}

impl<T: Not<Output = T> + Send + 'static> Invert<T> {
    pub fn new() -> Self {
        let readiness = Readiness::new();
        Self {
            input: InPort::new(&readiness),
            output: OutPort::new(),
            readiness,
        }
    }
}

impl<T: Not<Output = T> + Send + 'static> Default for Invert<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Not<Output = T> + Send + 'static> Component for Invert<T> {
    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn run(&mut self) {
        if let Some(value) = self.input.receive() {
            self.output.send(!value);
        }
    }
}

/// Converts between types via `From`.
pub struct Convert<A, B> {
    readiness: Readiness,
    pub input: InPort<A>,
    pub output: OutPort<B>,
}

impl<A, B> Convert<A, B>
where
    A: Send + 'static,
    B: From<A> + Send + 'static,
{
    pub fn new() -> Self {
        let readiness = Readiness::new();
        Self {
            input: InPort::new(&readiness),
            output: OutPort::new(),
            readiness,
        }
    }
}

impl<A, B> Default for Convert<A, B>
where
    A: Send + 'static,
    B: From<A> + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B> Component for Convert<A, B>
where
    A: Send + 'static,
    B: From<A> + Send + 'static,
{
    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn run(&mut self) {
        if let Some(value) = self.input.receive() {
            self.output.send(B::from(value));
        }
    }
}
