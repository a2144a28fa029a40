use raceway::{Component, InPort, OutPort, Readiness};

/// Counts how many values arrive, wrapping at `range`.
///
/// The counter runs from 0 to `range - 1`; receiving another value at
/// `range - 1` wraps it to 0. The input is drained on every run and the
/// count is sent once per run when anything arrived, so a burst of inputs
/// produces a single output carrying the latest count.
pub struct Counter<T> {
    readiness: Readiness,
    pub input: InPort<T>,
    pub output: OutPort<u32>,
    count: u32,
    range: u32,
}

impl<T: Send + 'static> Counter<T> {
    pub fn new(range: u32) -> Self {
        let readiness = Readiness::new();
        Self {
            input: InPort::new(&readiness),
            output: OutPort::new(),
            readiness,
            count: 0,
            range,
        }
    }
}

impl<T: Send + 'static> Component for Counter<T> {
    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn run(&mut self) {
        let mut more = false;
        while self.input.receive().is_some() {
            self.count = self.count.wrapping_add(1);
            if self.count == self.range {
                self.count = 0;
            }
            more = true;
        }
        if more {
            self.output.send(self.count);
        }
    }
}

/// Counts up to `up_limit`, then down to `down_limit`, and repeats.
pub struct UpDownCounter<T> {
    readiness: Readiness,
    pub input: InPort<T>,
    pub output: OutPort<u32>,
    count: u32,
    up_limit: u32,
    down_limit: u32,
    up: bool,
}

impl<T: Send + 'static> UpDownCounter<T> {
    pub fn new(down_limit: u32, up_limit: u32, start_value: u32) -> Self {
        let readiness = Readiness::new();
        Self {
            input: InPort::new(&readiness),
            output: OutPort::new(),
            readiness,
            count: start_value,
            up_limit,
            down_limit,
            up: true,
        }
    }
}

impl<T: Send + 'static> Component for UpDownCounter<T> {
    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn run(&mut self) {
        let mut more = false;
        while self.input.receive().is_some() {
            if self.up {
                self.count = self.count.wrapping_add(1);
            } else {
                self.count = self.count.wrapping_sub(1);
            }

            if self.count == self.up_limit {
                self.up = false;
            } else if self.count == self.down_limit {
                self.up = true;
            }

            more = true;
        }

        if more {
            self.output.send(self.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raceway::connect;

    #[test]
    fn counts_a_burst_once() {
        let mut unit = Counter::<char>::new(u32::MAX);
        let stimulus = OutPort::new();
        let response = InPort::detached();
        let _wiring = [
            connect(&stimulus, &unit.input, 8),
            connect(&unit.output, &response, 1),
        ];

        for c in ['a', 'b', 'c'] {
            stimulus.send(c);
        }
        unit.run();

        assert_eq!(response.receive(), Some(3));
        assert_eq!(response.receive(), None);
    }

    #[test]
    fn wraps_at_range() {
        let mut unit = Counter::<u8>::new(3);
        let stimulus = OutPort::new();
        let response = InPort::detached();
        let _wiring = [
            connect(&stimulus, &unit.input, 1),
            connect(&unit.output, &response, 1),
        ];

        let expected = [1, 2, 0, 1, 2, 0];
        for want in expected {
            stimulus.send(0);
            unit.run();
            assert_eq!(response.receive(), Some(want));
        }
    }

    #[test]
    fn up_down_turns_at_the_limits() {
        let mut unit = UpDownCounter::<u8>::new(1, 3, 2);
        let stimulus = OutPort::new();
        let response = InPort::detached();
        let _wiring = [
            connect(&stimulus, &unit.input, 1),
            connect(&unit.output, &response, 1),
        ];

        let expected = [3, 2, 1, 2, 3, 2];
        for want in expected {
            stimulus.send(0);
            unit.run();
            assert_eq!(response.receive(), Some(want));
        }
    }
}
