use raceway::{Component, InPort, OutPort, Readiness};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// The payload of a tick stream. Carries no information beyond "a period
/// elapsed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick;

/// The one tick value.
pub const TICK: Tick = Tick;

/// Emits a [`Tick`] every `period` system ticks.
///
/// [`isr`](Self::isr) is the timebase and is meant to be called from the
/// system tick interrupt; the send it performs is lock-free. The component
/// itself has nothing to do on the reactor's schedule — it exists in the
/// graph as the tick source.
///
/// `SoftwareTimer` is a cheap clone: keep one handle for the interrupt
/// context and register another with the reactor.
#[derive(Clone)]
pub struct SoftwareTimer {
    shared: Arc<TimerShared>,
}

struct TimerShared {
    readiness: Readiness,
    out_tick: OutPort<Tick>,
    period: u32,
    sys_ticks: AtomicU32,
}

impl SoftwareTimer {
    /// Creates a timer with a fixed period, in system ticks.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn new(period: u32) -> Self {
        assert!(period > 0, "timer period must be at least 1");
        Self {
            shared: Arc::new(TimerShared {
                readiness: Readiness::new(),
                out_tick: OutPort::new(),
                period,
                sys_ticks: AtomicU32::new(0),
            }),
        }
    }

    /// Advances the timebase by one system tick, emitting a [`Tick`] when a
    /// period has elapsed. Call from the tick interrupt handler.
    pub fn isr(&self) {
        let elapsed = self.shared.sys_ticks.fetch_add(1, Ordering::AcqRel) + 1;
        if elapsed >= self.shared.period {
            self.shared.sys_ticks.store(0, Ordering::Release);
            self.shared.out_tick.send(TICK);
        }
    }

    /// The tick output port.
    pub fn out_tick(&self) -> &OutPort<Tick> {
        &self.shared.out_tick
    }
}

impl Component for SoftwareTimer {
    fn readiness(&self) -> &Readiness {
        &self.shared.readiness
    }

    fn run(&mut self) {}
}

/// Flips a boolean on every tick and sends the new state.
pub struct Toggle {
    readiness: Readiness,
    pub tick: InPort<Tick>,
    pub output: OutPort<bool>,
    state: bool,
}

impl Toggle {
    pub fn new() -> Self {
        let readiness = Readiness::new();
        Self {
            tick: InPort::new(&readiness),
            output: OutPort::new(),
            readiness,
            state: false,
        }
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Toggle {
    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn run(&mut self) {
        if self.tick.receive().is_some() {
            self.state = !self.state;
            self.output.send(self.state);
        }
    }
}
