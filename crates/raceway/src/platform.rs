use std::thread;

/// The porting interface an integrator supplies.
///
/// The reactor calls [`wait_for_event`](Self::wait_for_event) when a sweep
/// found nothing to run. On a Cortex-M target the natural implementation is
/// a `WFI`/`WFE` instruction; on a host it can yield or park until the next
/// stimulus.
pub trait Platform: Send + Sync {
    /// Called when the reactor found no runnable component.
    fn wait_for_event(&self);
}

/// Host default: hand the timeslice back to the OS scheduler.
pub struct YieldWait;

impl Platform for YieldWait {
    fn wait_for_event(&self) {
        thread::yield_now();
    }
}
