use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Anything the reactor can poll for pending input.
///
/// Implemented by the input-port internals; registered into the owning
/// component's [`Readiness`] when the port is created.
pub(crate) trait Peekable: Send + Sync {
    /// Is there data waiting on this input?
    fn peek_ready(&self) -> bool;
}

/// Per-component scheduling record.
///
/// Holds the pending-request flag and the chain of peekable inputs the
/// reactor polls. Every component owns one and hands it to its input ports
/// at construction; producers raise the request through the connection when
/// they deliver data.
///
/// `Readiness` is a cheap clone sharing the same record, so an interrupt
/// handler (or the component itself, to retry later) can keep a handle and
/// call [`request`](Self::request) from any context.
#[derive(Clone)]
pub struct Readiness {
    shared: Arc<ReadinessShared>,
}

struct ReadinessShared {
    /// One-bit request signal, settable from any context.
    requested: AtomicBool,
    /// Inputs to poll, registered at port construction. Locked only on the
    /// reactor thread and during wiring; never on the send path.
    peeks: Mutex<Vec<Weak<dyn Peekable>>>,
}

impl Readiness {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ReadinessShared {
                requested: AtomicBool::new(false),
                peeks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Requests a run of the owning component on the next reactor sweep.
    ///
    /// Lock-free; safe to call from an interrupt handler.
    #[inline]
    pub fn request(&self) {
        self.shared.requested.store(true, Ordering::Release);
    }

    /// Registers an input to be polled on every sweep.
    pub(crate) fn watch(&self, peek: Weak<dyn Peekable>) {
        self.shared
            .peeks
            .lock()
            .expect("readiness peek chain poisoned")
            .push(peek);
    }

    /// Consumes the pending request (if any) and polls the peek chain.
    ///
    /// Returns true if the component should run this sweep. Entries whose
    /// port has gone away are pruned as a side effect.
    pub(crate) fn take_runnable(&self) -> bool {
        let requested = self.shared.requested.swap(false, Ordering::AcqRel);

        let mut any = false;
        let mut peeks = self
            .shared
            .peeks
            .lock()
            .expect("readiness peek chain poisoned");
        peeks.retain(|weak| match weak.upgrade() {
            Some(peek) => {
                if !any {
                    any = peek.peek_ready();
                }
                true
            }
            None => false,
        });

        requested || any
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// An executable unit in the component graph.
///
/// A component owns its ports and a [`Readiness`] record, and exposes a
/// non-blocking, run-to-completion [`run`](Self::run) body. The reactor is
/// the only caller of `run`, `start` and `stop`; it invokes `run` only when
/// an input port reports data or a request was raised.
pub trait Component: Send {
    /// The component's scheduling record; its input ports must have been
    /// created against this same record.
    fn readiness(&self) -> &Readiness;

    /// Second-stage initialization, invoked once by [`Reactor::start`].
    ///
    /// [`Reactor::start`]: crate::Reactor::start
    fn start(&mut self) {}

    /// Symmetrical deinitialization, invoked once by [`Reactor::stop`].
    ///
    /// [`Reactor::stop`]: crate::Reactor::stop
    fn stop(&mut self) {}

    /// Executes the component's function: typically drain the input ports,
    /// compute, and send results downstream. Must not block.
    fn run(&mut self);
}
