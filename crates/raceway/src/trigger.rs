//! Payload-free connections.
//!
//! A trigger carries only edge counts: "N events happened since last
//! checked", with no storage per event. This keeps ISR pulse sources cheap.
//! The protocol matches the data connections — bounded, wake-on-send,
//! not-connected reads as inert — with the bound fixed at `u16::MAX`
//! (the 16-bit wrap domain minus one, to tell empty from full).

use crate::component::{Peekable, Readiness};
use crate::port::{Connection, Detach};
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

/// Counter pair shared by the two trigger endpoints.
///
/// Same single-writer discipline as the data ring: `sent` is stored only by
/// the sending side, `received` only by the receiving side, each published
/// with Release and read by the other side with Acquire.
struct TriggerCore {
    sent: AtomicU16,
    received: AtomicU16,
    wake: Option<Readiness>,
}

impl TriggerCore {
    const CAPACITY: u16 = u16::MAX;

    fn new(wake: Option<Readiness>) -> Self {
        Self {
            sent: AtomicU16::new(0),
            received: AtomicU16::new(0),
            wake,
        }
    }

    fn send(&self) -> bool {
        let sent = self.sent.load(Ordering::Relaxed);
        let received = self.received.load(Ordering::Acquire);

        if sent.wrapping_sub(received) == Self::CAPACITY {
            return false;
        }

        self.sent.store(sent.wrapping_add(1), Ordering::Release);
        if let Some(wake) = &self.wake {
            wake.request();
        }
        true
    }

    fn receive(&self) -> bool {
        let received = self.received.load(Ordering::Relaxed);
        let sent = self.sent.load(Ordering::Acquire);

        if sent == received {
            return false;
        }

        self.received.store(received.wrapping_add(1), Ordering::Release);
        true
    }

    fn peek(&self) -> bool {
        self.sent.load(Ordering::Acquire) != self.received.load(Ordering::Acquire)
    }

    fn full(&self) -> bool {
        let sent = self.sent.load(Ordering::Acquire);
        let received = self.received.load(Ordering::Acquire);
        sent.wrapping_sub(received) == Self::CAPACITY
    }
}

/// Binding slot, mirroring the data ports: Acquire load on the hot path,
/// cores retained for the port's lifetime on the cold path.
struct TriggerSlot {
    bound: AtomicPtr<TriggerCore>,
    retained: Mutex<Vec<Arc<TriggerCore>>>,
}

impl TriggerSlot {
    fn new() -> Self {
        Self {
            bound: AtomicPtr::new(ptr::null_mut()),
            retained: Mutex::new(Vec::new()),
        }
    }

    fn bind(&self, core: &Arc<TriggerCore>) {
        self.retained
            .lock()
            .expect("trigger retention list poisoned")
            .push(Arc::clone(core));

        let ptr = Arc::as_ptr(core).cast_mut();
        let unbound = self
            .bound
            .compare_exchange(ptr::null_mut(), ptr, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        assert!(unbound, "trigger port is already connected");
    }

    fn unbind(&self, core: &Arc<TriggerCore>) {
        let ptr = Arc::as_ptr(core).cast_mut();
        let _ = self
            .bound
            .compare_exchange(ptr, ptr::null_mut(), Ordering::AcqRel, Ordering::Acquire);
    }

    fn load(&self) -> Option<&TriggerCore> {
        let ptr = self.bound.load(Ordering::Acquire);
        if ptr.is_null() {
            None
        } else {
            // SAFETY: `bind` retains the Arc before publishing the pointer
            // and `retained` is never pruned, so the target lives at least
            // as long as this slot.
            Some(unsafe { &*ptr })
        }
    }
}

/// The sending endpoint of a trigger connection.
pub struct OutTrigger {
    slot: Arc<TriggerSlot>,
}

impl OutTrigger {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(TriggerSlot::new()),
        }
    }

    /// Records one event and wakes the receiving component.
    ///
    /// Lock-free; safe to call from an interrupt handler. False when the
    /// edge counter is saturated or the port is not connected.
    #[inline]
    pub fn send(&self) -> bool {
        self.slot.load().is_some_and(TriggerCore::send)
    }

    /// Is the edge counter saturated? False when not connected.
    pub fn full(&self) -> bool {
        self.slot.load().is_some_and(TriggerCore::full)
    }
}

impl Default for OutTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// The receiving endpoint of a trigger connection.
pub struct InTrigger {
    inner: Arc<InTriggerInner>,
}

struct InTriggerInner {
    slot: TriggerSlot,
    owner: Option<Readiness>,
}

impl Peekable for InTriggerInner {
    fn peek_ready(&self) -> bool {
        self.slot.load().is_some_and(TriggerCore::peek)
    }
}

impl InTrigger {
    /// Creates a trigger input owned by the component with the given
    /// readiness record.
    pub fn new(owner: &Readiness) -> Self {
        let inner = Arc::new(InTriggerInner {
            slot: TriggerSlot::new(),
            owner: Some(owner.clone()),
        });
        let peek: Arc<dyn Peekable> = inner.clone();
        owner.watch(Arc::downgrade(&peek));
        Self { inner }
    }

    /// Creates a trigger input with no owning component.
    pub fn detached() -> Self {
        Self {
            inner: Arc::new(InTriggerInner {
                slot: TriggerSlot::new(),
                owner: None,
            }),
        }
    }

    /// Consumes one pending event. False when none are pending or the port
    /// is not connected.
    #[inline]
    pub fn receive(&self) -> bool {
        self.inner.slot.load().is_some_and(TriggerCore::receive)
    }

    /// Is at least one event pending?
    #[inline]
    pub fn peek(&self) -> bool {
        self.inner.peek_ready()
    }

    /// Is the edge counter saturated? False when not connected.
    pub fn full(&self) -> bool {
        self.inner.slot.load().is_some_and(TriggerCore::full)
    }
}

struct TriggerLink {
    core: Arc<TriggerCore>,
    sender: Arc<TriggerSlot>,
    receiver: Arc<InTriggerInner>,
}

impl Detach for TriggerLink {
    fn detach(&self) {
        self.sender.unbind(&self.core);
        self.receiver.slot.unbind(&self.core);
    }
}

/// Connects a trigger output to a trigger input.
///
/// # Panics
///
/// Panics if either endpoint is already connected.
pub fn connect_trigger(sender: &OutTrigger, receiver: &InTrigger) -> Connection {
    let core = Arc::new(TriggerCore::new(receiver.inner.owner.clone()));
    sender.slot.bind(&core);
    receiver.inner.slot.bind(&core);
    Connection::from_links(vec![Box::new(TriggerLink {
        core,
        sender: Arc::clone(&sender.slot),
        receiver: Arc::clone(&receiver.inner),
    })])
}
