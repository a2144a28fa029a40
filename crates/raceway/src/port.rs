use crate::component::{Peekable, Readiness};
use crate::ring::Ring;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Error types for the fallible send path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrySendError<T> {
    /// The connection buffer had no room; the value is handed back.
    #[error("connection buffer is full")]
    Full(T),
    /// The port has no connection; the value is handed back.
    #[error("port is not connected")]
    Disconnected(T),
}

impl<T> TrySendError<T> {
    /// Recovers the value that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Disconnected(value) => value,
        }
    }
}

// =============================================================================
// CONNECTION CORE
// =============================================================================

/// The shared heart of a connection: the buffered channel plus the wake
/// handle of whoever owns the receiving port.
pub(crate) struct ConnCore<T> {
    flavor: Flavor<T>,
    /// Readiness of the component owning the receiving port, if any.
    wake: Option<Readiness>,
}

enum Flavor<T> {
    /// The ordinary buffered channel.
    Fifo(Ring<T>),
    /// A constant source: `receive` always succeeds, `peek` is always true.
    Constant(Box<dyn Fn() -> T + Send + Sync>),
}

impl<T: Send> ConnCore<T> {
    fn fifo(capacity: u16, wake: Option<Readiness>) -> Self {
        Self {
            flavor: Flavor::Fifo(Ring::new(capacity)),
            wake,
        }
    }

    fn constant(source: Box<dyn Fn() -> T + Send + Sync>, wake: Option<Readiness>) -> Self {
        Self {
            flavor: Flavor::Constant(source),
            wake,
        }
    }

    fn send(&self, value: T) -> Result<(), T> {
        match &self.flavor {
            // SAFETY: a core is bound to at most one output port (enforced
            // by `PortSlot::bind`), so this is the ring's sole producer.
            Flavor::Fifo(ring) => match unsafe { ring.enqueue(value) } {
                Ok(()) => {
                    if let Some(wake) = &self.wake {
                        wake.request();
                    }
                    Ok(())
                }
                Err(value) => Err(value),
            },
            Flavor::Constant(_) => Err(value),
        }
    }

    fn receive(&self) -> Option<T> {
        match &self.flavor {
            // SAFETY: a core is bound to at most one input port (enforced
            // by `PortSlot::bind`), so this is the ring's sole consumer.
            Flavor::Fifo(ring) => unsafe { ring.dequeue() },
            Flavor::Constant(source) => Some(source()),
        }
    }

    fn peek(&self) -> bool {
        match &self.flavor {
            Flavor::Fifo(ring) => !ring.is_empty(),
            Flavor::Constant(_) => true,
        }
    }

    fn full(&self) -> bool {
        match &self.flavor {
            Flavor::Fifo(ring) => ring.is_full(),
            Flavor::Constant(_) => false,
        }
    }
}

// =============================================================================
// PORT SLOT
// =============================================================================

/// A port's binding to its connection core.
///
/// The hot path (`load`) is a single Acquire pointer load, so `send` and
/// `receive` stay lock-free and ISR-callable. The cold path (`bind`,
/// `unbind`) retains every core ever bound for the life of the port: a raw
/// pointer obtained by a concurrent `load` therefore always targets live
/// memory, even if the binding is dropped mid-call.
struct PortSlot<T> {
    bound: AtomicPtr<ConnCore<T>>,
    retained: Mutex<Vec<Arc<ConnCore<T>>>>,
}

impl<T> PortSlot<T> {
    fn new() -> Self {
        Self {
            bound: AtomicPtr::new(ptr::null_mut()),
            retained: Mutex::new(Vec::new()),
        }
    }

    /// Attaches a core.
    ///
    /// # Panics
    ///
    /// Panics if the port is already connected: binding twice is a
    /// programming error in the graph construction.
    fn bind(&self, core: &Arc<ConnCore<T>>) {
        self.retained
            .lock()
            .expect("port retention list poisoned")
            .push(Arc::clone(core));

        let ptr = Arc::as_ptr(core).cast_mut();
        let unbound = self
            .bound
            .compare_exchange(ptr::null_mut(), ptr, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        assert!(unbound, "port is already connected");
    }

    /// Detaches `core` if it is still the active binding; a stale handle
    /// (the port was re-wired since) leaves the newer binding alone.
    fn unbind(&self, core: &Arc<ConnCore<T>>) {
        let ptr = Arc::as_ptr(core).cast_mut();
        let _ = self
            .bound
            .compare_exchange(ptr, ptr::null_mut(), Ordering::AcqRel, Ordering::Acquire);
    }

    fn load(&self) -> Option<&ConnCore<T>> {
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

// =============================================================================
// PORTS
// =============================================================================

/// An output port of a component.
///
/// Ports are not `Clone`: each connection has exactly one sender endpoint
/// and one receiver endpoint, which is what makes the underlying ring's
/// single-producer/single-consumer discipline hold. At most one execution
/// context may call [`send`](Self::send) at a time.
pub struct OutPort<T> {
    slot: Arc<PortSlot<T>>,
}

impl<T: Send> OutPort<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(PortSlot::new()),
        }
    }

    /// Sends an element from the output port.
    ///
    /// Can be called concurrently with respect to `receive` on the
    /// connected input port. Returns false when the connection buffer is
    /// full or the port is not connected; the element is dropped in that
    /// case. Use [`try_send`](Self::try_send) to get the element back.
    #[inline]
    pub fn send(&self, element: T) -> bool {
        self.try_send(element).is_ok()
    }

    /// Sends an element, handing it back on failure.
    pub fn try_send(&self, element: T) -> Result<(), TrySendError<T>> {
        match self.slot.load() {
            Some(core) => core.send(element).map_err(TrySendError::Full),
            None => Err(TrySendError::Disconnected(element)),
        }
    }

    /// Is the connection associated with this output port full?
    ///
    /// False when not connected.
    pub fn full(&self) -> bool {
        self.slot.load().is_some_and(ConnCore::full)
    }
}

impl<T: Send> Default for OutPort<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// An input port of a component.
///
/// Created against the owning component's [`Readiness`] so the reactor can
/// poll it, or [`detached`](Self::detached) for ports read directly (test
/// probes, the application's edge). Not `Clone`; at most one execution
/// context may call [`receive`](Self::receive) at a time.
pub struct InPort<T> {
    inner: Arc<InPortInner<T>>,
}

pub(crate) struct InPortInner<T> {
    slot: PortSlot<T>,
    owner: Option<Readiness>,
}

impl<T: Send> Peekable for InPortInner<T> {
    fn peek_ready(&self) -> bool {
        self.slot.load().is_some_and(ConnCore::peek)
    }
}

impl<T: Send + 'static> InPort<T> {
    /// Creates an input port owned by the component with the given
    /// readiness record; data arriving on this port makes that component
    /// runnable.
    pub fn new(owner: &Readiness) -> Self {
        let inner = Arc::new(InPortInner {
            slot: PortSlot::new(),
            owner: Some(owner.clone()),
        });
        let peek: Arc<dyn Peekable> = inner.clone();
        owner.watch(Arc::downgrade(&peek));
        Self { inner }
    }

    /// Creates an input port with no owning component.
    pub fn detached() -> Self {
        Self {
            inner: Arc::new(InPortInner {
                slot: PortSlot::new(),
                owner: None,
            }),
        }
    }

    /// Receives an element from the input port.
    ///
    /// Can be called concurrently with respect to `send` on the connected
    /// output port. `None` when the connection is empty or the port is not
    /// connected.
    #[inline]
    pub fn receive(&self) -> Option<T> {
        self.inner.slot.load().and_then(ConnCore::receive)
    }

    /// Is an element available for receiving?
    #[inline]
    pub fn peek(&self) -> bool {
        self.inner.peek_ready()
    }

    /// Is the connection full? False when not connected.
    pub fn full(&self) -> bool {
        self.inner.slot.load().is_some_and(ConnCore::full)
    }
}

/// A bidirectional port: an input half and an output half under one name.
pub struct InOutPort<T> {
    input: InPort<T>,
    output: OutPort<T>,
}

impl<T: Send + 'static> InOutPort<T> {
    pub fn new(owner: &Readiness) -> Self {
        Self {
            input: InPort::new(owner),
            output: OutPort::new(),
        }
    }

    pub fn detached() -> Self {
        Self {
            input: InPort::detached(),
            output: OutPort::new(),
        }
    }

    /// See [`OutPort::send`].
    #[inline]
    pub fn send(&self, element: T) -> bool {
        self.output.send(element)
    }

    /// See [`OutPort::try_send`].
    pub fn try_send(&self, element: T) -> Result<(), TrySendError<T>> {
        self.output.try_send(element)
    }

    /// See [`InPort::receive`].
    #[inline]
    pub fn receive(&self) -> Option<T> {
        self.input.receive()
    }

    /// See [`InPort::peek`].
    #[inline]
    pub fn peek(&self) -> bool {
        self.input.peek()
    }

    /// Is the outbound connection full?
    pub fn full(&self) -> bool {
        self.output.full()
    }
}

// =============================================================================
// CONNECT / DISCONNECT
// =============================================================================

pub(crate) trait Detach: Send {
    fn detach(&self);
}

/// A live binding between ports.
///
/// The handle owns the binding: dropping it (or passing it to
/// [`disconnect`]) detaches both ports and releases the buffer. Both ports
/// report not-connected afterwards.
#[must_use = "dropping a Connection disconnects the ports immediately"]
pub struct Connection {
    links: Vec<Box<dyn Detach>>,
}

impl Connection {
    pub(crate) fn from_links(links: Vec<Box<dyn Detach>>) -> Self {
        Self { links }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        for link in &self.links {
            link.detach();
        }
    }
}

/// Removes a connection. Equivalent to dropping the handle.
pub fn disconnect(connection: Connection) {
    drop(connection);
}

struct FifoLink<T> {
    core: Arc<ConnCore<T>>,
    sender: Arc<PortSlot<T>>,
    receiver: Arc<InPortInner<T>>,
}

impl<T: Send> Detach for FifoLink<T> {
    fn detach(&self) {
        self.sender.unbind(&self.core);
        self.receiver.slot.unbind(&self.core);
    }
}

struct ConstantLink<T> {
    core: Arc<ConnCore<T>>,
    receiver: Arc<InPortInner<T>>,
}

impl<T: Send> Detach for ConstantLink<T> {
    fn detach(&self) {
        self.receiver.slot.unbind(&self.core);
    }
}

fn link<T: Send + 'static>(
    sender: &OutPort<T>,
    receiver: &InPort<T>,
    capacity: u16,
) -> Box<dyn Detach> {
    let core = Arc::new(ConnCore::fifo(capacity, receiver.inner.owner.clone()));
    sender.slot.bind(&core);
    receiver.inner.slot.bind(&core);
    Box::new(FifoLink {
        core,
        sender: Arc::clone(&sender.slot),
        receiver: Arc::clone(&receiver.inner),
    })
}

/// Connects an output port to an input port with a buffer of `capacity`
/// elements.
///
/// A successful `send` on the output side wakes the component owning the
/// input side. Returns the handle that owns the binding.
///
/// # Panics
///
/// Panics if either port is already connected.
pub fn connect<T: Send + 'static>(
    sender: &OutPort<T>,
    receiver: &InPort<T>,
    capacity: u16,
) -> Connection {
    Connection::from_links(vec![link(sender, receiver, capacity)])
}

/// Connects two bidirectional ports with two oriented buffers of
/// `capacity` elements each.
///
/// # Panics
///
/// Panics if any involved half is already connected.
pub fn connect_pair<T: Send + 'static>(
    a: &InOutPort<T>,
    b: &InOutPort<T>,
    capacity: u16,
) -> Connection {
    Connection::from_links(vec![
        link(&a.output, &b.input, capacity),
        link(&b.output, &a.input, capacity),
    ])
}

/// Binds an input port to a constant source: `receive` always yields the
/// value and `peek` is always true. No buffer is involved.
///
/// A constant-bound port owned by a component keeps that component
/// permanently runnable; this binding is meant for ports polled directly.
///
/// # Panics
///
/// Panics if the port is already connected.
pub fn bind_constant<T: Clone + Send + Sync + 'static>(
    value: T,
    receiver: &InPort<T>,
) -> Connection {
    let core = Arc::new(ConnCore::constant(
        Box::new(move || value.clone()),
        receiver.inner.owner.clone(),
    ));
    receiver.inner.slot.bind(&core);
    Connection::from_links(vec![Box::new(ConstantLink {
        core,
        receiver: Arc::clone(&receiver.inner),
    })])
}
