use crate::invariants::{debug_assert_live_bounded, debug_assert_slot_in_bounds};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicU16, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// This SPSC ring buffer keeps four 16-bit words of state besides the storage:
//
// - `enqueued` / `dequeued`: wrapping operation counters, shared between the
//   two sides. The number of live elements is `enqueued - dequeued` under
//   wrapping arithmetic; because the live distance is always in `[0, N]` and
//   `N <= 65535`, the empty/full tests stay correct across counter wrap.
// - `tail` / `head`: storage indices, each owned by exactly one side.
//
// ## Memory Ordering Protocol
//
// **Producer (enqueue):**
// 1. Load `enqueued` with Relaxed (only the producer writes it)
// 2. Load `dequeued` with Acquire (synchronizes with the consumer's Release,
//    so the slot about to be reused has been fully read)
// 3. Write the value into the `tail` slot
// 4. Store `enqueued + 1` with Release (publishes the slot write)
//
// **Consumer (dequeue):**
// 1. Load `dequeued` with Relaxed (only the consumer writes it)
// 2. Load `enqueued` with Acquire (synchronizes with the producer's Release,
//    so the slot about to be read has been fully written)
// 3. Move the value out of the `head` slot
// 4. Store `dequeued + 1` with Release (publishes the slot read)
//
// A counter is only ever stored by its owning side, so plain load-then-store
// is an atomic increment here; no read-modify-write is needed.
//
// ## Single-Writer Invariants
//
// The following fields are accessed via UnsafeCell without atomics because
// they have exactly one writer and one reader, on the same side:
// - `tail`: only touched by the producer
// - `head`: only touched by the consumer
// - `slots[i]`: written by the producer before publishing `enqueued`,
//   read by the consumer before publishing `dequeued`
//
// These invariants hold only while there is a single producer context and a
// single consumer context, which is why the mutating operations are `unsafe`.
// The port/connection layer enforces the discipline for library users by
// binding each ring to exactly one output port and one input port.
//
// =============================================================================

/// SPSC ring buffer - the core of every data-carrying connection.
///
/// A fixed-capacity FIFO safe for exactly one producer and one consumer
/// running concurrently on distinct execution contexts, including a
/// thread/ISR pair. No locks anywhere; full and empty are ordinary return
/// values, not errors.
pub struct Ring<T> {
    /// Count of completed enqueues (written by producer, read by consumer).
    enqueued: CachePadded<AtomicU16>,
    /// Count of completed dequeues (written by consumer, read by producer).
    dequeued: CachePadded<AtomicU16>,
    /// Producer's storage index.
    tail: UnsafeCell<u16>,
    /// Consumer's storage index.
    head: UnsafeCell<u16>,
    /// Fixed storage, length = capacity.
    ///
    /// `Box<[_]>` rather than `Vec<_>`: the size never changes after
    /// construction and a boxed slice carries no spare-capacity field.
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// SAFETY: Ring is Send + Sync as long as T is Send. The counter protocol
// above synchronizes all slot accesses; the remaining aliasing hazards are
// covered by the `unsafe fn` contracts on the mutating operations.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    /// Creates a ring with room for `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: u16) -> Self {
        assert!(capacity > 0, "ring capacity must be at least 1");

        let mut slots = Vec::with_capacity(capacity as usize);
        slots.resize_with(capacity as usize, || UnsafeCell::new(MaybeUninit::uninit()));

        Self {
            enqueued: CachePadded::new(AtomicU16::new(0)),
            dequeued: CachePadded::new(AtomicU16::new(0)),
            tail: UnsafeCell::new(0),
            head: UnsafeCell::new(0),
            slots: slots.into_boxed_slice(),
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the ring capacity.
    #[inline]
    pub fn capacity(&self) -> u16 {
        self.slots.len() as u16
    }

    /// Returns the current number of live elements.
    ///
    /// Exact on the side that last changed the relevant counter; a snapshot
    /// on the other side.
    #[inline]
    pub fn len(&self) -> u16 {
        let enq = self.enqueued.load(Ordering::Acquire);
        let deq = self.dequeued.load(Ordering::Acquire);
        enq.wrapping_sub(deq)
    }

    /// Returns true if the ring holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.enqueued.load(Ordering::Acquire) == self.dequeued.load(Ordering::Acquire)
    }

    /// Returns true if the ring is at capacity.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Next storage index after `index`, wrapping at capacity.
    #[inline]
    fn step(&self, index: u16) -> u16 {
        if index + 1 == self.capacity() {
            0
        } else {
            index + 1
        }
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Enqueues a value, handing it back if the ring is full.
    ///
    /// # Safety
    ///
    /// The caller must be the ring's sole producer context for the duration
    /// of the call: no other `enqueue` may run concurrently.
    pub unsafe fn enqueue(&self, value: T) -> Result<(), T> {
        let enq = self.enqueued.load(Ordering::Relaxed);
        let deq = self.dequeued.load(Ordering::Acquire);

        if enq.wrapping_sub(deq) == self.capacity() {
            return Err(value);
        }

        let tail = *self.tail.get();
        debug_assert_slot_in_bounds!(tail, self.capacity());

        // SAFETY: the distance check above proves this slot is not live, so
        // the consumer will not touch it until `enqueued` is published.
        (*self.slots[tail as usize].get()).write(value);
        *self.tail.get() = self.step(tail);

        let next = enq.wrapping_add(1);
        debug_assert_live_bounded!(next.wrapping_sub(deq), self.capacity());
        self.enqueued.store(next, Ordering::Release);

        Ok(())
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Dequeues the oldest value, or `None` if the ring is empty.
    ///
    /// # Safety
    ///
    /// The caller must be the ring's sole consumer context for the duration
    /// of the call: no other `dequeue` or `peek` may run concurrently.
    pub unsafe fn dequeue(&self) -> Option<T> {
        let deq = self.dequeued.load(Ordering::Relaxed);
        let enq = self.enqueued.load(Ordering::Acquire);

        if enq == deq {
            return None;
        }

        let head = *self.head.get();
        debug_assert_slot_in_bounds!(head, self.capacity());

        // SAFETY: the emptiness check above proves this slot is live; the
        // Acquire load of `enqueued` synchronizes with the producer's
        // Release store, so the slot write is visible. Moving the value out
        // is exclusive because only the consumer reads live slots.
        let value = (*self.slots[head as usize].get()).assume_init_read();
        *self.head.get() = self.step(head);

        self.dequeued.store(deq.wrapping_add(1), Ordering::Release);

        Some(value)
    }

    /// Borrows the oldest value without removing it.
    ///
    /// # Safety
    ///
    /// Consumer side only, same exclusivity as [`dequeue`](Self::dequeue);
    /// additionally the returned borrow must end before the next `dequeue`.
    pub unsafe fn peek(&self) -> Option<&T> {
        let deq = self.dequeued.load(Ordering::Relaxed);
        let enq = self.enqueued.load(Ordering::Acquire);

        if enq == deq {
            return None;
        }

        let head = *self.head.get();
        // SAFETY: head slot is live (see dequeue); the producer cannot
        // overwrite it until `dequeued` advances.
        Some((*self.slots[head as usize].get()).assume_init_ref())
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        // Drop the live window [dequeued, enqueued).
        let count = self.len();
        let mut index = *self.head.get_mut();

        for _ in 0..count {
            // SAFETY: &mut self gives exclusive access; every slot in the
            // live window holds an initialized value.
            unsafe {
                ptr::drop_in_place((*self.slots[index as usize].get()).as_mut_ptr());
            }
            index = self.step(index);
        }
    }
}
