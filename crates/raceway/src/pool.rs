use crate::ring::Ring;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Fixed-capacity object pool.
///
/// Hands out fixed-address elements for zero-copy passing through
/// connections and recycles them. The free list is a ring of slot indices
/// built on the same SPSC discipline as the connections: one taker and one
/// releaser may act concurrently, including across a thread/ISR boundary.
///
/// `Pool` is a cheap clone: all clones are handles to the same storage, so
/// the taker and the releaser can live on different threads.
pub struct Pool<T> {
    shared: Arc<PoolShared<T>>,
}

struct PoolShared<T> {
    /// Fixed storage; an element's address never changes.
    slots: Box<[UnsafeCell<T>]>,
    /// Indices of free slots. Each index is in the ring at most once; a
    /// slot is either checked out (owned by exactly one `PoolItem`) or
    /// enqueued here.
    free: Ring<u16>,
}

// SAFETY: a slot is reachable either through the free ring or through the
// single PoolItem holding its index, never both, so concurrent access to
// distinct slots from different threads is exclusive per slot.
unsafe impl<T: Send> Send for PoolShared<T> {}
unsafe impl<T: Send> Sync for PoolShared<T> {}

impl<T: Default> Pool<T> {
    /// Creates a pool of `size` default-initialized elements.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: u16) -> Self {
        let mut slots = Vec::with_capacity(size as usize);
        slots.resize_with(size as usize, || UnsafeCell::new(T::default()));

        let free = Ring::new(size);
        for index in 0..size {
            // SAFETY: construction is single-threaded; sole producer.
            let stored = unsafe { free.enqueue(index) };
            debug_assert!(stored.is_ok());
        }

        Self {
            shared: Arc::new(PoolShared {
                slots: slots.into_boxed_slice(),
                free,
            }),
        }
    }
}

impl<T> Pool<T> {
    /// Checks an element out of the pool, or `None` if all are in use.
    ///
    /// At most one execution context may be taking at a time.
    pub fn take(&self) -> Option<PoolItem<T>> {
        // SAFETY: the single-taker rule above makes this the free ring's
        // sole consumer.
        let index = unsafe { self.shared.free.dequeue() }?;
        Some(PoolItem {
            shared: Arc::clone(&self.shared),
            index,
        })
    }

    /// Returns an element to the pool.
    ///
    /// False if the item belongs to a different pool (it still goes back to
    /// its own). Dropping a `PoolItem` releases it the same way; this form
    /// exists for callers that want the pool identity checked.
    pub fn release(&self, item: PoolItem<T>) -> bool {
        Arc::ptr_eq(&self.shared, &item.shared)
    }

    /// Is at least one element free?
    pub fn has_available(&self) -> bool {
        !self.shared.free.is_empty()
    }
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// An element checked out of a [`Pool`].
///
/// Dereferences to the pooled value at its fixed address; the slot returns
/// to the pool when the item is dropped. At most one execution context may
/// be releasing (dropping) items of a given pool at a time — the releaser
/// side of the pool's SPSC free ring.
pub struct PoolItem<T> {
    shared: Arc<PoolShared<T>>,
    index: u16,
}

impl<T> Deref for PoolItem<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this item is the sole holder of `index` (the free ring
        // contains each index at most once), so no other reference to this
        // slot exists.
        unsafe { &*self.shared.slots[self.index as usize].get() }
    }
}

impl<T> DerefMut for PoolItem<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as in `deref`; &mut self makes the borrow exclusive.
        unsafe { &mut *self.shared.slots[self.index as usize].get() }
    }
}

impl<T> Drop for PoolItem<T> {
    fn drop(&mut self) {
        // SAFETY: the single-releaser rule makes this the free ring's sole
        // producer. The enqueue cannot fail: the ring has one slot per
        // index and this index left it when the item was taken.
        let stored = unsafe { self.shared.free.enqueue(self.index) };
        debug_assert!(stored.is_ok(), "pool free ring rejected a release");
    }
}

impl<T: fmt::Debug> fmt::Debug for PoolItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolItem")
            .field("index", &self.index)
            .field("value", &**self)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_and_restoration() {
        let pool = Pool::<u64>::new(3);
        assert!(pool.has_available());

        let items: Vec<_> = (0..3).map(|_| pool.take().unwrap()).collect();
        assert!(!pool.has_available());
        assert!(pool.take().is_none());

        drop(items);
        assert!(pool.has_available());
        assert!(pool.take().is_some());
    }

    #[test]
    fn element_access_is_stable() {
        let pool = Pool::<u64>::new(2);

        let mut item = pool.take().unwrap();
        *item = 77;
        let address = std::ptr::addr_of!(*item);
        assert_eq!(*item, 77);

        let other = pool.take().unwrap();
        assert_eq!(*other, 0);
        assert_ne!(address, std::ptr::addr_of!(*other));
    }

    #[test]
    fn release_checks_pool_identity() {
        let pool = Pool::<u8>::new(1);
        let stranger = Pool::<u8>::new(1);

        let item = pool.take().unwrap();
        assert!(!stranger.release(item));
        // The item still went home to its own pool.
        assert!(pool.has_available());
        assert!(stranger.has_available());
    }

    #[test]
    fn clones_share_storage() {
        let pool = Pool::<u32>::new(1);
        let handle = pool.clone();

        let _item = pool.take().unwrap();
        assert!(!handle.has_available());
    }
}
