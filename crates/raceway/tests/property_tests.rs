//! Property-based tests for the ring and pool invariants.
//!
//! The ring is driven against a `VecDeque` oracle through arbitrary
//! operation sequences; the pool is checked for slot conservation.

use proptest::prelude::*;
use raceway::{Pool, Ring};
use std::collections::VecDeque;

proptest! {
    /// Any interleaving of enqueues and dequeues behaves exactly like an
    /// unbounded FIFO truncated at capacity: same accepted values, same
    /// order out, same emptiness.
    #[test]
    fn ring_matches_fifo_oracle(
        capacity in 1u16..=8,
        ops in prop::collection::vec(prop::bool::ANY, 1..200),
    ) {
        let ring = Ring::<u32>::new(capacity);
        let mut oracle = VecDeque::new();
        let mut next_value = 0u32;

        for enqueue in ops {
            if enqueue {
                // SAFETY: single-threaded test, sole producer.
                let outcome = unsafe { ring.enqueue(next_value) };
                if oracle.len() < capacity as usize {
                    prop_assert!(outcome.is_ok());
                    oracle.push_back(next_value);
                } else {
                    prop_assert_eq!(outcome, Err(next_value));
                }
                next_value += 1;
            } else {
                // SAFETY: single-threaded test, sole consumer.
                let outcome = unsafe { ring.dequeue() };
                prop_assert_eq!(outcome, oracle.pop_front());
            }

            prop_assert_eq!(ring.len() as usize, oracle.len());
            prop_assert_eq!(ring.is_empty(), oracle.is_empty());
            prop_assert_eq!(ring.is_full(), oracle.len() == capacity as usize);
        }
    }

    /// The live count never exceeds capacity, whatever the traffic.
    #[test]
    fn ring_count_is_bounded(
        capacity in 1u16..=16,
        writes in 0usize..100,
        reads in 0usize..100,
    ) {
        let ring = Ring::<u64>::new(capacity);

        for i in 0..writes {
            // SAFETY: single-threaded test, sole producer.
            let _ = unsafe { ring.enqueue(i as u64) };
            prop_assert!(ring.len() <= capacity);
        }
        for _ in 0..reads {
            // SAFETY: single-threaded test, sole consumer.
            let _ = unsafe { ring.dequeue() };
            prop_assert!(ring.len() <= capacity);
        }
    }

    /// Peek never changes state and always previews the next dequeue.
    #[test]
    fn ring_peek_is_pure(
        capacity in 1u16..=8,
        values in prop::collection::vec(prop::num::u32::ANY, 1..8),
    ) {
        let ring = Ring::<u32>::new(capacity);

        for &value in values.iter().take(capacity as usize) {
            // SAFETY: single-threaded test, sole producer.
            unsafe { ring.enqueue(value).unwrap(); }
        }

        let live = ring.len();
        // SAFETY: single-threaded test, sole consumer.
        unsafe {
            let first = ring.peek().copied();
            let second = ring.peek().copied();
            prop_assert_eq!(first, second);
            prop_assert_eq!(ring.len(), live);
            prop_assert_eq!(ring.dequeue(), first);
        }
    }

    /// Outstanding items plus free slots always equals the pool size, and
    /// take fails exactly when everything is checked out.
    #[test]
    fn pool_conserves_slots(
        size in 1u16..=8,
        ops in prop::collection::vec(prop::bool::ANY, 1..100),
    ) {
        let pool = Pool::<u64>::new(size);
        let mut outstanding = Vec::new();

        for take in ops {
            if take {
                match pool.take() {
                    Some(item) => outstanding.push(item),
                    None => prop_assert_eq!(outstanding.len(), size as usize),
                }
            } else if let Some(item) = outstanding.pop() {
                drop(item);
            }

            prop_assert!(outstanding.len() <= size as usize);
            prop_assert_eq!(
                pool.has_available(),
                outstanding.len() < size as usize
            );
        }

        outstanding.clear();
        for _ in 0..size {
            prop_assert!(pool.take().is_some());
        }
    }
}
