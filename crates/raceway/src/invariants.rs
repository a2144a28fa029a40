//! Debug assertion macros for the ring and pool invariants.
//!
//! Only active in debug builds (`debug_assert!`), so there is zero overhead
//! in release builds. Used by `Ring<T>` and `Pool<T>`.

/// Assert that the live-element count never exceeds capacity.
///
/// Checked after computing the next `enqueued` value: the wrapping distance
/// `enqueued - dequeued` must stay in `[0, capacity]`.
macro_rules! debug_assert_live_bounded {
    ($live:expr, $capacity:expr) => {
        debug_assert!(
            $live <= $capacity,
            "live count {} exceeds capacity {}",
            $live,
            $capacity
        )
    };
}

/// Assert that a storage index is inside the slot array.
///
/// `head` and `tail` are maintained by exactly one side each; an index out
/// of bounds means that discipline was broken.
macro_rules! debug_assert_slot_in_bounds {
    ($index:expr, $capacity:expr) => {
        debug_assert!(
            $index < $capacity,
            "storage index {} outside capacity {}",
            $index,
            $capacity
        )
    };
}

pub(crate) use debug_assert_live_bounded;
pub(crate) use debug_assert_slot_in_bounds;
