//! Debug assertion macros for the ring's invariants.
//!
//! Active only in debug builds (`debug_assert!`), so there is zero overhead
//! in release builds. The ring trusts its single-producer/single-consumer
//! contract in release mode; these macros exist to catch contract violations
//! during development and testing.

/// Every index stays within the storage region.
///
/// **Invariant (Bounds)**: `base <= pos <= base + capacity`.
macro_rules! debug_assert_in_bounds {
    ($pos:expr, $base:expr, $capacity:expr) => {
        debug_assert!(
            $pos >= $base && $pos <= $base + $capacity,
            "Bounds violated: position {} outside [{}, {}]",
            $pos,
            $base,
            $base + $capacity
        )
    };
}

/// A reservation never asks for the full capacity: one byte is reserved to
/// keep "empty" and "full" distinguishable.
///
/// **Invariant (Empty-distinguishable)**.
macro_rules! debug_assert_reservable {
    ($n:expr, $capacity:expr) => {
        debug_assert!(
            $n < $capacity,
            "Empty-distinguishable violated: reservation of {} >= capacity {}",
            $n,
            $capacity
        )
    };
}

/// A commit never exceeds the amount actually reserved.
///
/// **Invariant (No-tear)**: the consumer must never be told about bytes the
/// producer did not actually commit.
macro_rules! debug_assert_commit_within_reservation {
    ($n:expr, $reserved:expr) => {
        debug_assert!(
            $n <= $reserved,
            "No-tear violated: committing {} bytes but only {} were reserved",
            $n,
            $reserved
        )
    };
}

/// A consume never exceeds the length returned by the prior peek.
///
/// **Invariant (No-tear)**.
macro_rules! debug_assert_consume_within_peek {
    ($n:expr, $peeked:expr) => {
        debug_assert!(
            $n <= $peeked,
            "No-tear violated: consuming {} bytes but only {} were peeked",
            $n,
            $peeked
        )
    };
}

/// The producer's cached free-space lower bound never overstates the true
/// contiguous free space it was computed from.
///
/// **Invariant (Reserve-monotonic)**.
macro_rules! debug_assert_cache_not_optimistic {
    ($cached:expr, $actual:expr) => {
        debug_assert!(
            $cached <= $actual,
            "Reserve-monotonic violated: cached free space {} exceeds actual {}",
            $cached,
            $actual
        )
    };
}

/// Committed bytes minus consumed bytes never goes negative and never
/// exceeds usable capacity.
///
/// **Invariant (Counter-consistency)**.
macro_rules! debug_assert_in_flight_bounded {
    ($in_flight:expr, $capacity:expr) => {
        debug_assert!(
            $in_flight < $capacity,
            "Counter-consistency violated: {} bytes in flight >= capacity {}",
            $in_flight,
            $capacity
        )
    };
}

pub(crate) use debug_assert_cache_not_optimistic;
pub(crate) use debug_assert_commit_within_reservation;
pub(crate) use debug_assert_consume_within_peek;
pub(crate) use debug_assert_in_bounds;
pub(crate) use debug_assert_in_flight_bounded;
pub(crate) use debug_assert_reservable;
