//! One-way memory barriers used to pair a producer wrap/commit with a
//! consumer peek/consume across the ring's two index variables.
//!
//! These are fences, not atomic read-modify-write operations: on strongly
//! ordered hardware they compile down to a compiler barrier only, and on
//! weakly ordered hardware they emit the matching CPU fence. They exist
//! because the ordering requirement in a few places spans more than the one
//! atomic variable being stored or loaded (e.g. the producer wrap touches
//! both `end_of_recorded_space`, a plain field, and `producer_pos`, an
//! atomic), so a single `Release`/`Acquire` store/load is not expressive
//! enough on its own.

use std::sync::atomic::{fence, Ordering};

/// Ensures all prior stores on this thread are visible before any store that
/// follows. Used by the producer before publishing a wrap or a commit.
#[inline]
pub fn release_fence() {
    fence(Ordering::Release);
}

/// Ensures all loads that follow on this thread see the effects of a prior
/// load. Used by the consumer after snapshotting `producer_pos`, before
/// reading `end_of_recorded_space`, and before advancing `consumer_pos`.
#[inline]
pub fn acquire_fence() {
    fence(Ordering::Acquire);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_do_not_panic() {
        release_fence();
        acquire_fence();
    }
}
