use thiserror::Error;

/// Errors returned by the ring's one fallible surface: construction.
///
/// Backpressure is not an error — `try_reserve` reports it as `None` (see
/// [`crate::Ring::try_reserve`]). Programmer misuse (committing more than was
/// reserved, consuming more than was peeked) trips a `debug_assert!` in the
/// `invariants` module instead of returning a value here, since the ring
/// trusts its single-producer/single-consumer callers in release builds.
#[derive(Debug, Error)]
pub enum RingError {
    /// The storage allocation for the ring failed at construction time.
    #[error("failed to allocate {size} bytes (align {align}) for ring storage")]
    AllocationFailed {
        /// Requested allocation size in bytes.
        size: usize,
        /// Requested allocation alignment in bytes.
        align: usize,
    },
}
