use crate::ring::Ring;
use std::mem::MaybeUninit;

/// A scoped acquisition of writable bytes from a [`Ring`].
///
/// `reserve`/`try_reserve` hand back a `ReservationGuard` borrowing a slice of
/// uninitialized bytes. Call [`ReservationGuard::commit`] to publish a prefix
/// of it to the consumer. If the guard is dropped without an explicit commit,
/// it commits the full reserved length — the common case — which makes the
/// reserve/commit pair exception-safe and impossible to forget.
pub struct ReservationGuard<'a, const GAP: usize> {
    slice: &'a mut [MaybeUninit<u8>],
    ring: &'a Ring<GAP>,
    committed: bool,
}

impl<'a, const GAP: usize> ReservationGuard<'a, GAP> {
    pub(crate) fn new(slice: &'a mut [MaybeUninit<u8>], ring: &'a Ring<GAP>) -> Self {
        Self {
            slice,
            ring,
            committed: false,
        }
    }

    /// Returns a mutable view over the reserved, uninitialized bytes.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [MaybeUninit<u8>] {
        self.slice
    }

    /// Number of bytes reserved.
    #[inline]
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    /// True if the reservation is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// Publishes the first `n` bytes of this reservation to the consumer.
    ///
    /// # Panics
    ///
    /// In debug builds, panics (via `debug_assert!`) if `n` exceeds the
    /// reserved length — committing more than was reserved is a programmer
    /// error, not a recoverable condition.
    pub fn commit(mut self, n: usize) {
        debug_assert!(
            n <= self.slice.len(),
            "cannot commit {} bytes, only {} were reserved",
            n,
            self.slice.len()
        );
        self.committed = true;
        // SAFETY: `self.slice` points at the `n` bytes just written by the
        // caller; the ring trusts its single-producer-thread contract here.
        unsafe { self.ring.commit_internal(n) };
    }
}

impl<const GAP: usize> Drop for ReservationGuard<'_, GAP> {
    fn drop(&mut self) {
        if !self.committed {
            let n = self.slice.len();
            // SAFETY: same contract as an explicit `commit(len())`.
            unsafe { self.ring.commit_internal(n) };
        }
    }
}
