use crate::backoff::Backoff;
use crate::config::Config;
use crate::error::RingError;
use crate::fence;
use crate::invariants::{
    debug_assert_cache_not_optimistic, debug_assert_commit_within_reservation,
    debug_assert_consume_within_peek, debug_assert_in_bounds, debug_assert_in_flight_bounded,
    debug_assert_reservable,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::reservation::ReservationGuard;
use std::alloc::{alloc, dealloc, Layout};
use std::cell::{Cell, UnsafeCell};
use std::mem::MaybeUninit;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// `producer_pos` and `consumer_pos` are the only two atomics. Neither is
// sequentially consistent: the producer writes `producer_pos` with Release
// only when publishing a commit or a wrap, and reads it itself with Relaxed
// (it is the sole writer). The consumer mirrors this on `consumer_pos`. Two
// places need more than a single Release/Acquire store-load pair can give,
// because the ordering spans a second, non-atomic field:
//
// - Producer wrap: `end_of_recorded_space` (plain field) must be visible
//   before the new `producer_pos` is. An explicit release fence sits between
//   the two writes.
// - Consumer peek across a wrap: after snapshotting `producer_pos`, the
//   consumer needs an explicit acquire fence before trusting its read of
//   `end_of_recorded_space`.
//
// This mirrors the explicit-fence style used for SPSC staging rings in the
// NanoLog lineage, rather than baking the ordering into the atomic ops
// themselves.
// =============================================================================

struct ProducerState {
    /// Offset into `storage` where the next reservation begins.
    producer_pos: AtomicUsize,
    /// Exclusive upper bound of consumer-readable data; equals `capacity`
    /// except during a wrap window.
    end_of_recorded_space: UnsafeCell<usize>,
    /// Producer's cached lower bound on contiguous free bytes ahead of
    /// `producer_pos`. Refreshed only on the slow path.
    min_free_space: UnsafeCell<usize>,
}

struct ConsumerState {
    /// Offset into `storage` where the next read begins.
    consumer_pos: AtomicUsize,
    /// Set by the owning producer thread at teardown; read by the consumer
    /// together with position equality in `can_delete`.
    should_deallocate: AtomicBool,
}

/// Wrapper that forces 64-byte alignment, keeping producer- and
/// consumer-mutated state off each other's cache lines.
#[repr(align(64))]
struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> std::ops::Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// A lock-free single-producer/single-consumer byte ring.
///
/// `GAP` is the padding, in bytes, inserted between the producer-hot block
/// and the consumer-hot block, on top of the 64-byte alignment each block
/// already gets from [`CacheAligned`]. The two recognized instantiations are
/// `Ring<0>` and `Ring<64>`; both are exercised by the benchmark harness
/// (out of scope here) to quantify the false-sharing cost the gap buys.
///
/// One producer thread calls `reserve`/`try_reserve` and the returned
/// [`ReservationGuard`]'s `commit`. One consumer thread calls `peek` and
/// `consume`. Mixing callers across threads, or calling from more than one
/// thread on either side, is undefined behavior the type does not guard
/// against — see the crate-level docs for the single-producer contract.
#[repr(C)]
pub struct Ring<const GAP: usize> {
    producer: CacheAligned<ProducerState>,
    _gap: [u8; GAP],
    consumer: CacheAligned<ConsumerState>,
    storage: NonNull<u8>,
    layout: Layout,
    capacity: usize,
    id: u64,
    metrics: Metrics,
    /// Consumer-private: length returned by the most recent `peek`, used to
    /// bound the next `consume`.
    last_peek_len: Cell<usize>,
}

// SAFETY: all cross-thread access to shared fields goes through atomics or
// the documented fence pairing; the single-producer/single-consumer contract
// is the caller's responsibility, as it is for any SPSC ring.
unsafe impl<const GAP: usize> Send for Ring<GAP> {}
unsafe impl<const GAP: usize> Sync for Ring<GAP> {}

impl<const GAP: usize> Ring<GAP> {
    /// Allocates a new ring of `config.capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::AllocationFailed`] if the storage allocation
    /// fails, rather than aborting the process — this is the crate's one
    /// fallible construction path, used so an owning producer thread can
    /// observe and report the failure instead of the whole process dying.
    pub fn try_new(id: u64, config: Config) -> Result<Self, RingError> {
        let capacity = config.capacity;
        let layout = Layout::array::<u8>(capacity).expect("capacity overflow");

        // SAFETY: layout has non-zero size, checked by `Config::new`.
        let raw = unsafe { alloc(layout) };
        let storage = NonNull::new(raw).ok_or(RingError::AllocationFailed {
            size: layout.size(),
            align: layout.align(),
        })?;

        Ok(Self {
            producer: CacheAligned::new(ProducerState {
                producer_pos: AtomicUsize::new(0),
                end_of_recorded_space: UnsafeCell::new(capacity),
                min_free_space: UnsafeCell::new(capacity),
            }),
            _gap: [0u8; GAP],
            consumer: CacheAligned::new(ConsumerState {
                consumer_pos: AtomicUsize::new(0),
                should_deallocate: AtomicBool::new(false),
            }),
            storage,
            layout,
            capacity,
            id,
            metrics: Metrics::new(config.histogram_enabled),
            last_peek_len: Cell::new(0),
        })
    }

    /// Like [`Ring::try_new`], panicking instead of returning an error.
    ///
    /// # Panics
    ///
    /// Panics if the storage allocation fails.
    pub fn new(id: u64, config: Config) -> Self {
        Self::try_new(id, config).expect("ring storage allocation failed")
    }

    /// The ring's opaque identifier, set at construction.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Size of the storage allocation in bytes. The ring never lets more
    /// than `capacity() - 1` bytes be in flight at once: one byte is kept
    /// unused so `producer_pos == consumer_pos` stays an unambiguous
    /// "empty" rather than also meaning "full".
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reserves `n` contiguous writable bytes, blocking until available.
    ///
    /// # Panics
    ///
    /// Panics (via `debug_assert!` in debug builds) if `n >= capacity()`.
    pub fn reserve(&self, n: usize) -> ReservationGuard<'_, GAP> {
        let offset = self
            .reserve_internal(n, true)
            .expect("blocking reserve always yields a reservation");
        self.make_guard(offset, n)
    }

    /// Like [`Ring::reserve`], returning `None` instead of blocking when `n`
    /// bytes are not currently available.
    pub fn try_reserve(&self, n: usize) -> Option<ReservationGuard<'_, GAP>> {
        let offset = self.reserve_internal(n, false)?;
        Some(self.make_guard(offset, n))
    }

    fn make_guard(&self, offset: usize, n: usize) -> ReservationGuard<'_, GAP> {
        debug_assert_in_bounds!(offset + n, 0usize, self.capacity);
        // SAFETY: `reserve_internal` guarantees `n` contiguous free bytes
        // starting at `offset`, and the single-producer contract means no
        // other call can observe or alias this range until it is committed.
        let slice = unsafe {
            std::slice::from_raw_parts_mut(
                self.storage.as_ptr().add(offset).cast::<MaybeUninit<u8>>(),
                n,
            )
        };
        ReservationGuard::new(slice, self)
    }

    /// Producer-side reserve algorithm. Returns the start offset of `n`
    /// contiguous free bytes, or `None` if `blocking` is false and none are
    /// currently available.
    fn reserve_internal(&self, n: usize, blocking: bool) -> Option<usize> {
        debug_assert_reservable!(n, self.capacity);
        self.metrics.record_allocation();

        // Fast path: trust the cached lower bound, no fence, no read of
        // `consumer_pos`. This is the ~1ns steady-state case.
        let cached = unsafe { *self.producer.min_free_space.get() };
        if n < cached {
            #[cfg(debug_assertions)]
            {
                let actual = self.contiguous_free_space();
                debug_assert_cache_not_optimistic!(cached, actual);
            }
            return Some(self.producer.producer_pos.load(Ordering::Relaxed));
        }

        self.reserve_slow(n, blocking)
    }

    /// Freshly recomputed contiguous free space ahead of `producer_pos`, used
    /// only to check the fast path's cached value isn't stale-optimistic.
    /// Debug-only: this does a real `consumer_pos` read the fast path is
    /// otherwise built to avoid.
    #[cfg(debug_assertions)]
    fn contiguous_free_space(&self) -> usize {
        let p = self.producer.producer_pos.load(Ordering::Relaxed);
        let c = self.consumer.consumer_pos.load(Ordering::Acquire);
        if c <= p {
            self.capacity - p
        } else {
            c - p
        }
    }

    #[cold]
    fn reserve_slow(&self, n: usize, blocking: bool) -> Option<usize> {
        let started = Instant::now();
        let mut backoff = Backoff::new();

        loop {
            let p = self.producer.producer_pos.load(Ordering::Relaxed);
            let c = self.consumer.consumer_pos.load(Ordering::Acquire);

            let free = if c <= p {
                let tail_free = self.capacity - p;
                if tail_free > n {
                    tail_free
                } else {
                    // Tail too small: publish the wrap marker before
                    // touching `producer_pos`.
                    unsafe { *self.producer.end_of_recorded_space.get() = p };
                    fence::release_fence();

                    if c == 0 {
                        // Wrap-pending: wrapping now would set
                        // producer_pos == consumer_pos == 0, an ambiguous
                        // "empty". Wait for the consumer to move off base.
                        0
                    } else {
                        self.producer.producer_pos.store(0, Ordering::Release);
                        c
                    }
                }
            } else {
                c - p
            };

            debug_assert!(
                free <= self.capacity,
                "recomputed free space {free} exceeds capacity {capacity}",
                capacity = self.capacity
            );
            unsafe { *self.producer.min_free_space.get() = free };

            if free > n {
                let offset = self.producer.producer_pos.load(Ordering::Relaxed);
                self.metrics.record_block(started.elapsed());
                return Some(offset);
            }

            if !blocking {
                self.metrics.record_block(started.elapsed());
                return None;
            }

            backoff.snooze();
        }
    }

    /// Publishes the first `n` bytes of a reservation. Called only by
    /// [`ReservationGuard`].
    pub(crate) unsafe fn commit_internal(&self, n: usize) {
        let min_free = *self.producer.min_free_space.get();
        debug_assert_commit_within_reservation!(n, min_free);

        fence::release_fence();

        *self.producer.min_free_space.get() -= n;
        let p = self.producer.producer_pos.load(Ordering::Relaxed);
        let new_p = p + n;
        debug_assert_in_bounds!(new_p, 0usize, self.capacity);
        self.producer.producer_pos.store(new_p, Ordering::Release);
    }

    /// Returns the currently readable contiguous region, possibly empty.
    ///
    /// May advance `consumer_pos` internally to the base of `storage` if the
    /// producer has wrapped and the consumer has drained the tail region —
    /// this is the one place peek is not purely read-only.
    pub fn peek(&self) -> &[u8] {
        let p = self.producer.producer_pos.load(Ordering::Relaxed);
        let mut c = self.consumer.consumer_pos.load(Ordering::Relaxed);

        let len = if p < c {
            // Producer has wrapped ahead of us; the fence ensures our view
            // of `end_of_recorded_space` is not stale relative to `p`.
            fence::acquire_fence();
            let e = unsafe { *self.producer.end_of_recorded_space.get() };
            let avail = e - c;
            if avail > 0 {
                avail
            } else {
                c = 0;
                self.consumer.consumer_pos.store(0, Ordering::Release);
                p
            }
        } else {
            p - c
        };

        debug_assert_in_flight_bounded!(len, self.capacity);
        self.last_peek_len.set(len);
        // SAFETY: `[c, c + len)` is exactly the region the producer has
        // committed and not yet ceded to the consumer.
        unsafe { std::slice::from_raw_parts(self.storage.as_ptr().add(c), len) }
    }

    /// Releases the first `n` bytes of the most recent `peek`.
    ///
    /// # Panics
    ///
    /// Panics (via `debug_assert!`) if `n` exceeds the length returned by
    /// that `peek`.
    pub fn consume(&self, n: usize) {
        let peeked = self.last_peek_len.get();
        debug_assert_consume_within_peek!(n, peeked);

        fence::acquire_fence();
        let c = self.consumer.consumer_pos.load(Ordering::Relaxed);
        self.consumer.consumer_pos.store(c + n, Ordering::Release);
        self.last_peek_len.set(peeked - n);
    }

    /// Marks the ring as eligible for reclamation once drained. Called by
    /// the owning producer thread at teardown.
    pub fn mark_for_deletion(&self) {
        self.consumer.should_deallocate.store(true, Ordering::Release);
    }

    /// Advisory check: true once the owning producer has called
    /// `mark_for_deletion` and the consumer has drained all committed bytes.
    /// The eventual reclaim path must re-verify before actually freeing.
    pub fn can_delete(&self) -> bool {
        if !self.consumer.should_deallocate.load(Ordering::Acquire) {
            return false;
        }
        let p = self.producer.producer_pos.load(Ordering::Relaxed);
        let c = self.consumer.consumer_pos.load(Ordering::Relaxed);
        p == c
    }

    /// Snapshot of the producer's private counters.
    pub fn stats(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<const GAP: usize> Drop for Ring<GAP> {
    fn drop(&mut self) {
        // SAFETY: `storage`/`layout` are exactly the pair handed to `alloc`
        // in `try_new`, and no other reference to `storage` outlives `self`.
        unsafe { dealloc(self.storage.as_ptr(), self.layout) };
    }
}
