use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Number of histogram bins, each covering 10ns of blocked duration; the last
/// bin saturates and absorbs anything at or above its lower bound.
const HISTOGRAM_BINS: usize = 20;
const HISTOGRAM_BIN_WIDTH_NS: u64 = 10;

/// Producer-private counters, kept as relaxed atomics so that [`Ring::stats`]
/// is well-defined from any thread without a separate snapshot-publish
/// mechanism. In practice only the owning producer thread ever writes these;
/// the relaxed atomic is purely for a race-free read path, not for
/// cross-thread ordering (see the design notes on this tradeoff).
///
/// [`Ring::stats`]: crate::Ring::stats
#[derive(Debug, Default)]
pub struct Metrics {
    blocked_cycles_ns: AtomicU64,
    block_events: AtomicU64,
    allocations: AtomicU64,
    histogram: [AtomicU64; HISTOGRAM_BINS],
    histogram_enabled: AtomicUsize,
}

impl Metrics {
    pub fn new(histogram_enabled: bool) -> Self {
        let metrics = Self::default();
        metrics
            .histogram_enabled
            .store(histogram_enabled as usize, Ordering::Relaxed);
        metrics
    }

    /// Counts one call into `reserve`/`try_reserve`, fast or slow path.
    #[inline]
    pub fn record_allocation(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one entry into the slow path, and the wall-clock time spent
    /// there regardless of whether the reservation ultimately blocked.
    ///
    /// Mirrors the teacher's "producer blocked" counter shape: it increments
    /// once per slow-path entry, even on a non-blocking attempt that returns
    /// immediately without spinning.
    pub fn record_block(&self, blocked: std::time::Duration) {
        self.block_events.fetch_add(1, Ordering::Relaxed);
        let nanos = blocked.as_nanos().min(u128::from(u64::MAX)) as u64;
        self.blocked_cycles_ns.fetch_add(nanos, Ordering::Relaxed);

        if self.histogram_enabled.load(Ordering::Relaxed) != 0 {
            let bin = ((nanos / HISTOGRAM_BIN_WIDTH_NS) as usize).min(HISTOGRAM_BINS - 1);
            self.histogram[bin].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut histogram = [0u64; HISTOGRAM_BINS];
        for (slot, bin) in histogram.iter_mut().zip(&self.histogram) {
            *slot = bin.load(Ordering::Relaxed);
        }

        MetricsSnapshot {
            blocked_cycles_ns: self.blocked_cycles_ns.load(Ordering::Relaxed),
            block_events: self.block_events.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            histogram,
        }
    }
}

/// Plain-data snapshot of [`Metrics`], returned by [`crate::Ring::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total wall-clock nanoseconds spent across all slow-path entries.
    pub blocked_cycles_ns: u64,
    /// Number of times `reserve`/`try_reserve` fell off the fast path.
    pub block_events: u64,
    /// Number of `reserve`/`try_reserve` calls, fast or slow path.
    pub allocations: u64,
    /// 20-bin histogram of blocked duration, 10ns per bin, last bin
    /// saturating. All zero when the histogram is disabled.
    pub histogram: [u64; HISTOGRAM_BINS],
}
