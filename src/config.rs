/// Configuration for a [`crate::Ring`].
///
/// Unlike the ring's cache-line gap (a const generic, fixed at compile time
/// per monomorphization — see [`crate::Ring`]), these fields are construction
/// time: they size the storage allocation and toggle the optional histogram.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Ring storage capacity in bytes. One byte is unavailable to the caller
    /// (it distinguishes empty from full), so the usable capacity is
    /// `capacity - 1`.
    pub capacity: usize,
    /// Enables the 20-bin/10ns block-duration histogram in [`crate::Metrics`].
    /// When disabled, blocked-cycle and block-event counters are still kept,
    /// but no histogram bucketing work is done on the slow path.
    pub histogram_enabled: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is smaller than 2, since a ring needs at least
    /// one usable byte plus the one byte reserved for the empty/full
    /// distinction.
    pub const fn new(capacity: usize, histogram_enabled: bool) -> Self {
        assert!(capacity >= 2, "capacity must be at least 2 bytes");

        Self {
            capacity,
            histogram_enabled,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1 << 20, // 1 MiB staging buffer
            histogram_enabled: false,
        }
    }
}

/// Small ring tuned for low per-producer memory footprint.
pub const LOW_LATENCY_CONFIG: Config = Config::new(1 << 16, false);

/// Large ring tuned to absorb bursty producers without blocking.
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(1 << 22, false);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_usable_capacity() {
        let config = Config::default();
        assert!(config.capacity > 1);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 2 bytes")]
    fn rejects_degenerate_capacity() {
        Config::new(1, false);
    }
}
