//! A lock-free single-producer/single-consumer byte ring used as a
//! per-producer staging buffer ahead of a background log consumer.
//!
//! Each producer thread owns one [`Ring`]; a single consumer thread drains
//! it. The producer calls [`Ring::reserve`] or [`Ring::try_reserve`] to get a
//! writable [`ReservationGuard`], writes its bytes, and commits (explicitly,
//! or implicitly by dropping the guard). The consumer calls [`Ring::peek`] to
//! see the currently readable region and [`Ring::consume`] to release it.
//!
//! # Example
//!
//! ```
//! use staging_ring::{Config, Ring};
//!
//! let ring: Ring<0> = Ring::new(0, Config::new(4096, false));
//!
//! let mut reservation = ring.reserve(5);
//! reservation.as_mut_slice()[0].write(b'h');
//! reservation.as_mut_slice()[1].write(b'e');
//! reservation.as_mut_slice()[2].write(b'l');
//! reservation.as_mut_slice()[3].write(b'l');
//! reservation.as_mut_slice()[4].write(b'o');
//! reservation.commit(5);
//!
//! assert_eq!(ring.peek(), b"hello");
//! ring.consume(5);
//! assert_eq!(ring.peek(), b"");
//! ```
//!
//! The `GAP` const generic on [`Ring`] controls the padding inserted between
//! the producer-hot and consumer-hot cache lines; `Ring<0>` and `Ring<64>`
//! are the two recognized instantiations. See the crate's design notes for
//! why this is a const generic rather than a runtime field.

mod backoff;
mod config;
mod error;
mod fence;
mod invariants;
mod metrics;
mod reservation;
mod ring;

pub use backoff::Backoff;
pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use error::RingError;
pub use metrics::{Metrics, MetricsSnapshot};
pub use reservation::ReservationGuard;
pub use ring::Ring;
