//! Loom-based exploration of the wrap/fence protocol.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! The production `Ring` uses `std::sync::atomic` so it can't run under loom
//! directly. This models the same reserve/commit/peek/consume protocol —
//! including the end-of-recorded-space wrap marker — at a small capacity, so
//! loom's exhaustive interleaving search stays tractable.

#![cfg(feature = "loom")]

use loom::cell::UnsafeCell;
use loom::sync::atomic::{fence, AtomicUsize, Ordering};
use loom::sync::Arc;
use loom::thread;

const CAP: usize = 4;

struct LoomByteRing {
    producer_pos: AtomicUsize,
    consumer_pos: AtomicUsize,
    end_of_recorded_space: UnsafeCell<usize>,
    storage: UnsafeCell<[u8; CAP]>,
}

unsafe impl Send for LoomByteRing {}
unsafe impl Sync for LoomByteRing {}

impl LoomByteRing {
    fn new() -> Self {
        Self {
            producer_pos: AtomicUsize::new(0),
            consumer_pos: AtomicUsize::new(0),
            end_of_recorded_space: UnsafeCell::new(CAP),
            storage: UnsafeCell::new([0; CAP]),
        }
    }

    /// Reserves exactly one byte and writes it, wrapping if needed.
    /// Returns `false` if the ring is full (wrap-pending with nowhere to go).
    fn push(&self, value: u8) -> bool {
        let p = self.producer_pos.load(Ordering::Relaxed);
        let c = self.consumer_pos.load(Ordering::Acquire);

        let offset = if c <= p {
            if CAP - p > 1 {
                p
            } else {
                self.end_of_recorded_space.with_mut(|e| unsafe { *e = p });
                fence(Ordering::Release);
                if c == 0 {
                    return false;
                }
                self.producer_pos.store(0, Ordering::Relaxed);
                0
            }
        } else {
            p
        };

        self.storage
            .with_mut(|s| unsafe { (*s)[offset] = value });
        fence(Ordering::Release);
        self.producer_pos.store(offset + 1, Ordering::Release);
        true
    }

    /// Peeks and consumes a single byte if one is available.
    fn pop(&self) -> Option<u8> {
        let p = self.producer_pos.load(Ordering::Relaxed);
        let mut c = self.consumer_pos.load(Ordering::Relaxed);

        let (offset, avail) = if p < c {
            fence(Ordering::Acquire);
            let e = self.end_of_recorded_space.with(|e| unsafe { *e });
            if e > c {
                (c, 1)
            } else {
                c = 0;
                self.consumer_pos.store(0, Ordering::Release);
                (c, p - c)
            }
        } else {
            (c, p - c)
        };

        if avail == 0 {
            return None;
        }

        fence(Ordering::Acquire);
        let value = self.storage.with(|s| unsafe { (*s)[offset] });
        self.consumer_pos.store(offset + 1, Ordering::Release);
        Some(value)
    }
}

#[test]
fn loom_spsc_basic_fifo() {
    loom::model(|| {
        let ring = Arc::new(LoomByteRing::new());
        let ring2 = Arc::clone(&ring);

        let producer = thread::spawn(move || {
            ring2.push(1);
            ring2.push(2);
        });

        let consumer = thread::spawn(move || {
            let mut received = Vec::new();
            for _ in 0..8 {
                if let Some(v) = ring.pop() {
                    received.push(v);
                }
                if received.len() == 2 {
                    break;
                }
                loom::thread::yield_now();
            }
            received
        });

        producer.join().unwrap();
        let received = consumer.join().unwrap();

        if received.len() == 2 {
            assert_eq!(received, vec![1, 2]);
        }
    });
}

#[test]
fn loom_wrap_never_loses_a_byte() {
    loom::model(|| {
        let ring = Arc::new(LoomByteRing::new());

        // Fill to one short of capacity (one byte is reserved for the
        // empty/full distinction), then drain one byte before the producer
        // wraps, concurrently with a second producer push.
        assert!(ring.push(10));
        assert!(ring.push(20));
        assert!(ring.push(30));
        assert!(ring.pop() == Some(10));

        let ring2 = Arc::clone(&ring);
        let producer = thread::spawn(move || ring2.push(40));
        let consumer = thread::spawn(move || ring.pop());

        let pushed = producer.join().unwrap();
        let popped = consumer.join().unwrap();

        // Whatever interleaving loom picks, the producer never overwrites a
        // byte the consumer hasn't released, and the consumer never reads a
        // byte the producer hasn't committed.
        assert!(pushed);
        assert!(popped.is_some());
    });
}
