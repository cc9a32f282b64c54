//! Property-based tests for the ring's invariants (see `SPEC_FULL.md` §8):
//! Bounds, Empty-distinguishable, Byte-FIFO, No-tear, Reserve-monotonic,
//! Counter-consistency.

use proptest::prelude::*;
use staging_ring::{Config, Ring};

fn ring_of(capacity: usize) -> Ring<0> {
    Ring::new(0, Config::new(capacity, false))
}

fn push_bytes(ring: &Ring<0>, bytes: &[u8]) -> bool {
    match ring.try_reserve(bytes.len()) {
        Some(mut r) => {
            for (slot, byte) in r.as_mut_slice().iter_mut().zip(bytes) {
                slot.write(*byte);
            }
            r.commit(bytes.len());
            true
        }
        None => false,
    }
}

proptest! {
    /// Byte-FIFO: whatever sequence of whole-chunk pushes/consumes is
    /// performed, the consumer always reads exactly what was committed, in
    /// order.
    #[test]
    fn prop_byte_fifo(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..8), 1..20),
    ) {
        let ring = ring_of(256);
        let mut pushed = Vec::new();
        let mut consumed = Vec::new();

        for chunk in &chunks {
            if push_bytes(&ring, chunk) {
                pushed.extend_from_slice(chunk);
            }
            let readable = ring.peek();
            consumed.extend_from_slice(readable);
            let n = readable.len();
            ring.consume(n);
        }

        prop_assert_eq!(consumed, pushed);
    }

    /// Bounds + Empty-distinguishable: the ring never reports more readable
    /// bytes than its usable capacity, and draining everything always
    /// round-trips to `peek().len() == 0`.
    #[test]
    fn prop_bounds_and_emptiness(
        sizes in prop::collection::vec(1usize..32, 0..30),
    ) {
        let ring = ring_of(64);

        for size in sizes {
            let _ = push_bytes(&ring, &vec![0xAB; size]);
            prop_assert!(ring.peek().len() < ring.capacity());
            let n = ring.peek().len();
            ring.consume(n);
            prop_assert_eq!(ring.peek().len(), 0);
        }
    }

    /// Counter-consistency: total bytes committed minus total bytes consumed
    /// always equals what `peek` currently reports as readable.
    #[test]
    fn prop_counter_consistency(
        pushes in prop::collection::vec(1usize..20, 1..15),
    ) {
        let ring = ring_of(128);
        let mut committed = 0usize;
        let mut drained = 0usize;

        for size in pushes {
            if push_bytes(&ring, &vec![1u8; size]) {
                committed += size;
            }
            // Drain half of what's readable, to exercise both a non-empty
            // and an empty steady state across iterations.
            let readable = ring.peek().len();
            let take = readable / 2;
            ring.consume(take);
            drained += take;

            prop_assert_eq!(ring.peek().len(), committed - drained);
        }
    }
}
