//! Minimal producer/consumer loop against a single ring, run on one thread
//! for clarity. A real deployment pins the producer and consumer to distinct
//! cores and runs them concurrently; see the crate docs for the threading
//! contract.

use staging_ring::{Config, Ring};

fn main() {
    let ring: Ring<64> = Ring::new(0, Config::new(1 << 16, true));

    for batch in 0..3u8 {
        let payload = format!("record-{batch}");
        let bytes = payload.as_bytes();

        let mut reservation = ring.reserve(bytes.len());
        for (slot, byte) in reservation.as_mut_slice().iter_mut().zip(bytes) {
            slot.write(*byte);
        }
        reservation.commit(bytes.len());

        let readable = ring.peek();
        println!("consumer sees: {}", String::from_utf8_lossy(readable));
        let len = readable.len();
        ring.consume(len);
    }

    ring.mark_for_deletion();
    println!("ring {} drained: {}", ring.id(), ring.can_delete());
    println!("stats: {:?}", ring.stats());
}
