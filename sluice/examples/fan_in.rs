//! Two producers sharing one queue under the Shared commit policy.
//!
//! One thread sends odd values, the other even; the consumer checks
//! each parity stream arrives in order whatever the interleaving.
//!
//! Run: cargo run --release --example fan_in

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use sluice::affinity::pin_to_core;
use sluice::{Barrier, Consumer, Producer, Queue, Shared};

const RING_SIZE: usize = 1 << 17;
const PER_PRODUCER: u64 = 5_000_000;

fn main() {
    println!("\n=== 2-to-1 shared commit ===\n");

    let queue = Arc::new(Queue::<u64>::new(RING_SIZE).unwrap());
    let mut rx: Consumer<u64> =
        Consumer::new(queue.clone(), Barrier::new(vec![queue.commit_cursor()]));
    let tx: Producer<u64, Shared> =
        Producer::new(queue.clone(), Barrier::new(vec![rx.cursor()]));

    let start = Instant::now();

    let mut producers = Vec::new();
    for (core, first) in [(1usize, 3u64), (2, 2)] {
        let mut tx = tx.clone();
        producers.push(thread::spawn(move || {
            let _ = pin_to_core(core);
            for n in 0..PER_PRODUCER {
                tx.push(first + 2 * n);
            }
        }));
    }

    let _ = pin_to_core(0);
    let mut last_odd = 1u64;
    let mut last_even = 0u64;
    let mut received = 0u64;
    while received < 2 * PER_PRODUCER {
        for msg in &rx.get() {
            let last = if msg & 1 == 1 {
                &mut last_odd
            } else {
                &mut last_even
            };
            assert_eq!(*msg, *last + 2, "parity stream broken");
            *last = *msg;
            received += 1;
        }
    }

    for producer in producers {
        producer.join().unwrap();
    }

    let elapsed = start.elapsed();
    let rate = received as f64 / elapsed.as_secs_f64() / 1e6;
    println!("{} messages, {:.1} M msg/s ({:?})", received, rate, elapsed);
}
