//! Basic single-producer single-consumer pipe.
//!
//! Run: cargo run --release --example pipe

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use sluice::{Barrier, Consumer, Producer, Queue};

const RING_SIZE: usize = 1 << 16;
const MESSAGE_COUNT: u64 = 10_000_000;

fn main() {
    println!("\n=== SPSC pipe ===\n");

    let queue = Arc::new(Queue::<u64>::new(RING_SIZE).unwrap());

    // The consumer gates on the queue's commit cursor; the producer
    // gates on the consumer's read cursor. That pair of barriers is the
    // whole topology.
    let mut rx: Consumer<u64> =
        Consumer::new(queue.clone(), Barrier::new(vec![queue.commit_cursor()]));
    let mut tx: Producer<u64> = Producer::new(queue.clone(), Barrier::new(vec![rx.cursor()]));

    let start = Instant::now();

    let producer = thread::spawn(move || {
        for i in 1..=MESSAGE_COUNT {
            tx.push(i);
        }
        println!("producer: sent {} messages", MESSAGE_COUNT);
    });

    let consumer = thread::spawn(move || {
        let mut received = 0u64;
        let mut previous = 0u64;
        while received < MESSAGE_COUNT {
            // A Get claims everything published since the last batch;
            // dropping it releases the whole range in one store.
            for msg in &rx.get() {
                assert_eq!(*msg, previous + 1, "order broken");
                previous = *msg;
                received += 1;
            }
        }
        println!("consumer: received {} messages", received);
    });

    producer.join().unwrap();
    consumer.join().unwrap();

    let elapsed = start.elapsed();
    let rate = MESSAGE_COUNT as f64 / elapsed.as_secs_f64() / 1e6;
    println!("\n{:.1} M msg/s ({:?} total)", rate, elapsed);
}
