//! Two queues fanned into one thread by a selector, forwarded into a
//! third queue.
//!
//! The same two-streams-one-consumer shape as the fan_in example, but
//! each producer keeps its own queue (Unique commit, no producer
//! contention) and a bridge thread merges them. With fast producers the
//! merge tends to beat the shared-commit version.
//!
//! Run: cargo run --release --example bridge

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use sluice::{Barrier, Consumer, Lane, Producer, Queue, Selector, Shared};

const RING_SIZE: usize = 1 << 16;
const PER_PRODUCER: u64 = 5_000_000;
const EOS: u64 = 0;

fn main() {
    println!("\n=== 2-to-1 over a selector bridge ===\n");

    let in1 = Arc::new(Queue::<u64>::new(RING_SIZE).unwrap());
    let in2 = Arc::new(Queue::<u64>::new(RING_SIZE).unwrap());
    let out = Arc::new(Queue::<u64>::new(RING_SIZE).unwrap());

    let g1: Consumer<u64> = Consumer::new(in1.clone(), Barrier::new(vec![in1.commit_cursor()]));
    let g2: Consumer<u64> = Consumer::new(in2.clone(), Barrier::new(vec![in2.commit_cursor()]));
    let mut sink: Consumer<u64> =
        Consumer::new(out.clone(), Barrier::new(vec![out.commit_cursor()]));

    let mut p1: Producer<u64> = Producer::new(in1.clone(), Barrier::new(vec![g1.cursor()]));
    let mut p2: Producer<u64> = Producer::new(in2.clone(), Barrier::new(vec![g2.cursor()]));
    let forward: Producer<u64, Shared> =
        Producer::new(out.clone(), Barrier::new(vec![sink.cursor()]));

    let start = Instant::now();

    let odd = thread::spawn(move || {
        for n in 0..PER_PRODUCER {
            p1.push(3 + 2 * n);
        }
        p1.push(EOS);
    });
    let even = thread::spawn(move || {
        for n in 0..PER_PRODUCER {
            p2.push(4 + 2 * n);
        }
        p2.push(EOS);
    });

    let eos_pending = Arc::new(AtomicU64::new(2));
    let bridge = {
        let eos_pending = eos_pending.clone();
        thread::spawn(move || {
            let mut selector = Selector::new();
            for consumer in [g1, g2] {
                let mut forward = forward.clone();
                let eos_pending = eos_pending.clone();
                selector.add(Lane::new(consumer, 1024, move |msg: &u64| {
                    if *msg == EOS {
                        eos_pending.fetch_sub(1, Ordering::Relaxed);
                    }
                    forward.push(*msg);
                }));
            }
            while eos_pending.load(Ordering::Relaxed) > 0 {
                if selector.select() == 0 {
                    std::hint::spin_loop();
                }
            }
        })
    };

    let mut last_odd = 1u64;
    let mut last_even = 2u64;
    let mut received = 0u64;
    let mut eos_seen = 0;
    while eos_seen < 2 {
        for msg in &sink.get() {
            if *msg == EOS {
                eos_seen += 1;
                continue;
            }
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

    odd.join().unwrap();
    even.join().unwrap();
    bridge.join().unwrap();

    let elapsed = start.elapsed();
    let rate = received as f64 / elapsed.as_secs_f64() / 1e6;
    println!("{} messages, {:.1} M msg/s ({:?})", received, rate, elapsed);
}
