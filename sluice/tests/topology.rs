//! Threaded end-to-end tests over whole topologies.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use sluice::spin::{Busy, Counter, Trip, Yield};
use sluice::{Barrier, Consumer, Lane, Producer, Queue, Selector, Shared, Slot, Unique};
use sluice_test_support::{ParityChecker, SequenceChecker};

const QSIZE: usize = 1 << 10;

fn commit_barrier<T: Slot>(queue: &Arc<Queue<T>>) -> Barrier {
    Barrier::new(vec![queue.commit_cursor()])
}

#[test]
fn one_to_one_keeps_order() {
    const COUNT: u64 = 1_000_000;
    let queue = Arc::new(Queue::<u64>::new(QSIZE).unwrap());
    let mut rx: Consumer<u64> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let mut tx: Producer<u64> = Producer::new(queue.clone(), Barrier::new(vec![rx.cursor()]));

    let producer = thread::spawn(move || {
        for i in 1..=COUNT {
            tx.push(i);
        }
    });

    let mut check = SequenceChecker::new();
    while check.count() < COUNT {
        for msg in &rx.get() {
            check.push(*msg);
        }
    }
    producer.join().unwrap();

    assert!(check.is_clean(), "order violated: {:?}", check);
    assert_eq!(check.last(), COUNT);
}

#[test]
fn two_to_one_shared_commit_keeps_parity_order() {
    const PER_PRODUCER: u64 = 100_000;
    let queue = Arc::new(Queue::<u64>::new(QSIZE).unwrap());
    let mut rx: Consumer<u64> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let tx: Producer<u64, Shared> =
        Producer::new(queue.clone(), Barrier::new(vec![rx.cursor()]));

    let mut tx_odd = tx.clone();
    let mut tx_even = tx;
    let odd = thread::spawn(move || {
        for n in 0..PER_PRODUCER {
            tx_odd.push(3 + 2 * n);
        }
    });
    let even = thread::spawn(move || {
        for n in 0..PER_PRODUCER {
            tx_even.push(2 + 2 * n);
        }
    });

    let mut check = ParityChecker::seeded(1, 0);
    while check.count() < 2 * PER_PRODUCER {
        for msg in &rx.get() {
            check.push(*msg);
        }
    }
    odd.join().unwrap();
    even.join().unwrap();

    assert_eq!(check.violations(), 0);
}

#[test]
fn one_to_two_fan_out_delivers_everything_to_both() {
    const COUNT: u64 = 200_000;
    let queue = Arc::new(Queue::<u64>::new(QSIZE).unwrap());
    let c1: Consumer<u64> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let c2: Consumer<u64> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let mut tx: Producer<u64> = Producer::new(
        queue.clone(),
        Barrier::new(vec![c1.cursor(), c2.cursor()]),
    );

    let mut readers = Vec::new();
    for mut consumer in [c1, c2] {
        readers.push(thread::spawn(move || {
            let mut check = SequenceChecker::new();
            while check.count() < COUNT {
                for msg in &consumer.get() {
                    check.push(*msg);
                }
            }
            check
        }));
    }

    for i in 1..=COUNT {
        tx.push(i);
    }
    for reader in readers {
        let check = reader.join().unwrap();
        assert!(check.is_clean(), "order violated: {:?}", check);
        assert_eq!(check.last(), COUNT);
    }
}

/// One producer, two independent consumers, and a third gated on both.
/// The gated consumer must never see a message before both of the
/// others have seen it.
#[test]
fn diamond_gates_the_third_consumer() {
    let queue = Arc::new(Queue::<u64>::new(4).unwrap());
    // Trip: these gets must always find data without waiting.
    let mut c1: Consumer<u64, Trip> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let mut c2: Consumer<u64, Trip> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let mut c3: Consumer<u64, Trip> = Consumer::new(
        queue.clone(),
        Barrier::new(vec![c1.cursor(), c2.cursor()]),
    );
    // c3 trails the other two, so it alone gates the producer.
    let mut tx: Producer<u64, Unique, Trip, Trip> =
        Producer::new(queue.clone(), Barrier::new(vec![c3.cursor()]));

    let (mut m1, mut m2, mut m3) = (0u64, 0u64, 0u64);
    for value in [42u64, 43, 44] {
        tx.push(value);

        assert!(c3.try_get().is_empty(), "gated consumer ran early");
        for msg in &c1.get() {
            m1 = *msg;
        }
        assert!(c3.try_get().is_empty(), "second upstream not done yet");
        for msg in &c2.get() {
            m2 = *msg;
        }
        for msg in &c3.get() {
            m3 = *msg;
        }
        assert_eq!((m1, m2, m3), (value, value, value));
    }
    assert_eq!((m1, m2, m3), (44, 44, 44));
}

/// Filling the ring to capacity never waits; the claim one past
/// capacity must wait, and turning that wait into a panic proves the
/// gate fired rather than memory being reused early.
#[test]
fn full_ring_trips_the_claim_gate() {
    let queue = Arc::new(Queue::<u64>::new(2).unwrap());
    let mut rx: Consumer<u64, Trip> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let mut tx: Producer<u64, Unique, Trip, Trip> =
        Producer::new(queue.clone(), Barrier::new(vec![rx.cursor()]));

    tx.push(42);
    tx.push(43);

    let blocked = catch_unwind(AssertUnwindSafe(|| tx.push(44)));
    assert!(blocked.is_err(), "third claim should have hit the gate");

    let batch = rx.get();
    let got: Vec<u64> = batch.iter().copied().collect();
    assert_eq!(got, vec![42, 43]);
    drop(batch);

    // The tripped claim never committed, so nothing further is visible.
    assert!(rx.try_get().is_empty());
}

/// The claim gate opens again once downstream advances.
#[test]
fn blocked_producer_resumes_after_drain() {
    let queue = Arc::new(Queue::<u64>::new(4).unwrap());
    let mut rx: Consumer<u64, Yield> = Consumer::new(queue.clone(), commit_barrier(&queue));
    let probe = Counter::new();
    let mut tx: Producer<u64, Unique, Counter, Busy> = Producer::with_spin(
        queue.clone(),
        Barrier::new(vec![rx.cursor()]),
        probe.clone(),
        Busy,
    );

    // Filling to capacity must not wait at all.
    for v in 0..4u64 {
        tx.push(v);
    }
    assert_eq!(probe.hits(), 0);

    let gate = probe.clone();
    let drainer = thread::spawn(move || {
        // Wait until the producer is demonstrably blocked, then free it.
        while gate.hits() == 0 {
            thread::yield_now();
        }
        assert_eq!(rx.get().len(), 4);
    });

    tx.push(4);
    drainer.join().unwrap();
    assert!(probe.hits() > 0);
}

#[test]
fn selector_bridges_two_queues_into_one() {
    const PER_PRODUCER: u64 = 50_000;
    const EOS: u64 = 0;

    let in1 = Arc::new(Queue::<u64>::new(QSIZE).unwrap());
    let in2 = Arc::new(Queue::<u64>::new(QSIZE).unwrap());
    let out = Arc::new(Queue::<u64>::new(QSIZE).unwrap());

    let g1: Consumer<u64> = Consumer::new(in1.clone(), commit_barrier(&in1));
    let g2: Consumer<u64> = Consumer::new(in2.clone(), commit_barrier(&in2));
    let mut sink: Consumer<u64> = Consumer::new(out.clone(), commit_barrier(&out));

    let mut p1: Producer<u64> = Producer::new(in1.clone(), Barrier::new(vec![g1.cursor()]));
    let mut p2: Producer<u64> = Producer::new(in2.clone(), Barrier::new(vec![g2.cursor()]));
    // Both lanes forward into `out` from the bridge thread; the commit
    // slots still interleave, so the forwarding producers are Shared.
    let forward: Producer<u64, Shared> =
        Producer::new(out.clone(), Barrier::new(vec![sink.cursor()]));

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
                selector.add(Lane::new(consumer, 256, move |msg: &u64| {
                    if *msg == EOS {
                        eos_pending.fetch_sub(1, Ordering::Relaxed);
                    }
                    forward.push(*msg);
                }));
            }
            // Both end-of-stream markers are the last message of their
            // queue, so once both are seen everything was forwarded.
            while eos_pending.load(Ordering::Relaxed) > 0 {
                if selector.select() == 0 {
                    std::hint::spin_loop();
                }
            }
        })
    };

    let mut check = ParityChecker::seeded(1, 2);
    let mut eos_seen = 0;
    while eos_seen < 2 {
        for msg in &sink.get() {
            if *msg == EOS {
                eos_seen += 1;
            } else {
                check.push(*msg);
            }
        }
    }
    odd.join().unwrap();
    even.join().unwrap();
    bridge.join().unwrap();

    assert_eq!(check.violations(), 0);
    assert_eq!(check.count(), 2 * PER_PRODUCER);
}
