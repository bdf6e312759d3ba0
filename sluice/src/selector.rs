//! Non-blocking fan-in of several queues onto one thread.

use crate::get::Consumer;
use crate::ring::Slot;
use crate::spin::SpinPolicy;

/// Anything a [`Selector`] can poll for one bounded, non-blocking batch.
pub trait Source {
    /// Drain at most one batch and return how many messages it held.
    fn poll(&mut self) -> usize;
}

/// A consumer paired with its handler and a per-pass batch bound.
pub struct Lane<T: Slot, S: SpinPolicy, F: FnMut(&T)> {
    consumer: Consumer<T, S>,
    max_batch: usize,
    handler: F,
}

impl<T, S, F> Lane<T, S, F>
where
    T: Slot,
    S: SpinPolicy,
    F: FnMut(&T),
{
    pub fn new(consumer: Consumer<T, S>, max_batch: usize, handler: F) -> Self {
        Self {
            consumer,
            max_batch,
            handler,
        }
    }
}

impl<T, S, F> Source for Lane<T, S, F>
where
    T: Slot,
    S: SpinPolicy,
    F: FnMut(&T),
{
    fn poll(&mut self) -> usize {
        let batch = self.consumer.try_get_bounded(self.max_batch);
        let mut handled = 0;
        for msg in &batch {
            (self.handler)(msg);
            handled += 1;
        }
        handled
    }
}

/// Round-robin driver over an ordered set of sources.
///
/// One [`select`](Selector::select) pass takes at most one bounded
/// batch from each source in order, so a backlog on one queue cannot
/// starve the others. A pass with nothing ready anywhere returns 0
/// immediately; whether to spin, yield, or sleep between passes is the
/// driving thread's decision.
#[derive(Default)]
pub struct Selector {
    lanes: Vec<Box<dyn Source>>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: impl Source + 'static) {
        self.lanes.push(Box::new(source));
        #[cfg(feature = "tracing")]
        tracing::trace!(lanes = self.lanes.len(), "lane added");
    }

    /// One pass over every lane in order; returns messages handled.
    pub fn select(&mut self) -> usize {
        let mut handled = 0;
        for lane in &mut self.lanes {
            handled += lane.poll();
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::Barrier;
    use crate::put::Producer;
    use crate::queue::Queue;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn feeder(capacity: usize) -> (Producer<u64>, Consumer<u64>) {
        let queue = Arc::new(Queue::new(capacity).unwrap());
        let rx = Consumer::new(queue.clone(), Barrier::new(vec![queue.commit_cursor()]));
        let tx = Producer::new(queue, Barrier::new(vec![rx.cursor()]));
        (tx, rx)
    }

    #[test]
    fn one_pass_takes_at_most_one_batch_per_lane() {
        let (mut tx_a, rx_a) = feeder(16);
        let (mut tx_b, rx_b) = feeder(16);
        for i in 0..5u64 {
            tx_a.push(i);
            tx_b.push(100 + i);
        }

        let from_a = Arc::new(AtomicU64::new(0));
        let from_b = Arc::new(AtomicU64::new(0));

        let mut selector = Selector::new();
        let a = from_a.clone();
        selector.add(Lane::new(rx_a, 3, move |_: &u64| {
            a.fetch_add(1, Ordering::Relaxed);
        }));
        let b = from_b.clone();
        selector.add(Lane::new(rx_b, 3, move |_: &u64| {
            b.fetch_add(1, Ordering::Relaxed);
        }));

        // Backlog of 5 on each side, bound of 3: a pass takes exactly 3
        // from each, never more.
        assert_eq!(selector.select(), 6);
        assert_eq!(from_a.load(Ordering::Relaxed), 3);
        assert_eq!(from_b.load(Ordering::Relaxed), 3);

        assert_eq!(selector.select(), 4);
        assert_eq!(selector.select(), 0);
    }

    #[test]
    fn empty_pass_returns_immediately() {
        let (_tx, rx) = feeder(8);
        let mut selector = Selector::new();
        selector.add(Lane::new(rx, 8, |_: &u64| {}));
        assert_eq!(selector.select(), 0);
    }
}
