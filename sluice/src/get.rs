//! Consumer side of the protocol: batched claims over published slots.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::barrier::Barrier;
use crate::queue::Queue;
use crate::ring::{Ring, Slot};
use crate::sequence::{Index, Sequence};
use crate::spin::{Busy, SpinPolicy};

/// Read handle for one queue.
///
/// Owns its read cursor; batches are claimed against an upstream
/// barrier: the queue's commit cursor, or the read cursors of
/// consumers that must process a message first. Independent consumers
/// each own a cursor and never touch shared ring state, so fan-out
/// needs no further coordination.
pub struct Consumer<T, S = Busy> {
    queue: Arc<Queue<T>>,
    barrier: Barrier,
    cursor: Arc<Sequence>,
    spin: S,
}

impl<T, S> Consumer<T, S>
where
    T: Slot,
    S: SpinPolicy,
{
    pub fn new(queue: Arc<Queue<T>>, barrier: Barrier) -> Self
    where
        S: Default,
    {
        Self::with_spin(queue, barrier, S::default())
    }

    pub fn with_spin(queue: Arc<Queue<T>>, barrier: Barrier, spin: S) -> Self {
        let cursor = Arc::new(Sequence::new(queue.capacity() as Index));
        Self {
            queue,
            barrier,
            cursor,
            spin,
        }
    }

    /// This consumer's read cursor, for gating producers or further
    /// consumers on it.
    pub fn cursor(&self) -> Arc<Sequence> {
        self.cursor.clone()
    }

    /// Claim every slot published past our cursor, waiting until at
    /// least one is available.
    ///
    /// Batching amortizes the synchronization: one barrier load exposes
    /// the whole range, one cursor store on drop releases it.
    pub fn get(&mut self) -> Get<'_, T> {
        let begin = self.cursor.load(Ordering::Relaxed);
        let end = self.claim(begin);
        self.batch(begin, end)
    }

    /// Waiting claim of at most `max` slots.
    pub fn get_bounded(&mut self, max: usize) -> Get<'_, T> {
        let begin = self.cursor.load(Ordering::Relaxed);
        let end = self.claim(begin).min(begin + max as Index);
        self.batch(begin, end)
    }

    /// Claim whatever is available right now, possibly nothing.
    ///
    /// Never waits; an empty batch leaves the cursor untouched.
    pub fn try_get(&mut self) -> Get<'_, T> {
        let begin = self.cursor.load(Ordering::Relaxed);
        let end = self.barrier.least();
        self.batch(begin, end)
    }

    /// Non-waiting claim of at most `max` slots. This is what a
    /// selector lane runs once per pass.
    pub fn try_get_bounded(&mut self, max: usize) -> Get<'_, T> {
        let begin = self.cursor.load(Ordering::Relaxed);
        let end = self.barrier.least().min(begin + max as Index);
        self.batch(begin, end)
    }

    fn claim(&self, begin: Index) -> Index {
        loop {
            let end = self.barrier.least();
            if end > begin {
                return end;
            }
            self.spin.idle();
        }
    }

    fn batch(&mut self, begin: Index, end: Index) -> Get<'_, T> {
        Get {
            ring: self.queue.ring(),
            cursor: &self.cursor,
            begin,
            end,
        }
    }
}

/// One claimed batch: the half-open index range `[begin, end)`.
///
/// Iteration yields the slots in publish order, across the wrap
/// boundary. Dropping the guard releases the whole range to anyone
/// gated on this consumer; an empty batch must not perturb the cursor,
/// so it stores nothing.
pub struct Get<'a, T: Slot> {
    ring: &'a Ring<T>,
    cursor: &'a Sequence,
    begin: Index,
    end: Index,
}

impl<'a, T: Slot> Get<'a, T> {
    pub fn len(&self) -> usize {
        (self.end - self.begin) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            ring: self.ring,
            at: self.begin,
            end: self.end,
        }
    }
}

impl<'g, 'a, T: Slot> IntoIterator for &'g Get<'a, T> {
    type Item = &'g T;
    type IntoIter = Iter<'g, T>;

    fn into_iter(self) -> Iter<'g, T> {
        self.iter()
    }
}

impl<T: Slot> Drop for Get<'_, T> {
    fn drop(&mut self) {
        if self.begin != self.end {
            self.cursor.store(self.end, Ordering::Release);
        }
    }
}

pub struct Iter<'g, T> {
    ring: &'g Ring<T>,
    at: Index,
    end: Index,
}

impl<'g, T: Slot> Iterator for Iter<'g, T> {
    type Item = &'g T;

    #[inline]
    fn next(&mut self) -> Option<&'g T> {
        if self.at == self.end {
            return None;
        }
        // SAFETY: `[begin, end)` is behind an acquire-observed commit,
        // and no producer reclaims it until our cursor moves past.
        let slot = unsafe { &*self.ring.slot(self.at) };
        self.at += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.at) as usize;
        (n, Some(n))
    }
}

impl<T: Slot> ExactSizeIterator for Iter<'_, T> {}
