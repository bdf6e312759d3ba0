//! Monotonic atomic cursors.

use std::sync::atomic::{AtomicU64, Ordering};

/// Position in a queue.
///
/// Indexes increase monotonically for the life of the process and are
/// mapped to ring slots by masking. At one claim per nanosecond a 64-bit
/// index lasts over five centuries, so wrapping is not handled; a stale
/// index is always distinguishable from a current one by magnitude,
/// which is what keeps the CAS-free protocol clear of ABA.
pub type Index = u64;

/// An atomic [`Index`] owned by exactly one role (the write cursor, the
/// commit cursor, or one read cursor per consumer). Only the owning role
/// stores to it; anyone gated on that role loads it through a
/// [`Barrier`](crate::Barrier).
///
/// Padded to two cache lines so adjacent cursors never share a line,
/// even under adjacent-line prefetch.
#[repr(align(128))]
#[derive(Debug)]
pub struct Sequence(AtomicU64);

impl Sequence {
    pub fn new(at: Index) -> Self {
        Self(AtomicU64::new(at))
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> Index {
        self.0.load(order)
    }

    #[inline]
    pub fn store(&self, at: Index, order: Ordering) {
        self.0.store(at, order)
    }

    #[inline]
    pub fn fetch_add(&self, n: Index, order: Ordering) -> Index {
        self.0.fetch_add(n, order)
    }
}
