//! One message queue: slot storage plus the producer-side cursors.

use std::sync::Arc;

use crate::error::Result;
use crate::ring::{Ring, Slot};
use crate::sequence::{Index, Sequence};

/// A fixed-capacity queue coordinated entirely through cursors.
///
/// `claim` hands out slot indexes to producers. `commit` is the
/// exclusive upper bound of the gap-free published prefix; it is the
/// value consumers gate on. Read cursors belong to their consumers and
/// reach the queue only through barriers.
pub struct Queue<T> {
    ring: Ring<T>,
    claim: Sequence,
    commit: Arc<Sequence>,
}

// Slot storage is raced only through the claim/commit protocol: one
// producer per claimed-uncommitted index, readers only behind an
// acquire-observed commit.
unsafe impl<T: Slot> Send for Queue<T> {}
unsafe impl<T: Slot> Sync for Queue<T> {}

impl<T: Slot> Queue<T> {
    /// `capacity` must be a power of two and at least 2.
    ///
    /// Every cursor starts at `capacity` rather than 0, as if one full
    /// lap had already happened; `slot - capacity` in the producer's
    /// wrap check then never underflows.
    pub fn new(capacity: usize) -> Result<Self> {
        let ring = Ring::new(capacity)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(capacity, "queue created");
        Ok(Self {
            claim: Sequence::new(capacity as Index),
            commit: Arc::new(Sequence::new(capacity as Index)),
            ring,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// The publish cursor, for wiring into consumer barriers.
    pub fn commit_cursor(&self) -> Arc<Sequence> {
        self.commit.clone()
    }

    #[inline]
    pub(crate) fn ring(&self) -> &Ring<T> {
        &self.ring
    }

    #[inline]
    pub(crate) fn commit(&self) -> &Sequence {
        &self.commit
    }

    #[inline]
    pub(crate) fn claim(&self) -> &Sequence {
        &self.claim
    }
}
