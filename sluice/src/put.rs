//! Producer side of the protocol: claim, write, publish.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::barrier::Barrier;
use crate::queue::Queue;
use crate::ring::Slot;
use crate::sequence::{Index, Sequence};
use crate::spin::{Busy, SpinPolicy};

/// How a producer publishes a claimed slot.
pub trait CommitPolicy {
    /// Memory ordering for the claim `fetch_add`.
    const CLAIM: Ordering;

    /// Whether this producer must keep waiting before advancing the
    /// commit cursor past `claimed`.
    fn should_wait(commit: &Sequence, claimed: Index) -> bool;
}

/// Exactly one producer thread; publishing needs no coordination.
pub struct Unique;

impl CommitPolicy for Unique {
    const CLAIM: Ordering = Ordering::Relaxed;

    #[inline]
    fn should_wait(_commit: &Sequence, _claimed: Index) -> bool {
        false
    }
}

/// Any number of producer threads sharing one write cursor.
///
/// Claims are atomic but may finish out of claim order, and consumers
/// need a gap-free prefix. Each producer therefore waits until the
/// commit cursor reaches its own slot (the immediate predecessor has
/// published at that point) before advancing it by one. The claim is
/// the start of the dependency chain into the slot, so it carries
/// acquire ordering here.
pub struct Shared;

impl CommitPolicy for Shared {
    const CLAIM: Ordering = Ordering::Acquire;

    #[inline]
    fn should_wait(commit: &Sequence, claimed: Index) -> bool {
        commit.load(Ordering::Acquire) < claimed
    }
}

/// Write handle for one queue.
///
/// `barrier` aggregates every downstream cursor that must move past a
/// slot's previous lap before that slot may be reclaimed, typically
/// the terminal consumers of the topology.
pub struct Producer<T, C = Unique, CS = Busy, PS = Busy> {
    queue: Arc<Queue<T>>,
    barrier: Barrier,
    claim_spin: CS,
    commit_spin: PS,
    _commit: PhantomData<C>,
}

impl<T, C, CS, PS> Producer<T, C, CS, PS>
where
    T: Slot,
    C: CommitPolicy,
    CS: SpinPolicy,
    PS: SpinPolicy,
{
    pub fn new(queue: Arc<Queue<T>>, barrier: Barrier) -> Self
    where
        CS: Default,
        PS: Default,
    {
        Self::with_spin(queue, barrier, CS::default(), PS::default())
    }

    pub fn with_spin(queue: Arc<Queue<T>>, barrier: Barrier, claim_spin: CS, commit_spin: PS) -> Self {
        Self {
            queue,
            barrier,
            claim_spin,
            commit_spin,
            _commit: PhantomData,
        }
    }

    /// Claim the next slot, waiting while the ring is full.
    ///
    /// The claimed index reuses the position of `slot - capacity`, so
    /// writing must wait until every barrier cursor has moved past that
    /// index. Once observed, the condition cannot be invalidated:
    /// downstream cursors only ever advance. A full ring blocks the
    /// claim; it never drops and never grows.
    pub fn put(&mut self) -> Put<'_, T, C, PS> {
        let at = self.queue.claim().fetch_add(1, C::CLAIM);
        let wrap_at = at - self.queue.capacity() as Index;
        while self.barrier.least() <= wrap_at {
            self.claim_spin.idle();
        }
        Put {
            queue: &*self.queue,
            commit_spin: &self.commit_spin,
            at,
            _commit: PhantomData,
        }
    }

    /// Claim, write, and publish one value.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.put().write(value);
    }
}

/// Only shared-commit producers can be cloned; a [`Unique`] producer
/// has a single owner by construction.
impl<T, CS, PS> Clone for Producer<T, Shared, CS, PS>
where
    T: Slot,
    CS: SpinPolicy + Clone,
    PS: SpinPolicy + Clone,
{
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            barrier: self.barrier.clone(),
            claim_spin: self.claim_spin.clone(),
            commit_spin: self.commit_spin.clone(),
            _commit: PhantomData,
        }
    }
}

/// One claimed slot, exclusively writable until the guard drops.
///
/// Dropping is the single commit point and runs on every exit path,
/// unwinding included. A claimed slot that never committed would stall
/// everything downstream of it forever, so there is deliberately no way
/// to abandon a `Put`.
pub struct Put<'a, T: Slot, C: CommitPolicy, PS: SpinPolicy> {
    queue: &'a Queue<T>,
    commit_spin: &'a PS,
    at: Index,
    _commit: PhantomData<C>,
}

impl<T: Slot, C: CommitPolicy, PS: SpinPolicy> Put<'_, T, C, PS> {
    /// The index claimed by this put.
    pub fn index(&self) -> Index {
        self.at
    }

    /// Store `value` and publish by consuming the guard.
    #[inline]
    pub fn write(mut self, value: T) {
        *self = value;
    }
}

impl<T: Slot, C: CommitPolicy, PS: SpinPolicy> Deref for Put<'_, T, C, PS> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the claim gives this guard sole access to the slot
        // until commit, and the wrap wait has retired all readers of
        // the previous lap.
        unsafe { &*self.queue.ring().slot(self.at) }
    }
}

impl<T: Slot, C: CommitPolicy, PS: SpinPolicy> DerefMut for Put<'_, T, C, PS> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as for `deref`.
        unsafe { &mut *self.queue.ring().slot(self.at) }
    }
}

impl<T: Slot, C: CommitPolicy, PS: SpinPolicy> Drop for Put<'_, T, C, PS> {
    fn drop(&mut self) {
        while C::should_wait(self.queue.commit(), self.at) {
            self.commit_spin.idle();
        }
        // Only the producer waiting on exactly this cursor value can
        // reach here, so a plain increment publishes without a CAS.
        self.queue.commit().fetch_add(1, Ordering::Release);
    }
}
