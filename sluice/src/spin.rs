//! Wait-loop policies.
//!
//! A policy is invoked on every iteration of a blocked claim or commit
//! loop. It trades CPU for latency, or surfaces the fact that a wait
//! happened at all; it cannot affect protocol correctness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait SpinPolicy {
    fn idle(&self);
}

/// Busy-spin. Lowest latency, burns the core.
#[derive(Clone, Copy, Debug, Default)]
pub struct Busy;

impl SpinPolicy for Busy {
    #[inline]
    fn idle(&self) {
        std::hint::spin_loop();
    }
}

/// Hand the core back to the scheduler between polls.
#[derive(Clone, Copy, Debug, Default)]
pub struct Yield;

impl SpinPolicy for Yield {
    #[inline]
    fn idle(&self) {
        std::thread::yield_now();
    }
}

/// Diagnostic probe: counts wait iterations.
///
/// Clones share one counter, so a test can hand the policy to a
/// producer or consumer and watch the original.
#[derive(Clone, Debug, Default)]
pub struct Counter {
    hits: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

impl SpinPolicy for Counter {
    #[inline]
    fn idle(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        std::hint::spin_loop();
    }
}

/// Diagnostic probe: panics on the first wait iteration.
///
/// Installed on paths a test asserts can never block, turning "would
/// have waited" into an immediate failure instead of a hang.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trip;

impl SpinPolicy for Trip {
    fn idle(&self) {
        panic!("blocked on a path that must not wait");
    }
}
