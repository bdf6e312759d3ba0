//! Aggregation over the cursors a role must not overtake.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::sequence::{Index, Sequence};

/// A read-only view over a fixed set of cursors, reporting how far the
/// slowest of them has progressed.
///
/// Producers gate on downstream read cursors before reusing a slot;
/// consumers gate on the commit cursor or on consumers that must run
/// first. Which cursors feed which barriers is the whole topology, and
/// it is fixed at wiring time.
#[derive(Clone)]
pub struct Barrier {
    cursors: Vec<Arc<Sequence>>,
}

impl Barrier {
    pub fn new(cursors: Vec<Arc<Sequence>>) -> Self {
        Self { cursors }
    }

    /// Minimum over acquire-loads of the constituents.
    ///
    /// An empty barrier is unconstrained and reports `Index::MAX`. The
    /// fold is order-independent: permuting the constituents never
    /// changes the result.
    #[inline]
    pub fn least(&self) -> Index {
        self.cursors
            .iter()
            .map(|c| c.load(Ordering::Acquire))
            .min()
            .unwrap_or(Index::MAX)
    }
}
