//! Sluice - lock-free sequence-coordinated ring buffers.
//!
//! One fixed-capacity ring per queue, coordinated entirely through
//! monotonic atomic cursors: producers claim and publish slots,
//! [`Barrier`]s report the slowest dependency, consumers take batches.
//! No mutex, no condition variable, no allocation after construction;
//! a full ring blocks its producers instead of dropping or growing.
//! Pipelines of any fan-out/fan-in shape are wired by choosing which
//! cursors feed which barriers.
//!
//! ```
//! use std::sync::Arc;
//! use sluice::{Barrier, Consumer, Producer, Queue};
//!
//! let queue = Arc::new(Queue::<u64>::new(8).unwrap());
//! let mut rx: Consumer<u64> =
//!     Consumer::new(queue.clone(), Barrier::new(vec![queue.commit_cursor()]));
//! let mut tx: Producer<u64> =
//!     Producer::new(queue.clone(), Barrier::new(vec![rx.cursor()]));
//!
//! tx.push(7);
//! for msg in &rx.get() {
//!     assert_eq!(*msg, 7);
//! }
//! ```

pub mod affinity;
pub mod barrier;
pub mod error;
pub mod get;
pub mod put;
pub mod queue;
pub mod ring;
pub mod selector;
pub mod sequence;
pub mod spin;

// Re-export the working set.
pub use barrier::Barrier;
pub use error::{Result, SluiceError};
pub use get::{Consumer, Get};
pub use put::{CommitPolicy, Producer, Put, Shared, Unique};
pub use queue::Queue;
pub use ring::{Ring, Slot};
pub use selector::{Lane, Selector, Source};
pub use sequence::{Index, Sequence};
pub use spin::SpinPolicy;
