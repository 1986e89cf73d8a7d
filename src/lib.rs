//! A lock-free, bounded, multi-producer multi-consumer queue.
//!
//! Values live in a fixed ring of slots allocated once at construction. Producers and
//! consumers claim positions by CAS on two shared counters and hand slots to each other
//! through a per-slot sequence number, so there are no locks and no allocation after
//! construction. It is the bounded MPMC algorithm described by Dmitry Vyukov:
//!
//! https://www.1024cores.net/home/lock-free-algorithms/queues/bounded-mpmc-queue
//!
//! Operations never block. A full queue rejects `enqueue` with [`Full`] (returning the value)
//! and an empty one rejects `dequeue` with [`Empty`]; what to do next, whether spinning,
//! yielding or dropping the item, is up to the caller.
//!
//! ```
//! let q = seqring::Queue::new(4).unwrap();
//!
//! q.enqueue(1).unwrap();
//! q.enqueue(2).unwrap();
//! assert_eq!(q.dequeue(), Ok(1));
//! assert_eq!(q.dequeue(), Ok(2));
//! assert_eq!(q.dequeue(), Err(seqring::Empty));
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use error::{
    Empty,
    Error,
    Full,
};
pub use handle::{
    mpmc,
    Receiver,
    Sender,
    TryIter,
};
pub use queue::{
    Queue,
    MAX_CAPACITY,
};
pub use trace::init_tracing;

mod error;
mod handle;
mod loom_exports;
mod queue;
mod slot;
mod trace;
mod util;
