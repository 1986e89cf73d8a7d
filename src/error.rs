use thiserror::Error;

/// Configuration error reported by [`Queue::new`](crate::Queue::new) and
/// [`mpmc`](crate::mpmc). It can only happen at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid queue capacity {capacity}: must be between 1 and {max}", max = crate::MAX_CAPACITY)]
    InvalidCapacity { capacity: usize },
}

/// Returned by `enqueue` when every slot holds a value. Carries the rejected value back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Take back the value that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Returned by `dequeue` when no slot holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is empty")]
pub struct Empty;
