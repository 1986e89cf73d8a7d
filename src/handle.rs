use crate::{
    error::{Empty, Error, Full},
    loom_exports::sync::Arc,
    queue::Queue,
};

/// Producer handle to a shared [`Queue`]. Clone it to add producers.
pub struct Sender<T> {
    queue: Arc<Queue<T>>,
}

/// Consumer handle to a shared [`Queue`]. Clone it to add consumers.
pub struct Receiver<T> {
    queue: Arc<Queue<T>>,
}

/// Create a queue of `capacity` slots and split it into a sender and a receiver.
///
/// Both handles can be cloned freely; the queue and any values still in it are dropped
/// together with the last handle.
pub fn mpmc<T>(capacity: usize) -> Result<(Sender<T>, Receiver<T>), Error> {
    let queue = Arc::new(Queue::new(capacity)?);

    let sender = Sender { queue: queue.clone() };
    let receiver = Receiver { queue };

    Ok((sender, receiver))
}

impl<T> Sender<T> {
    /// Enqueue `value`, or hand it back in [`Full`] if there is no free slot.
    #[inline(always)]
    pub fn try_send(&self, value: T) -> Result<(), Full<T>> {
        self.queue.enqueue(value)
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Best-effort snapshot, see [`Queue::len`].
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Receiver<T> {
    /// Dequeue the front value, or [`Empty`] if there is none.
    #[inline(always)]
    pub fn try_recv(&self) -> Result<T, Empty> {
        self.queue.dequeue()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Best-effort snapshot, see [`Queue::len`].
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate over the values that can be dequeued right now. Stops at the first [`Empty`].
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { receiver: self }
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T> core::fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sender").field("queue", &*self.queue).finish()
    }
}

impl<T> core::fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Receiver").field("queue", &*self.queue).finish()
    }
}

/// Iterator returned by [`Receiver::try_iter`].
pub struct TryIter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<'a, T> Iterator for TryIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.try_recv().ok()
    }
}
