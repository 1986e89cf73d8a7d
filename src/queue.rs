use core::{
    fmt,
    sync::atomic::Ordering,
};

use crossbeam_utils::{Backoff, CachePadded};

use crate::{
    error::{Empty, Error, Full},
    loom_exports::{self, sync::atomic::AtomicUsize},
    slot::SlotArray,
    trace::{debug, trace},
    util::distance,
};

/// Largest capacity accepted by [`Queue::new`]. Keeps the stamp distance of one lap
/// representable as a positive `isize`.
pub const MAX_CAPACITY: usize = (1 << (usize::BITS - 2)) - 1;

/// A bounded, lock-free, multi-producer multi-consumer FIFO queue.
///
/// `enqueue` and `dequeue` never wait: a full queue hands the value back in [`Full`] and an
/// empty one returns [`Empty`]. Share it between threads by reference or through an `Arc`,
/// or split it into handles with [`mpmc`](crate::mpmc).
pub struct Queue<T> {
    /// Next position to dequeue.
    head: CachePadded<AtomicUsize>,
    /// Next position to enqueue.
    tail: CachePadded<AtomicUsize>,
    slots: SlotArray<T>,
}

unsafe impl<T: Send> Send for Queue<T> { }
unsafe impl<T: Send> Sync for Queue<T> { }

impl<T> Queue<T> {
    /// Create an empty queue holding at most `capacity` values.
    ///
    /// Fails with [`Error::InvalidCapacity`] if `capacity` is zero or above
    /// [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            debug!(capacity, "rejected queue capacity");
            return Err(Error::InvalidCapacity { capacity });
        }

        let queue = Self::starting_at(capacity, 0);
        debug!(capacity, one_lap = queue.slots.one_lap(), "created queue");

        Ok(queue)
    }

    fn starting_at(capacity: usize, lap: usize) -> Self {
        Self {
            head: CachePadded::new(AtomicUsize::new(lap)),
            tail: CachePadded::new(AtomicUsize::new(lap)),
            slots: SlotArray::new(capacity, lap),
        }
    }

    /// Append `value` to the back of the queue, or return it in [`Full`] if every slot is
    /// occupied.
    pub fn enqueue(&self, value: T) -> Result<(), Full<T>> {
        let backoff = Backoff::new();
        let mut tail = self.tail.load(Ordering::Relaxed);

        loop {
            let slot = self.slots.get(tail);
            let diff = distance(slot.stamp(), tail);

            if diff == 0 {
                // The tail CAS only arbitrates ownership; the slot stamp carries the data.
                match self.tail.compare_exchange_weak(
                    tail,
                    self.slots.next(tail),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning the CAS for `tail` gives this thread exclusive
                        // access to the slot, and a matching stamp means the previous lap's
                        // consumer has already moved its value out.
                        unsafe { slot.publish(value, tail.wrapping_add(1)) };
                        return Ok(());
                    }
                    Err(current) => {
                        tail = current;
                        backoff.spin();
                    }
                }
            } else if diff < 0 {
                // Still holding (or receiving) the previous lap's value.
                trace!(tail, "enqueue found queue full");
                return Err(Full(value));
            } else {
                // Another producer already claimed this position.
                tail = self.tail.load(Ordering::Relaxed);
            }

            loom_exports::spin_loop();
        }
    }

    /// Remove the value at the front of the queue, or return [`Empty`] if there is none.
    pub fn dequeue(&self) -> Result<T, Empty> {
        let backoff = Backoff::new();
        let mut head = self.head.load(Ordering::Relaxed);

        loop {
            let slot = self.slots.get(head);
            let diff = distance(slot.stamp(), head.wrapping_add(1));

            if diff == 0 {
                match self.head.compare_exchange_weak(
                    head,
                    self.slots.next(head),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning the CAS for `head` gives this thread exclusive
                        // access to the slot, and the stamp says its producer has published.
                        let value = unsafe {
                            slot.consume(head.wrapping_add(self.slots.one_lap()))
                        };
                        return Ok(value);
                    }
                    Err(current) => {
                        head = current;
                        backoff.spin();
                    }
                }
            } else if diff < 0 {
                trace!(head, "dequeue found queue empty");
                return Err(Empty);
            } else {
                head = self.head.load(Ordering::Relaxed);
            }

            loom_exports::spin_loop();
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Best-effort count of values in the queue. Concurrent operations can make it stale
    /// before it returns, so use it for diagnostics only.
    pub fn len(&self) -> usize {
        loop {
            let tail = self.tail.load(Ordering::SeqCst);
            let head = self.head.load(Ordering::SeqCst);

            // Only trust the pair if `tail` did not move while `head` was being read.
            if self.tail.load(Ordering::SeqCst) == tail {
                let head_index = self.slots.index(head);
                let tail_index = self.slots.index(tail);

                return if head_index < tail_index {
                    tail_index - head_index
                } else if head_index > tail_index {
                    self.capacity() - head_index + tail_index
                } else if head == tail {
                    0
                } else {
                    self.capacity()
                };
            }

            loom_exports::spin_loop();
        }
    }

    /// Best-effort, see [`Queue::len`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Best-effort, see [`Queue::len`].
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);

        let mut pos = head;
        let mut dropped = 0usize;
        while pos != tail {
            // SAFETY: `&mut self` means no operation is in flight, so every position between
            // `head` and `tail` was published and not consumed.
            unsafe { self.slots.get(pos).drop_value() };
            pos = self.slots.next(pos);
            dropped += 1;
        }

        if dropped > 0 {
            debug!(dropped, "dropped values left in queue");
        }
    }
}
