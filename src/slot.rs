use alloc::boxed::Box;
use core::{
    mem::MaybeUninit,
    sync::atomic::Ordering,
};

use crossbeam_utils::CachePadded;

use crate::loom_exports::{
    cell::UnsafeCell,
    sync::atomic::AtomicUsize,
};

/// One ring cell. `stamp == pos` means empty and waiting for the producer of `pos`,
/// `stamp == pos + 1` means filled and waiting for the consumer of `pos`.
pub(crate) struct Slot<T> {
    stamp: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new(stamp: usize) -> Self {
        Self {
            stamp: AtomicUsize::new(stamp),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Pairs with the release stores in `publish` and `consume`.
    #[inline(always)]
    pub(crate) fn stamp(&self) -> usize {
        self.stamp.load(Ordering::Acquire)
    }

    /// SAFETY: the caller must have won the `tail` CAS for the position this slot is gated
    /// on, and the slot must be empty.
    #[inline(always)]
    pub(crate) unsafe fn publish(&self, value: T, stamp: usize) {
        self.value.with_mut(|ptr| {
            (*ptr).write(value);
        });
        self.stamp.store(stamp, Ordering::Release);
    }

    /// SAFETY: the caller must have won the `head` CAS for the position this slot is gated
    /// on, and the slot must be filled.
    #[inline(always)]
    pub(crate) unsafe fn consume(&self, stamp: usize) -> T {
        let value = self.value.with_mut(|ptr| (*ptr).assume_init_read());
        self.stamp.store(stamp, Ordering::Release);
        value
    }

    /// SAFETY: the slot must be filled and no other thread may access it.
    pub(crate) unsafe fn drop_value(&self) {
        self.value.with_mut(|ptr| (*ptr).assume_init_drop());
    }
}

unsafe impl<T: Send> Send for Slot<T> { }
unsafe impl<T: Send> Sync for Slot<T> { }

/// Stamp distance between two laps of a ring of `capacity` slots.
///
/// Positions are stamps of the form `lap | index`, where the low bits hold the slot index
/// and `lap` is a multiple of this value. Because it is strictly greater than `capacity`,
/// "filled for `pos`" (`pos + 1`) never equals "empty for the next lap" (`pos + one_lap`),
/// even with a single slot, and the index survives the counter wrapping past `usize::MAX`.
pub(crate) fn one_lap(capacity: usize) -> usize {
    (capacity + 1).next_power_of_two()
}

/// Fixed ring of slots, allocated once and never resized.
pub(crate) struct SlotArray<T> {
    slots: Box<[CachePadded<Slot<T>>]>,
    one_lap: usize,
}

impl<T> SlotArray<T> {
    /// `capacity` must already be validated and `lap` must be a multiple of
    /// `one_lap(capacity)`. Slot `i` starts empty for position `lap | i`.
    pub(crate) fn new(capacity: usize, lap: usize) -> Self {
        debug_assert!(capacity > 0);

        let one_lap = one_lap(capacity);
        debug_assert_eq!(lap & (one_lap - 1), 0);

        let slots = (0..capacity)
            .map(|i| CachePadded::new(Slot::new(lap | i)))
            .collect::<Box<[_]>>();

        Self { slots, one_lap }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub(crate) fn one_lap(&self) -> usize {
        self.one_lap
    }

    #[inline(always)]
    pub(crate) fn index(&self, pos: usize) -> usize {
        pos & (self.one_lap - 1)
    }

    #[inline(always)]
    pub(crate) fn get(&self, pos: usize) -> &Slot<T> {
        &self.slots[self.index(pos)]
    }

    /// The position after `pos`: the next index, or index 0 of the next lap.
    #[inline(always)]
    pub(crate) fn next(&self, pos: usize) -> usize {
        if self.index(pos) + 1 < self.capacity() {
            pos + 1
        } else {
            (pos & !(self.one_lap - 1)).wrapping_add(self.one_lap)
        }
    }
}
