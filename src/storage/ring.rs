use std::mem::MaybeUninit;

use tracing::trace;

use super::Storage;

/// Growable ring buffer.
///
/// Slots are addressed by a wrapping sequence number masked with
/// `capacity - 1`, so the capacity is always a power of two. When a push finds
/// every slot occupied the buffer doubles and the pending items are re-packed
/// in order at the start of the new allocation. The buffer never shrinks.
///
/// # Invariants
///
/// - slots `head .. head + len` (masked) are initialized, every other slot is not
/// - `len <= capacity`
pub struct Ring<T> {
    slots: Box<[MaybeUninit<T>]>,
    /// Sequence number of the first stored item.
    head: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// Capacity allocated by the first push into an empty ring.
    pub const MIN_CAPACITY: usize = 4;

    /// Creates an empty ring. Nothing is allocated until the first push.
    pub fn new() -> Self {
        Self {
            slots: Box::new_uninit_slice(0),
            head: 0,
            len: 0,
        }
    }

    /// Creates a ring holding at least `capacity` items without growing.
    ///
    /// The capacity is rounded up to the next power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }
        Self {
            slots: Box::new_uninit_slice(capacity.next_power_of_two()),
            head: 0,
            len: 0,
        }
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len().wrapping_sub(1)
    }

    #[inline]
    fn index(&self, seq: usize) -> usize {
        seq & self.mask()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// # Safety
    ///
    /// - slot `i` must not hold an initialized value, it is overwritten without being dropped
    #[inline]
    unsafe fn write(&mut self, i: usize, value: T) {
        self.slots[i].write(value);
    }

    /// # Safety
    ///
    /// - slot `i` must hold an initialized value; the slot is logically uninitialized afterwards
    #[inline]
    unsafe fn read(&mut self, i: usize) -> T {
        unsafe { self.slots[i].assume_init_read() }
    }

    fn grow(&mut self) {
        let old_capacity = self.slots.len();
        let new_capacity = (old_capacity * 2).max(Self::MIN_CAPACITY);
        assert!(new_capacity.is_power_of_two(), "capacity must be power of 2");

        let mut slots = Box::new_uninit_slice(new_capacity);
        for s in 0..self.len {
            let i = self.index(self.head.wrapping_add(s));
            // Safe: every slot in head..head+len is initialized and read exactly once
            slots[s].write(unsafe { self.read(i) });
        }
        self.slots = slots;
        self.head = 0;

        trace!(
            from = old_capacity,
            to = new_capacity,
            len = self.len,
            "ring storage grew"
        );
    }
}

impl<T> Default for Ring<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Storage<T> for Ring<T> {
    #[inline]
    fn push_back(&mut self, value: T) {
        if self.is_full() {
            self.grow();
        }
        let i = self.index(self.head.wrapping_add(self.len));
        // Safe: the slot right after the last item is free since the ring is not full
        unsafe { self.write(i, value) };
        self.len += 1;
    }

    #[inline]
    fn push_front(&mut self, value: T) {
        if self.is_full() {
            self.grow();
        }
        self.head = self.head.wrapping_sub(1);
        let i = self.index(self.head);
        // Safe: the slot right before the first item is free since the ring is not full
        unsafe { self.write(i, value) };
        self.len += 1;
    }

    #[inline]
    fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let i = self.index(self.head);
        // Safe: len > 0 so the head slot is initialized
        let value = unsafe { self.read(i) };
        self.head = self.head.wrapping_add(1);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
    }
}
