//! Queue storage behind the unbounded channel.
//!
//! The channel only needs an ordered sequence it can append to, pop from the
//! front of, and occasionally push back onto the front of (when a read is
//! abandoned after an item was handed to it). It is a type parameter of the
//! channel:
//!
//! - [`Ring`]: power-of-two ring buffer that doubles when full. Amortises
//!   allocations; growth copies the pending items once.
//! - [`Linked`]: singly linked nodes with a bounded pool of recycled nodes.
//!   Growth never moves existing items.

mod linked;
mod ring;

pub use linked::Linked;
pub use ring::Ring;

/// Ordered, unbounded item storage.
///
/// Implementations are never accessed concurrently: the channel serialises
/// every call behind its own lock.
pub trait Storage<T> {
    /// Appends `value` at the tail.
    fn push_back(&mut self, value: T);

    /// Puts `value` back at the head, ahead of everything already stored.
    fn push_front(&mut self, value: T);

    /// Removes and returns the head, if any.
    fn pop_front(&mut self) -> Option<T>;

    /// Number of stored items.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items the storage can hold without allocating.
    fn capacity(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Exercises the contract every storage has to satisfy
    fn check_fifo<S: Storage<u32>>(mut storage: S) {
        assert!(storage.is_empty());
        assert_eq!(storage.pop_front(), None);

        for i in 0..100 {
            storage.push_back(i);
        }
        assert_eq!(storage.len(), 100);
        assert!(storage.capacity() >= 100);

        for i in 0..50 {
            assert_eq!(storage.pop_front(), Some(i));
        }

        // interleave so the ring wraps around its physical end
        for i in 100..300 {
            storage.push_back(i);
            assert_eq!(storage.pop_front(), Some(i - 50));
        }

        storage.push_front(7);
        assert_eq!(storage.pop_front(), Some(7));

        for i in 250..300 {
            assert_eq!(storage.pop_front(), Some(i));
        }
        assert_eq!(storage.pop_front(), None);
        assert!(storage.is_empty());
    }

    fn check_push_front_on_empty<S: Storage<u32>>(mut storage: S) {
        storage.push_front(1);
        storage.push_front(0);
        storage.push_back(2);
        assert_eq!(storage.len(), 3);
        assert_eq!(storage.pop_front(), Some(0));
        assert_eq!(storage.pop_front(), Some(1));
        assert_eq!(storage.pop_front(), Some(2));
        assert_eq!(storage.pop_front(), None);
    }

    fn check_drops_remaining<S: Storage<DropCounter>>(mut storage: S) {
        let drops = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            storage.push_back(DropCounter(drops.clone()));
        }
        drop(storage.pop_front());
        drop(storage.pop_front());
        assert_eq!(drops.load(Ordering::SeqCst), 2);

        drop(storage);
        assert_eq!(drops.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_ring_fifo() {
        check_fifo(Ring::new());
        check_fifo(Ring::with_capacity(1));
    }

    #[test]
    fn test_linked_fifo() {
        check_fifo(Linked::new());
        check_fifo(Linked::with_pool_limit(0));
    }

    #[test]
    fn test_push_front_on_empty() {
        check_push_front_on_empty(Ring::new());
        check_push_front_on_empty(Linked::new());
    }

    #[test]
    fn test_drops_remaining() {
        check_drops_remaining(Ring::new());
        check_drops_remaining(Linked::new());
    }
}
