use std::{marker::PhantomData, mem::MaybeUninit, ptr::NonNull};

use super::Storage;

struct Node<T> {
    value: MaybeUninit<T>,
    next: Option<NonNull<Node<T>>>,
}

/// Singly linked node queue with a pool of recycled nodes.
///
/// Every item lives in its own heap node, so growth never moves stored items.
/// Popped nodes go back into a free list (up to `pool_limit` of them) and are
/// reused by later pushes, which keeps a steady write/read cycle free of
/// allocations once the pool is warm.
///
/// # Invariants
///
/// - nodes reachable from `head` hold initialized values, `tail` is the last of them
/// - nodes reachable from `pool` hold no value
pub struct Linked<T> {
    head: Option<NonNull<Node<T>>>,
    tail: Option<NonNull<Node<T>>>,
    len: usize,
    pool: Option<NonNull<Node<T>>>,
    pooled: usize,
    pool_limit: usize,
    _owns: PhantomData<Box<Node<T>>>,
}

impl<T> Linked<T> {
    /// Number of spare nodes kept by [`Linked::new`].
    pub const DEFAULT_POOL_LIMIT: usize = 64;

    pub fn new() -> Self {
        Self::with_pool_limit(Self::DEFAULT_POOL_LIMIT)
    }

    /// Creates an empty queue that keeps at most `pool_limit` spare nodes.
    ///
    /// A limit of zero frees every node as soon as its item is popped.
    pub fn with_pool_limit(pool_limit: usize) -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            pool: None,
            pooled: 0,
            pool_limit,
            _owns: PhantomData,
        }
    }

    /// Number of spare nodes currently held for reuse.
    pub fn pooled(&self) -> usize {
        self.pooled
    }

    fn acquire(&mut self, value: T) -> NonNull<Node<T>> {
        match self.pool {
            Some(mut node) => {
                // Safe: pooled nodes are owned by us and hold no value
                unsafe {
                    let node_ref = node.as_mut();
                    self.pool = node_ref.next.take();
                    node_ref.value.write(value);
                }
                self.pooled -= 1;
                node
            }
            None => {
                let node = Box::new(Node {
                    value: MaybeUninit::new(value),
                    next: None,
                });
                NonNull::from(Box::leak(node))
            }
        }
    }

    /// # Safety
    ///
    /// - `node` must be owned by this queue, unlinked, and its value already moved out
    unsafe fn release(&mut self, mut node: NonNull<Node<T>>) {
        if self.pooled < self.pool_limit {
            unsafe { node.as_mut().next = self.pool };
            self.pool = Some(node);
            self.pooled += 1;
        } else {
            // MaybeUninit never drops the moved-out value
            drop(unsafe { Box::from_raw(node.as_ptr()) });
        }
    }
}

impl<T> Default for Linked<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Storage<T> for Linked<T> {
    fn push_back(&mut self, value: T) {
        let node = self.acquire(value);
        match self.tail {
            // Safe: tail is a live node owned by us
            Some(mut tail) => unsafe { tail.as_mut().next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.len += 1;
    }

    fn push_front(&mut self, value: T) {
        let mut node = self.acquire(value);
        // Safe: freshly acquired node, not linked anywhere yet
        unsafe { node.as_mut().next = self.head };
        self.head = Some(node);
        if self.tail.is_none() {
            self.tail = Some(node);
        }
        self.len += 1;
    }

    fn pop_front(&mut self) -> Option<T> {
        let mut node = self.head?;
        // Safe: head is a live node holding an initialized value which is read exactly once
        let value = unsafe {
            let node_ref = node.as_mut();
            self.head = node_ref.next.take();
            node_ref.value.assume_init_read()
        };
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        unsafe { self.release(node) };
        Some(value)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.len + self.pooled
    }
}

impl<T> Drop for Linked<T> {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
        while let Some(node) = self.pool {
            // Safe: pooled nodes are owned by us and hold no value
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            self.pool = node.next;
        }
    }
}

// Safe: the queue owns its nodes exclusively, like a `Box<Node<T>>` chain would
unsafe impl<T: Send> Send for Linked<T> {}
unsafe impl<T: Sync> Sync for Linked<T> {}
