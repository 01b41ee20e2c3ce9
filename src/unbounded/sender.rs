use std::sync::Arc;

use super::{TrySendError, channel::Channel};
use crate::storage::{Ring, Storage};

/// The writing half of an unbounded channel.
///
/// Cloning a sender adds a writer; writers may call [`try_send`](Self::try_send)
/// concurrently from any thread. The channel completes when [`close`](Self::close)
/// is called or the last sender is dropped.
pub struct Sender<T, S: Storage<T> = Ring<T>> {
    pub(super) inner: Arc<Channel<T, S>>,
}

impl<T, S: Storage<T>> Sender<T, S> {
    pub(super) fn new(inner: Arc<Channel<T, S>>) -> Self {
        Self { inner }
    }

    /// Enqueues `value` at the tail without blocking or suspending.
    ///
    /// On an open channel this always succeeds: there is no capacity limit. If a
    /// read is suspended waiting for an item, `value` is handed to the oldest such
    /// read and its task is woken.
    ///
    /// Fails, giving `value` back, only once the channel was closed or the
    /// receiver was dropped.
    ///
    /// ```
    /// let (tx, rx) = fila::unbounded();
    /// assert!(tx.try_send(42).is_ok());
    /// assert_eq!(rx.try_recv(), Ok(42));
    /// ```
    #[inline]
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.inner.send(value)
    }

    /// Completes the channel: no more writes are accepted from any sender.
    ///
    /// Items already queued can still be read; after that every read fails with
    /// [`RecvError::Closed`](super::RecvError::Closed), including reads that are
    /// suspended right now. Returns `false` if the channel was already closed.
    pub fn close(&self) -> bool {
        self.inner.close()
    }

    /// Returns true if the channel was completed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Returns true if the receiver has been dropped.
    pub fn is_disconnected(&self) -> bool {
        self.inner.is_disconnected()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items the storage currently holds without allocating.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

impl<T, S: Storage<T>> Clone for Sender<T, S> {
    fn clone(&self) -> Self {
        self.inner.add_sender();
        Self::new(self.inner.clone())
    }
}

impl<T, S: Storage<T>> Drop for Sender<T, S> {
    fn drop(&mut self) {
        self.inner.drop_sender();
    }
}
