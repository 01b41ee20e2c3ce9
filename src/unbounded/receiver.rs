use std::{
    future::Future,
    mem,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::future::FusedFuture;

use super::{
    RecvError, TryRecvError,
    channel::{Begin, Channel},
    stream::RecvStream,
    waiter::Waiter,
};
use crate::storage::{Ring, Storage};

/// The reading half of an unbounded channel.
///
/// There is a single receiver, but several reads may be outstanding at once
/// through `&self`; they complete in the order they were issued.
pub struct Receiver<T, S: Storage<T> = Ring<T>> {
    pub(super) inner: Arc<Channel<T, S>>,
}

impl<T, S: Storage<T>> Receiver<T, S> {
    pub(super) fn new(inner: Arc<Channel<T, S>>) -> Self {
        Self { inner }
    }

    /// Issues a read and returns the future that completes with its item.
    ///
    /// The read starts when this method is called, not when the future is first
    /// polled:
    ///
    /// - if an item is queued it is taken right away and the returned future is
    ///   already complete, no suspension involved;
    /// - otherwise the read is registered behind any earlier read, and the next
    ///   [`try_send`](super::Sender::try_send) that reaches it hands its item over
    ///   and wakes the awaiting task.
    ///
    /// Awaiting never spins: a pending read only stores the task waker.
    ///
    /// # Cancel Safety
    ///
    /// Dropping the future before completion does not lose data. An item already
    /// handed to it is passed on to the reads issued after it that have not
    /// completed yet: each takes the item of the read before it, and the newest item
    /// left over goes to the next read or back to the head of the queue. Reads that
    /// already completed keep what they returned.
    ///
    /// ```
    /// # futures::executor::block_on(async {
    /// let (tx, rx) = fila::unbounded();
    /// let read = rx.recv();
    /// tx.try_send("hello").unwrap();
    /// assert_eq!(read.await, Ok("hello"));
    /// # });
    /// ```
    pub fn recv(&self) -> RecvFuture<'_, T, S> {
        let state = match self.inner.begin_recv() {
            Begin::Ready(outcome) => RecvState::Ready(outcome),
            Begin::Waiting(waiter) => RecvState::Waiting(waiter),
        };
        RecvFuture {
            receiver: self,
            state,
        }
    }

    /// Takes the head item if there is one, without suspending.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.inner.try_recv()
    }

    /// Reads an item, parking the current thread until one arrives.
    ///
    /// Same semantics as [`recv`](Self::recv), for callers outside of an async context.
    pub fn recv_blocking(&self) -> Result<T, RecvError> {
        futures::executor::block_on(self.recv())
    }

    /// Returns a stream of items that ends once the channel is closed and drained.
    pub fn stream(&self) -> RecvStream<'_, T, S> {
        RecvStream::new(self)
    }

    /// Returns true if the channel was completed. Queued items may still be readable.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
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

    /// Largest [`capacity`](Self::capacity) reached since the channel was created or
    /// since the last [`take_peak_capacity`](Self::take_peak_capacity).
    pub fn peak_capacity(&self) -> usize {
        self.inner.peak_capacity()
    }

    /// Returns the peak capacity and restarts tracking from the current capacity.
    pub fn take_peak_capacity(&self) -> usize {
        self.inner.take_peak_capacity()
    }
}

impl<T, S: Storage<T>> Drop for Receiver<T, S> {
    fn drop(&mut self) {
        self.inner.drop_receiver();
    }
}

enum RecvState<T> {
    Ready(Result<T, RecvError>),
    Waiting(Arc<Waiter<T>>),
    Done,
}

/// A read issued by [`Receiver::recv`].
#[must_use = "futures do nothing unless polled"]
pub struct RecvFuture<'a, T, S: Storage<T> = Ring<T>> {
    receiver: &'a Receiver<T, S>,
    state: RecvState<T>,
}

/// Safe: the struct is not self-referential:
/// future fields are not pointing to other fields within the same struct
impl<T, S: Storage<T>> Unpin for RecvFuture<'_, T, S> {}

impl<'a, T, S: Storage<T>> RecvFuture<'a, T, S> {
    /// Returns true if the read found no item when it was issued and had to register.
    ///
    /// False means it completed on the spot from an already queued item (or from
    /// a closed and drained channel).
    pub fn is_registered(&self) -> bool {
        matches!(self.state, RecvState::Waiting(_))
    }

    /// Returns a handle able to cancel this read from anywhere, while it still waits.
    ///
    /// `None` if the read never had to wait.
    pub fn cancel_handle(&self) -> Option<CancelHandle<T, S>> {
        match &self.state {
            RecvState::Waiting(waiter) => Some(CancelHandle {
                channel: self.receiver.inner.clone(),
                waiter: waiter.clone(),
            }),
            _ => None,
        }
    }
}

impl<'a, T, S: Storage<T>> Future for RecvFuture<'a, T, S> {
    type Output = Result<T, RecvError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &this.state {
            RecvState::Waiting(waiter) => match waiter.poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(outcome) => {
                    if let RecvState::Waiting(waiter) = mem::replace(&mut this.state, RecvState::Done)
                    {
                        this.receiver.inner.finish_recv(waiter);
                    }
                    Poll::Ready(outcome)
                }
            },
            RecvState::Ready(_) => match mem::replace(&mut this.state, RecvState::Done) {
                RecvState::Ready(outcome) => {
                    if outcome.is_ok() {
                        this.receiver.inner.finish_immediate();
                    }
                    Poll::Ready(outcome)
                }
                _ => unreachable!(),
            },
            RecvState::Done => panic!("polled after completion"),
        }
    }
}

impl<'a, T, S: Storage<T>> FusedFuture for RecvFuture<'a, T, S> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, RecvState::Done)
    }
}

impl<'a, T, S: Storage<T>> Drop for RecvFuture<'a, T, S> {
    fn drop(&mut self) {
        match mem::replace(&mut self.state, RecvState::Done) {
            RecvState::Waiting(waiter) => self.receiver.inner.finish_recv(waiter),
            RecvState::Ready(Ok(value)) => self.receiver.inner.restore(value),
            RecvState::Ready(Err(_)) | RecvState::Done => {}
        }
    }
}

/// Cancels one suspended read, possibly from another thread.
pub struct CancelHandle<T, S: Storage<T> = Ring<T>> {
    channel: Arc<Channel<T, S>>,
    waiter: Arc<Waiter<T>>,
}

impl<T, S: Storage<T>> CancelHandle<T, S> {
    /// Makes the read resolve with [`RecvError::Cancelled`] and wakes it.
    ///
    /// Returns `false` when it is too late: the read already received an item,
    /// the channel closed, or the read was dropped.
    pub fn cancel(&self) -> bool {
        self.channel.cancel(&self.waiter)
    }
}
