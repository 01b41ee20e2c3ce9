use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::stream::{FusedStream, Stream};

use super::receiver::{Receiver, RecvFuture};
use crate::storage::{Ring, Storage};

/// Stream of items read from a [`Receiver`], created by [`Receiver::stream`].
///
/// Each item is produced by one [`RecvFuture`], issued lazily on the first poll
/// that needs it. The stream ends once the channel is closed and drained.
#[must_use = "streams do nothing unless polled"]
pub struct RecvStream<'a, T, S: Storage<T> = Ring<T>> {
    receiver: &'a Receiver<T, S>,
    pending: Option<RecvFuture<'a, T, S>>,
    terminated: bool,
}

impl<'a, T, S: Storage<T>> RecvStream<'a, T, S> {
    pub(super) fn new(receiver: &'a Receiver<T, S>) -> Self {
        Self {
            receiver,
            pending: None,
            terminated: false,
        }
    }
}

impl<T, S: Storage<T>> Unpin for RecvStream<'_, T, S> {}

impl<'a, T, S: Storage<T>> Stream for RecvStream<'a, T, S> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }

        let receiver = this.receiver;
        let read = this.pending.get_or_insert_with(|| receiver.recv());
        match Pin::new(read).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(outcome) => {
                this.pending = None;
                match outcome {
                    Ok(item) => Poll::Ready(Some(item)),
                    Err(_) => {
                        this.terminated = true;
                        Poll::Ready(None)
                    }
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.terminated {
            return (0, Some(0));
        }
        (self.receiver.len(), None)
    }
}

impl<'a, T, S: Storage<T>> FusedStream for RecvStream<'a, T, S> {
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}

#[cfg(test)]
mod tests {
    use crate::unbounded::unbounded;
    use futures::{StreamExt, executor::block_on};

    #[test]
    fn test_stream_ends_on_close() {
        let (tx, rx) = unbounded();
        for i in 0..5 {
            tx.try_send(i).unwrap();
        }
        drop(tx);

        let items: Vec<i32> = block_on(rx.stream().collect());
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_stream_waits_for_writer() {
        let (tx, rx) = unbounded::<u32>();
        let writer = std::thread::spawn(move || {
            for i in 0..1_000 {
                tx.try_send(i).unwrap();
            }
        });

        let sum = block_on(rx.stream().fold(0u64, |acc, i| async move { acc + i as u64 }));
        assert_eq!(sum, (0..1_000u64).sum());
        writer.join().unwrap();
    }

    #[test]
    fn test_terminated_stream_stays_done() {
        let (tx, rx) = unbounded::<u8>();
        tx.close();
        let mut stream = rx.stream();
        assert_eq!(block_on(stream.next()), None);
        assert_eq!(block_on(stream.next()), None);
    }
}
