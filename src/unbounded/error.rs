use std::fmt;

use thiserror::Error;

/// Returned by [`Sender::try_send`](super::Sender::try_send), handing the value back.
///
/// Capacity is never the reason: the channel is unbounded.
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum TrySendError<T> {
    /// The channel was completed, either explicitly or by dropping every sender.
    Closed(T),
    /// The receiver has been dropped.
    Disconnected(T),
}

impl<T> TrySendError<T> {
    /// Takes back the value that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            Self::Closed(v) | Self::Disconnected(v) => v,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected(_))
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("Closed(..)"),
            Self::Disconnected(_) => f.write_str("Disconnected(..)"),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("sending on a closed channel"),
            Self::Disconnected(_) => f.write_str("sending on a channel whose receiver was dropped"),
        }
    }
}

impl<T> std::error::Error for TrySendError<T> {}

/// A suspending read that could not produce an item.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The channel was completed and every queued item has been read.
    #[error("receiving on a closed and drained channel")]
    Closed,
    /// The read was cancelled through its [`CancelHandle`](super::CancelHandle).
    #[error("receive operation was cancelled")]
    Cancelled,
}

/// Returned by [`Receiver::try_recv`](super::Receiver::try_recv).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    #[error("receiving on an empty channel")]
    Empty,
    #[error("receiving on a closed and drained channel")]
    Closed,
}

