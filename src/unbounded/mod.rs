//! Unbounded FIFO channel with a non-blocking write and a suspending read.
//!
//! ```text
//!  Sender ──try_send──►┌──────────────────────┐
//!  Sender ──try_send──►│ items   [a, b, c, …] │──recv──► Receiver
//!                      │ waiters [r1, r2, …]  │
//!                      └──────────────────────┘
//! ```
//!
//! A write never waits: with a read suspended it hands its item straight to the
//! oldest one, otherwise it appends to the storage. A read takes the head item
//! if there is one, or registers and suspends until a write reaches it. Items
//! and suspended reads are never both present, so the N-th write is always
//! matched by the N-th read.
//!
//! Every transition happens under one internal lock. Steady state is
//! allocation-free: the storage reuses its slots and the waiter of a finished
//! read is kept for the next one.
//!
//! The storage is a type parameter, see [`crate::storage`].

mod channel;
mod error;
mod receiver;
mod sender;
mod stream;
mod waiter;

pub use error::{RecvError, TryRecvError, TrySendError};
pub use receiver::{CancelHandle, Receiver, RecvFuture};
pub use sender::Sender;
pub use stream::RecvStream;

use crate::storage::{Linked, Ring, Storage};
use channel::Channel;

/// Creates an unbounded channel backed by a growable ring buffer.
///
/// ```
/// let (tx, rx) = fila::unbounded();
/// for i in 0..3 {
///     tx.try_send(i).unwrap();
/// }
/// for i in 0..3 {
///     assert_eq!(rx.recv_blocking(), Ok(i));
/// }
/// ```
pub fn unbounded<T>() -> (Sender<T>, Receiver<T>) {
    unbounded_with(Ring::new())
}

/// Creates an unbounded channel backed by linked nodes.
pub fn unbounded_linked<T>() -> (Sender<T, Linked<T>>, Receiver<T, Linked<T>>) {
    unbounded_with(Linked::new())
}

/// Creates an unbounded channel on top of the given, usually empty, storage.
///
/// Items already in `storage` are read first.
pub fn unbounded_with<T, S: Storage<T>>(storage: S) -> (Sender<T, S>, Receiver<T, S>) {
    Channel::new(storage).split()
}
