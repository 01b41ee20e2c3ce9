//! # fila
//!
//! An unbounded FIFO channel with a non-blocking write and a suspending read,
//! plus the two workloads used to measure it: *write-then-read* and
//! *read-then-write*.
//!
//! ## Example
//!
//! ```rust
//! # futures::executor::block_on(async {
//! let (tx, rx) = fila::unbounded();
//!
//! // the read is issued before the item exists and completes once it arrives
//! let read = rx.recv();
//! tx.try_send(42).unwrap();
//! assert_eq!(read.await, Ok(42));
//!
//! // closing lets queued items drain, then reads fail
//! tx.try_send(7).unwrap();
//! tx.close();
//! assert_eq!(rx.recv().await, Ok(7));
//! assert_eq!(rx.recv().await, Err(fila::RecvError::Closed));
//! # });
//! ```
//!
//! ## Workloads
//!
//! ```rust
//! use fila::{
//!     payload::SmallRecord,
//!     workload::{Order, Workload, WorkloadConfig},
//! };
//!
//! let config = WorkloadConfig::default().with_iterations(1_000);
//! let mut workload = Workload::<Box<SmallRecord>>::new(config);
//! let summary = workload.run_blocking(Order::ReadThenWrite).unwrap();
//! assert_eq!(summary.iterations, 1_000);
//! ```

pub mod payload;
pub mod storage;
pub mod unbounded;
pub mod workload;

pub use unbounded::{
    CancelHandle, Receiver, RecvError, RecvFuture, RecvStream, Sender, TryRecvError, TrySendError,
    unbounded, unbounded_linked, unbounded_with,
};
