//! Write/read interleaving workloads driven against one channel.
//!
//! ```text
//! write-then-read                read-then-write
//! ┌────────────────────────┐     ┌─────────────────────────┐
//! │ payload = build(i)     │     │ payload = build(i)      │
//! │ try_send(payload)      │     │ read = recv()  (waits)  │
//! │ recv().await  (ready)  │     │ try_send(payload) (wake)│
//! └────────────────────────┘     │ read.await              │
//!                                └─────────────────────────┘
//! ```
//!
//! Write-then-read takes the immediate path of a read on every iteration: the
//! item is already queued. Read-then-write takes the suspension path: the read
//! registers on an empty channel and the following write hands its item over.
//!
//! Payload construction is part of each iteration. Timing and
//! allocation accounting are left to whoever calls the drivers.

use std::hint::black_box;

use thiserror::Error;
use tracing::debug;

use crate::{
    payload::Payload,
    storage::{Ring, Storage},
    unbounded::{Receiver, RecvError, Sender, TrySendError, unbounded_with},
};

/// Write/read pairs performed by one run unless configured otherwise.
pub const ITERATIONS: u32 = 10_000_000;

/// Order of the two operations within an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    WriteThenRead,
    ReadThenWrite,
}

impl Order {
    pub const ALL: [Order; 2] = [Order::WriteThenRead, Order::ReadThenWrite];

    pub const fn name(self) -> &'static str {
        match self {
            Order::WriteThenRead => "write_then_read",
            Order::ReadThenWrite => "read_then_write",
        }
    }
}

/// Whether repeated runs of one [`Workload`] share a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelReuse {
    /// One long-lived channel for every run. Every run drains what it writes, so
    /// the only state carried over is the storage capacity and the recycled waiter.
    #[default]
    Shared,
    /// A new channel at the start of every run.
    Fresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadConfig {
    pub iterations: u32,
    pub reuse: ChannelReuse,
    /// Compare every item read with the payload built for its iteration.
    pub verify: bool,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            iterations: ITERATIONS,
            reuse: ChannelReuse::default(),
            verify: false,
        }
    }
}

impl WorkloadConfig {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_reuse(mut self, reuse: ChannelReuse) -> Self {
        self.reuse = reuse;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub order: Order,
    pub iterations: u32,
    /// Largest storage capacity the channel reached during the run.
    pub peak_capacity: usize,
}

/// The first failure of a run. Runs do not retry: one failed iteration aborts.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("write rejected at iteration {iteration}: channel closed")]
    Closed { iteration: u32 },
    #[error("write rejected at iteration {iteration}: receiver dropped")]
    Disconnected { iteration: u32 },
    #[error("read failed at iteration {iteration}")]
    Recv {
        iteration: u32,
        #[source]
        source: RecvError,
    },
    #[error("item read at iteration {iteration} differs from the one written")]
    Mismatch { iteration: u32 },
}

impl WorkloadError {
    fn rejected<T>(iteration: u32, err: TrySendError<T>) -> Self {
        match err {
            TrySendError::Closed(_) => Self::Closed { iteration },
            TrySendError::Disconnected(_) => Self::Disconnected { iteration },
        }
    }
}

/// Drives write/read pairs of payload `P` through its own channel.
pub struct Workload<P, S = Ring<P>>
where
    S: Storage<P>,
{
    config: WorkloadConfig,
    tx: Sender<P, S>,
    rx: Receiver<P, S>,
}

impl<P, S> Workload<P, S>
where
    P: Payload + PartialEq,
    S: Storage<P> + Default,
{
    pub fn new(config: WorkloadConfig) -> Self {
        let (tx, rx) = unbounded_with(S::default());
        Self { config, tx, rx }
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Receiving half of the channel currently in use.
    pub fn receiver(&self) -> &Receiver<P, S> {
        &self.rx
    }

    /// For every iteration: build, write, then read the payload back.
    pub async fn write_then_read(&mut self) -> Result<RunSummary, WorkloadError> {
        let iterations = self.start(Order::WriteThenRead);
        for i in 0..iterations {
            let payload = P::build(i);
            self.tx
                .try_send(payload)
                .map_err(|e| WorkloadError::rejected(i, e))?;
            let item = self
                .rx
                .recv()
                .await
                .map_err(|source| WorkloadError::Recv { iteration: i, source })?;
            self.check(i, item)?;
        }
        Ok(self.finish(Order::WriteThenRead))
    }

    /// For every iteration: build the payload, issue the read, write, then await the read.
    pub async fn read_then_write(&mut self) -> Result<RunSummary, WorkloadError> {
        let iterations = self.start(Order::ReadThenWrite);
        for i in 0..iterations {
            let payload = P::build(i);
            let read = self.rx.recv();
            self.tx
                .try_send(payload)
                .map_err(|e| WorkloadError::rejected(i, e))?;
            let item = read
                .await
                .map_err(|source| WorkloadError::Recv { iteration: i, source })?;
            self.check(i, item)?;
        }
        Ok(self.finish(Order::ReadThenWrite))
    }

    pub async fn run(&mut self, order: Order) -> Result<RunSummary, WorkloadError> {
        match order {
            Order::WriteThenRead => self.write_then_read().await,
            Order::ReadThenWrite => self.read_then_write().await,
        }
    }

    /// Runs on the current thread, parking it whenever a read has to wait.
    pub fn run_blocking(&mut self, order: Order) -> Result<RunSummary, WorkloadError> {
        futures::executor::block_on(self.run(order))
    }

    fn start(&mut self, order: Order) -> u32 {
        if self.config.reuse == ChannelReuse::Fresh {
            (self.tx, self.rx) = unbounded_with(S::default());
        } else {
            self.rx.take_peak_capacity();
        }
        debug!(
            order = order.name(),
            payload = P::NAME,
            iterations = self.config.iterations,
            "workload started"
        );
        self.config.iterations
    }

    fn finish(&self, order: Order) -> RunSummary {
        let summary = RunSummary {
            order,
            iterations: self.config.iterations,
            peak_capacity: self.rx.peak_capacity(),
        };
        debug!(
            order = order.name(),
            payload = P::NAME,
            peak_capacity = summary.peak_capacity,
            "workload finished"
        );
        summary
    }

    #[inline]
    fn check(&self, iteration: u32, item: P) -> Result<(), WorkloadError> {
        if self.config.verify && item != P::build(iteration) {
            return Err(WorkloadError::Mismatch { iteration });
        }
        black_box(item);
        Ok(())
    }
}

impl<P, S> Default for Workload<P, S>
where
    P: Payload + PartialEq,
    S: Storage<P> + Default,
{
    fn default() -> Self {
        Self::new(WorkloadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        payload::{LargeRecord, SmallRecord},
        storage::Linked,
    };

    fn config(iterations: u32) -> WorkloadConfig {
        WorkloadConfig::default()
            .with_iterations(iterations)
            .with_verify(true)
    }

    #[test]
    fn test_default_config() {
        let config = WorkloadConfig::default();
        assert_eq!(config.iterations, 10_000_000);
        assert_eq!(config.reuse, ChannelReuse::Shared);
        assert!(!config.verify);
    }

    #[test]
    fn test_both_orders_every_payload() {
        for order in Order::ALL {
            let summary = Workload::<i32>::new(config(1_000))
                .run_blocking(order)
                .unwrap();
            assert_eq!(summary.order, order);
            assert_eq!(summary.iterations, 1_000);

            Workload::<Box<SmallRecord>>::new(config(1_000))
                .run_blocking(order)
                .unwrap();
            Workload::<Box<LargeRecord>, Linked<_>>::new(config(1_000))
                .run_blocking(order)
                .unwrap();
        }
    }

    /// At most one item is ever pending, so the storage never grows past its first allocation
    #[test]
    fn test_storage_stays_small() {
        let mut workload = Workload::<i32>::new(config(10_000));
        let summary = workload.run_blocking(Order::WriteThenRead).unwrap();
        assert_eq!(summary.peak_capacity, Ring::<i32>::MIN_CAPACITY);

        // read-then-write hands every item over, nothing is ever queued
        let mut workload = Workload::<i32>::new(config(10_000));
        let summary = workload.run_blocking(Order::ReadThenWrite).unwrap();
        assert_eq!(summary.peak_capacity, 0);

        let mut workload = Workload::<i32, Linked<i32>>::new(config(10_000));
        let summary = workload.run_blocking(Order::WriteThenRead).unwrap();
        assert_eq!(summary.peak_capacity, 1);
    }

    /// The peak is measured per run, not over the life of a shared channel
    #[test]
    fn test_peak_capacity_per_run() {
        let mut workload = Workload::<i32, Linked<i32>>::new(config(100));
        for i in 0..100 {
            workload.tx.try_send(i).unwrap();
        }
        while workload.rx.try_recv().is_ok() {}
        // drained nodes beyond the pool limit were freed
        assert_eq!(workload.rx.peak_capacity(), 100);
        assert_eq!(workload.rx.capacity(), Linked::<i32>::DEFAULT_POOL_LIMIT);

        for order in Order::ALL {
            let summary = workload.run_blocking(order).unwrap();
            assert_eq!(summary.peak_capacity, Linked::<i32>::DEFAULT_POOL_LIMIT);
        }
    }

    #[test]
    fn test_shared_channel_is_reused() {
        let mut workload = Workload::<i32>::new(config(100));
        workload.run_blocking(Order::WriteThenRead).unwrap();
        workload.run_blocking(Order::ReadThenWrite).unwrap();
        assert_eq!(workload.receiver().capacity(), Ring::<i32>::MIN_CAPACITY);
        assert!(workload.receiver().is_empty());
    }

    #[test]
    fn test_fresh_channel_per_run() {
        let mut workload =
            Workload::<i32>::new(config(100).with_reuse(ChannelReuse::Fresh));
        workload.run_blocking(Order::WriteThenRead).unwrap();
        workload.run_blocking(Order::ReadThenWrite).unwrap();
        assert_eq!(workload.receiver().capacity(), 0);
    }

    #[test]
    fn test_closed_channel_aborts_run() {
        let mut workload = Workload::<i32>::new(config(10));
        workload.tx.close();
        assert_eq!(
            workload.run_blocking(Order::WriteThenRead),
            Err(WorkloadError::Closed { iteration: 0 })
        );
    }
}
