//! # Write/Read Orders: Immediate vs Suspended Reads
//!
//! **Real-world scenario**: a single task owns both ends of the channel and
//! alternates between producing and consuming, once with the item already
//! queued and once with the read waiting for it.
//!
//! ```text
//! write_then_read                      read_then_write
//! ┌──────────────────────────────┐     ┌──────────────────────────────┐
//! │ try_send ──► [storage]       │     │ recv() ──► [waiter queue]    │
//! │ recv()   ◄── [storage]       │     │ try_send ──► waiter (wake)   │
//! │                              │     │ await    ◄── waiter          │
//! │ storage push + pop           │     │ waiter hand-off, no storage  │
//! └──────────────────────────────┘     └──────────────────────────────┘
//! ```
//!
//! Every sample is one full run of [`ITERATIONS`] write/read pairs against a
//! channel that lives for the whole benchmark.
//!
//! ## Variants
//!
//! | Benchmark | What it measures |
//! |-----------|------------------|
//! | `{payload}/{order}/ring` | growable ring storage |
//! | `{payload}/{order}/linked` | linked storage with node pool |

use std::time::Duration;

use criterion::{BenchmarkGroup, Criterion, Throughput, measurement::WallTime};
use fila::{
    payload::{LargeRecord, Payload, SmallRecord},
    storage::{Linked, Ring, Storage},
    workload::{ITERATIONS, Order, Workload, WorkloadConfig},
};

fn make_group<'a>(c: &'a mut Criterion, name: &str) -> BenchmarkGroup<'a, WallTime> {
    let mut group = c.benchmark_group(name);
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));
    group.throughput(Throughput::Elements(ITERATIONS as u64));
    group
}

fn run<P, S>(group: &mut BenchmarkGroup<'_, WallTime>, order: Order, storage: &str)
where
    P: Payload + PartialEq,
    S: Storage<P> + Default,
{
    let mut workload = Workload::<P, S>::new(WorkloadConfig::default());
    group.bench_function(format!("{}/{storage}", order.name()), |b| {
        b.iter(|| workload.run_blocking(order).unwrap())
    });
}

fn payload<P: Payload + PartialEq>(c: &mut Criterion) {
    let mut group = make_group(c, P::NAME);
    for order in Order::ALL {
        run::<P, Ring<P>>(&mut group, order, "ring");
        run::<P, Linked<P>>(&mut group, order, "linked");
    }
    group.finish();
}

pub fn bench(c: &mut Criterion) {
    payload::<i32>(c);
    payload::<Box<SmallRecord>>(c);
    payload::<Box<LargeRecord>>(c);
}
