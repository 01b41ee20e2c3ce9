//! # Reference Channels: Same Orders, Other Unbounded Channels
//!
//! **Use case**: putting the `orders` numbers in context. Each reference
//! channel runs the same per-iteration work: build the payload, write it,
//! read it back.
//!
//! ## Variants
//!
//! | Benchmark | What it measures |
//! |-----------|------------------|
//! | `crossbeam` | `crossbeam_channel::unbounded`, write then read |
//! | `flume` | `flume::unbounded`, write then read |
//! | `kanal` | `kanal::unbounded`, write then read |
//! | `flume_async` | `flume::unbounded`, read issued before the write |
//!
//! flume registers an async read on its first poll rather than when it is
//! issued, so `flume_async` only approximates read-then-write.

use std::{hint::black_box, time::Duration};

use criterion::{Criterion, Throughput};
use fila::{
    payload::{LargeRecord, Payload, SmallRecord},
    workload::ITERATIONS,
};
use futures::executor::block_on;

fn payload<P: Payload>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("reference/{}", P::NAME));
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));
    group.throughput(Throughput::Elements(ITERATIONS as u64));

    let (tx, rx) = crossbeam_channel::unbounded::<P>();
    group.bench_function("crossbeam", |b| {
        b.iter(|| {
            for i in 0..ITERATIONS {
                tx.send(P::build(i)).unwrap();
                black_box(rx.recv().unwrap());
            }
        })
    });

    let (tx, rx) = flume::unbounded::<P>();
    group.bench_function("flume", |b| {
        b.iter(|| {
            for i in 0..ITERATIONS {
                tx.send(P::build(i)).unwrap();
                black_box(rx.recv().unwrap());
            }
        })
    });

    let (tx, rx) = kanal::unbounded::<P>();
    group.bench_function("kanal", |b| {
        b.iter(|| {
            for i in 0..ITERATIONS {
                tx.send(P::build(i)).unwrap();
                black_box(rx.recv().unwrap());
            }
        })
    });

    let (tx, rx) = flume::unbounded::<P>();
    group.bench_function("flume_async", |b| {
        b.iter(|| {
            block_on(async {
                for i in 0..ITERATIONS {
                    let payload = P::build(i);
                    let read = rx.recv_async();
                    tx.send(payload).unwrap();
                    black_box(read.await.unwrap());
                }
            })
        })
    });

    group.finish();
}

pub fn bench(c: &mut Criterion) {
    payload::<i32>(c);
    payload::<Box<SmallRecord>>(c);
    payload::<Box<LargeRecord>>(c);
}
