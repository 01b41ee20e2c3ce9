use criterion::{criterion_group, criterion_main};

mod workload {
    pub mod orders;
    pub mod reference;
}

criterion_group!(
    benches,
    workload::orders::bench,
    workload::reference::bench
);
criterion_main!(benches);
