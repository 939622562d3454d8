use criterion::{black_box, criterion_group, criterion_main, Criterion};

use scal::backend::{MsQueue, TreiberStack};
use scal::kfifo::{BoundedKFifo, UnboundedKFifo};
use scal::Pool;

fn fill_then_drain<P: Pool<u64>>(pool: &P, n: u64) {
    for i in 1..=n {
        pool.put(black_box(i));
    }
    while pool.get().is_some() {}
}

fn benchmark_unbounded_kfifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("Unbounded k-FIFO put/get");
    for &k in &[1usize, 4, 8] {
        group.bench_function(format!("k={k}"), |b| {
            let pool = UnboundedKFifo::<u64>::new(k);
            b.iter(|| fill_then_drain(&pool, 1_000));
        });
    }
    group.finish();
}

fn benchmark_bounded_kfifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bounded k-FIFO put/get");
    for &k in &[1usize, 4, 8] {
        group.bench_function(format!("k={k}"), |b| {
            let pool = BoundedKFifo::<u64>::new(k, 64);
            b.iter(|| fill_then_drain(&pool, 500));
        });
    }
    group.finish();
}

fn benchmark_sequential_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sequential backend put/get");

    group.bench_function("TreiberStack", |b| {
        let pool = TreiberStack::<u64>::new();
        b.iter(|| fill_then_drain(&pool, 1_000));
    });

    group.bench_function("MsQueue", |b| {
        let pool = MsQueue::<u64>::new();
        b.iter(|| fill_then_drain(&pool, 1_000));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_unbounded_kfifo,
    benchmark_bounded_kfifo,
    benchmark_sequential_backends,
);
criterion_main!(benches);
