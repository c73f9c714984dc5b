// Read performance benchmarks for SparseDb

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sparsedb::{KeyType, MemIndex, Row, RowStore, Schema, Value, WriteTimestamp};
use std::hint::black_box;

/// Builds a store of `size` rows, each with `revisions` revisions of its `Employer`.
fn populated_store(size: i64, revisions: i64) -> RowStore<MemIndex> {
    let schema = Schema::new("bench", "id", KeyType::Long).unwrap();
    let store = RowStore::new(MemIndex::new(), schema).unwrap();

    for i in 0..size {
        let row = Row::new().with("id", i).with("Name", format!("name{:08}", i));
        store.write(&row, WriteTimestamp::At(0)).unwrap();
        for ts in 1..=revisions {
            let row = Row::new().with("id", i).with("Employer", format!("employer{}", ts));
            store.write(&row, WriteTimestamp::At(ts)).unwrap();
        }
    }
    store
}

fn benchmark_sequential_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_read");

    for size in [100, 1000, 10000].iter() {
        let store = populated_store(*size, 1);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    let row = store.read(&Value::Long(i)).unwrap();
                    black_box(row);
                }
            });
        });
    }

    group.finish();
}

fn benchmark_random_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_read");

    for size in [100, 1000, 10000].iter() {
        let store = populated_store(*size, 1);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                use rand::Rng;
                let mut rng = rand::rng();

                for _ in 0..size {
                    let id = rng.random_range(0..size);
                    let row = store.read(&Value::Long(id)).unwrap();
                    black_box(row);
                }
            });
        });
    }

    group.finish();
}

fn benchmark_history_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_depth");

    for revisions in [1, 10, 100].iter() {
        let store = populated_store(100, *revisions);

        group.bench_with_input(BenchmarkId::new("latest", revisions), revisions, |b, _| {
            b.iter(|| black_box(store.read(&Value::Long(50)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("as_of_first", revisions), revisions, |b, _| {
            b.iter(|| black_box(store.read_at(&Value::Long(50), Some(1)).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    let store = populated_store(10000, 3);
    for len in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, &len| {
            b.iter(|| {
                let from = Value::Long(5000);
                let to = Value::Long(5000 + len);
                let rows = store.scan(Some(&from), Some(&to)).unwrap().count();
                black_box(rows);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sequential_read,
    benchmark_random_read,
    benchmark_history_depth,
    benchmark_scan
);
criterion_main!(benches);
