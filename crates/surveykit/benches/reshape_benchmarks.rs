//! Reshape engine performance benchmarks.
//!
//! Measures wide-to-long and long-to-wide pivots across table sizes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use surveykit::reshape::{long_to_wide, wide_to_long};
use surveykit::{Table, Value};

/// Generate a wide table with an id column and `measures` numeric columns.
fn generate_wide(rows: usize, measures: usize) -> (Table, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(42);
    let names: Vec<String> = (0..measures).map(|i| format!("trial_{}", i + 1)).collect();

    let mut table = Table::new();
    table
        .push_column(
            "subject",
            (0..rows).map(|r| Value::from(format!("S{:05}", r))).collect(),
        )
        .unwrap();
    for name in &names {
        let values = (0..rows)
            .map(|_| {
                if rng.gen_bool(0.05) {
                    Value::Missing
                } else {
                    Value::from(rng.gen_range(1.0..7.0))
                }
            })
            .collect();
        table.push_column(name.clone(), values).unwrap();
    }

    (table, names)
}

/// Benchmark melting wide tables of various sizes.
fn bench_wide_to_long(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_to_long");

    for rows in [100, 1_000, 10_000].iter() {
        let (table, names) = generate_wide(*rows, 10);

        group.throughput(Throughput::Elements((*rows * names.len()) as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter(|| black_box(wide_to_long(table, &["subject"], &names, "trial", "score").unwrap()))
        });
    }

    group.finish();
}

/// Benchmark spreading long tables back to wide form.
fn bench_long_to_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_to_wide");

    for rows in [100, 1_000, 10_000].iter() {
        let (table, names) = generate_wide(*rows, 10);
        let long = wide_to_long(&table, &["subject"], &names, "trial", "score").unwrap();

        group.throughput(Throughput::Elements(long.row_count() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &long, |b, long| {
            b.iter(|| black_box(long_to_wide(long, &["subject"], "trial", "score").unwrap()))
        });
    }

    group.finish();
}

/// Benchmark melting with a growing number of measure columns.
fn bench_measure_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure_scaling");

    let rows = 1_000;
    for measures in [5, 20, 50].iter() {
        let (table, names) = generate_wide(rows, *measures);

        group.throughput(Throughput::Elements((rows * measures) as u64));
        group.bench_with_input(BenchmarkId::new("measures", measures), &table, |b, table| {
            b.iter(|| black_box(wide_to_long(table, &["subject"], &names, "trial", "score").unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_wide_to_long,
    bench_long_to_wide,
    bench_measure_scaling,
);
criterion_main!(benches);
