//! Benchmark: predicate kernels per backend strategy.
//!
//! Run with:
//! ```bash
//! cargo bench -p bitsieve-core --bench predicate_benchmark
//! ```

use bitsieve_core::{
    available_backends, ArithOp, ColumnFilter, CompareOp, Dispatcher, FilterConfig, NumericScalar,
    Predicate, RangeType, TypedColumn,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 3] = [1_024, 16_384, 262_144];

fn random_f32(len: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.gen_range(-100.0..100.0)).collect()
}

fn random_i32(len: usize) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.gen_range(-1_000..1_000)).collect()
}

fn backends() -> Vec<Dispatcher> {
    available_backends()
        .into_iter()
        .filter_map(|kind| Dispatcher::new(kind).ok())
        .collect()
}

fn bench_compare_val(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_val_f32_gt");

    for &len in &SIZES {
        group.throughput(Throughput::Elements(len as u64));
        let data = random_f32(len);
        let mut bitmask = vec![0u8; len / 8];

        for d in backends() {
            group.bench_with_input(BenchmarkId::new(d.kind().as_str(), len), &len, |b, _| {
                b.iter(|| d.op_compare_val(CompareOp::Gt, black_box(&mut bitmask), black_box(&data), 0.0));
            });
        }
    }

    group.finish();
}

fn bench_compare_column_i32(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_column_i32_le");

    for &len in &SIZES {
        group.throughput(Throughput::Elements(len as u64));
        let left = random_i32(len);
        let right: Vec<i32> = left.iter().rev().copied().collect();
        let mut bitmask = vec![0u8; len / 8];

        for d in backends() {
            group.bench_with_input(BenchmarkId::new(d.kind().as_str(), len), &len, |b, _| {
                b.iter(|| {
                    d.op_compare_column(CompareOp::Le, black_box(&mut bitmask), black_box(&left), black_box(&right))
                });
            });
        }
    }

    group.finish();
}

fn bench_range_val(c: &mut Criterion) {
    let mut group = c.benchmark_group("within_range_val_f32");

    for &len in &SIZES {
        group.throughput(Throughput::Elements(len as u64));
        let data = random_f32(len);
        let mut bitmask = vec![0u8; len / 8];

        for d in backends() {
            group.bench_with_input(BenchmarkId::new(d.kind().as_str(), len), &len, |b, _| {
                b.iter(|| {
                    d.op_within_range_val(RangeType::IncExc, black_box(&mut bitmask), -10.0, 10.0, black_box(&data))
                });
            });
        }
    }

    group.finish();
}

fn bench_arith_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("arith_compare_f32_mul_ge");

    for &len in &SIZES {
        group.throughput(Throughput::Elements(len as u64));
        let data = random_f32(len);
        let mut bitmask = vec![0u8; len / 8];

        for d in backends() {
            group.bench_with_input(BenchmarkId::new(d.kind().as_str(), len), &len, |b, _| {
                b.iter(|| {
                    d.op_arith_compare(ArithOp::Mul, CompareOp::Ge, black_box(&mut bitmask), black_box(&data), 2.0, 50.0)
                });
            });
        }
    }

    group.finish();
}

fn bench_set_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("and_u64");

    for &bits in &SIZES {
        group.throughput(Throughput::Elements(bits as u64));
        let words = bits / 64 + 1;
        let mut rng = StdRng::seed_from_u64(7);
        let mut left: Vec<u64> = (0..words).map(|_| rng.gen()).collect();
        let right: Vec<u64> = (0..words).map(|_| rng.gen()).collect();

        for d in backends() {
            group.bench_with_input(BenchmarkId::new(format!("{}/aligned", d.kind().as_str()), bits), &bits, |b, _| {
                b.iter(|| d.op_and(black_box(&mut left), black_box(&right), 0, 0, bits));
            });
            group.bench_with_input(BenchmarkId::new(format!("{}/offset", d.kind().as_str()), bits), &bits, |b, _| {
                b.iter(|| d.op_and(black_box(&mut left), black_box(&right), 3, 5, bits));
            });
        }
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_filter_i32");
    let len = 1_000_003;
    group.throughput(Throughput::Elements(len as u64));

    let column = TypedColumn::from(random_i32(len));
    let predicate = Predicate::Compare {
        op: CompareOp::Lt,
        value: NumericScalar::Int32(0),
    };
    let filter = ColumnFilter::new(Dispatcher::detect(), FilterConfig::default());

    group.bench_function("sequential", |b| {
        b.iter(|| filter.evaluate(black_box(&column), black_box(&predicate)));
    });
    group.bench_function("parallel", |b| {
        b.iter(|| filter.evaluate_parallel(black_box(&column), black_box(&predicate)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compare_val,
    bench_compare_column_i32,
    bench_range_val,
    bench_arith_compare,
    bench_set_ops,
    bench_filter
);
criterion_main!(benches);
