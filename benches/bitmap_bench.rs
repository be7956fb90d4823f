use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rbits::Bitmap32;

fn sparse() -> Bitmap32 {
    (0..1_000_000u32).step_by(97).collect()
}

fn dense() -> Bitmap32 {
    (0..1_000_000u32).filter(|v| v % 7 != 0).collect()
}

fn bench_membership(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership");
    let s = sparse();
    let d = dense();

    group.bench_function("insert_sequential", |b| {
        b.iter(|| {
            let mut bm = Bitmap32::new();
            for v in 0..100_000u32 {
                bm.insert(black_box(v));
            }
            bm
        })
    });

    group.bench_function("contains_sparse", |b| {
        b.iter(|| (0..100_000u32).filter(|&v| s.contains(black_box(v))).count())
    });

    group.bench_function("contains_dense", |b| {
        b.iter(|| (0..100_000u32).filter(|&v| d.contains(black_box(v))).count())
    });
    group.finish();
}

fn bench_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("algebra");
    let s = sparse();
    let d = dense();
    let mut r = d.clone();
    r.optimize();

    group.bench_function("and_sparse_dense", |b| b.iter(|| black_box(s.and(&d))));
    group.bench_function("or_sparse_dense", |b| b.iter(|| black_box(s.or(&d))));
    group.bench_function("xor_dense_runs", |b| b.iter(|| black_box(d.xor(&r))));
    group.bench_function("andnot_runs_sparse", |b| {
        b.iter(|| black_box(r.andnot(&s)))
    });
    group.bench_function("is_subset", |b| b.iter(|| black_box(s.is_subset(&d))));
    group.finish();
}

fn bench_rank_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_select");
    let d = dense();
    let n = d.len();

    group.bench_function("rank", |b| {
        b.iter(|| {
            for v in (0..1_000_000u32).step_by(1013) {
                black_box(d.rank(v));
            }
        })
    });

    group.bench_function("select", |b| {
        b.iter(|| {
            for k in (0..n).step_by(1013) {
                black_box(d.select(k));
            }
        })
    });
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let mut d = dense();
    d.optimize();
    let bytes = d.to_bytes();

    group.bench_function("to_bytes", |b| b.iter(|| black_box(d.to_bytes())));
    group.bench_function("from_bytes", |b| {
        b.iter(|| Bitmap32::from_bytes(black_box(&bytes)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_membership,
    bench_algebra,
    bench_rank_select,
    bench_codec
);
criterion_main!(benches);
