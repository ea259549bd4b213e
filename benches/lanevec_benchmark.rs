use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lanevec::{Associative, Binary, Mask, Species, Vector};

const SIZES: [usize; 4] = [1024, 4096, 16384, 1 << 16];

// Sums a buffer a species at a time, with a masked tail.
fn sum_f32<const N: usize>(data: &[f32]) -> f32 {
    let species = Species::<f32, N>::of();
    let bound = species.loop_bound(data.len());
    let mut acc = species.zero();
    let mut i = 0;
    while i < bound {
        if let Ok(v) = Vector::from_slice(data, i) {
            acc = acc + v;
        }
        i += N;
    }
    let tail = species.index_in_range(i as i64, data.len() as i64);
    let rest = Vector::from_slice_masked(data, i, &tail).unwrap_or(species.zero());
    acc.reduce_lanes(Associative::Add).unwrap_or(0.0) + rest.reduce_lanes(Associative::Add).unwrap_or(0.0)
}

fn bench_lanewise(c: &mut Criterion) {
    let mut group = c.benchmark_group("lanewise_sum");
    group.sample_size(50);

    for &size in &SIZES {
        // Odd length so the masked tail runs too
        let data = Species::<f32, 8>::of()
            .inputs()
            .extend((0..size + 3).map(|x| x as f32))
            .build();

        group.bench_with_input(BenchmarkId::new("f32x4", size), &size, |b, _| {
            b.iter(|| sum_f32::<4>(black_box(&data)))
        });
        group.bench_with_input(BenchmarkId::new("f32x8", size), &size, |b, _| {
            b.iter(|| sum_f32::<8>(black_box(&data)))
        });
        group.bench_with_input(BenchmarkId::new("f32x16", size), &size, |b, _| {
            b.iter(|| sum_f32::<16>(black_box(&data)))
        });
    }
    group.finish();
}

fn bench_masked_fma(c: &mut Criterion) {
    let mut group = c.benchmark_group("masked_ops");
    let species = Species::<f64, 4>::of();
    let a = species.iota();
    let b = species.broadcast(1.5);
    let m = Mask::from_array([true, false, true, true]);

    group.bench_function("masked_add_f64x4", |bench| {
        bench.iter(|| black_box(&a).lanewise_masked(Binary::Add, black_box(&b), &m))
    });
    group.bench_function("fma_f64x4", |bench| {
        bench.iter(|| black_box(&a).fma(black_box(&b), black_box(&a)))
    });
    group.finish();
}

fn bench_permute(c: &mut Criterion) {
    let mut group = c.benchmark_group("permute");
    let species = Species::<i32, 16>::of();
    let v = species.iota();
    let m = Mask::<i32, 16>::from_long(0b1010_1100_0011_0101);
    let reverse = species.iota_shuffle(15, -1, true);

    group.bench_function("compress_i32x16", |bench| {
        bench.iter(|| black_box(&v).compress(black_box(&m)))
    });
    group.bench_function("expand_i32x16", |bench| {
        bench.iter(|| black_box(&v).expand(black_box(&m)))
    });
    group.bench_function("rearrange_i32x16", |bench| {
        bench.iter(|| black_box(&v).rearrange(black_box(&reverse)))
    });
    group.bench_function("slice_i32x16", |bench| {
        bench.iter(|| black_box(&v).slice(black_box(5)))
    });
    group.finish();
}

criterion_group!(benches, bench_lanewise, bench_masked_fma, bench_permute);
criterion_main!(benches);
