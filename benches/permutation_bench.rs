use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rankstats::stats::{
    bootstrap_mean_ci, kruskal_wallis_test, ks_permutation_test, rank_data,
    spearman_permutation_test, BootstrapOptions, PermutationOptions,
};

fn create_sample(size: usize, offset: f64) -> Vec<f64> {
    (0..size)
        .map(|i| ((i * 7919) % 1000) as f64 * 0.01 + offset + (i % 13) as f64)
        .collect()
}

fn benchmark_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    for size in [1_000, 10_000, 100_000].iter() {
        let data = create_sample(*size, 0.0);
        group.bench_with_input(BenchmarkId::new("rank_data", size), &data, |b, data| {
            b.iter(|| black_box(rank_data(data).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_permutation_tests(c: &mut Criterion) {
    let mut group = c.benchmark_group("permutation_tests");
    group.sample_size(10);

    let x = create_sample(200, 0.0);
    let y = create_sample(200, 0.5);
    let z = create_sample(200, 1.0);

    for parallel in [false, true] {
        let options = PermutationOptions::new(10_000).seed(1).parallel(parallel);
        let label = if parallel { "parallel" } else { "serial" };

        group.bench_function(BenchmarkId::new("spearman", label), |b| {
            b.iter(|| black_box(spearman_permutation_test(&x, &y, &options).unwrap()));
        });

        group.bench_function(BenchmarkId::new("kruskal_wallis", label), |b| {
            b.iter(|| black_box(kruskal_wallis_test(&[x.as_slice(), y.as_slice(), z.as_slice()], &options).unwrap()));
        });

        group.bench_function(BenchmarkId::new("ks", label), |b| {
            b.iter(|| black_box(ks_permutation_test(&x, &y, &options).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_bootstrap(c: &mut Criterion) {
    let sample = create_sample(500, 0.0);
    let options = BootstrapOptions::new(10_000).seed(1);

    c.bench_function("bootstrap_mean_ci", |b| {
        b.iter(|| black_box(bootstrap_mean_ci(&sample, &options).unwrap()));
    });
}

criterion_group!(
    benches,
    benchmark_ranking,
    benchmark_permutation_tests,
    benchmark_bootstrap
);
criterion_main!(benches);
