use criterion::Criterion;
use rand::{rngs::SmallRng, RngCore, SeedableRng};
use routine::random::{normal, seed_clock, uniform, WyRng};

fn bench_smallrng(bench: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(seed_clock());

    bench.bench_function("random-smallrng", |b| {
        b.iter(|| rng.next_u64());
    });
}

fn bench_wyhash(bench: &mut Criterion) {
    let mut rng = WyRng::seeded(seed_clock());

    bench.bench_function("random-wyhash", |b| {
        b.iter(|| rng.next_u64());
    });
}

fn bench_draws(bench: &mut Criterion) {
    let mut rng = WyRng::seeded(seed_clock());

    bench.bench_function("random-uniform", |b| {
        b.iter(|| uniform(&mut rng, -1., 1.));
    });
    bench.bench_function("random-normal", |b| {
        b.iter(|| normal(&mut rng, 0., 1.));
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(1000)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_smallrng(&mut criterion);
    bench_wyhash(&mut criterion);
    bench_draws(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
