use criterion::Criterion;
use routine::{ErrorFunction, Network, TrainingSet, WyRng};

fn bench_bptt(bench: &mut Criterion) {
    let set = TrainingSet::from_templates().unwrap();
    let mut rng = WyRng::seeded(0xb977);
    let net = &mut Network::new(set.in_width, 50, set.out_width).unwrap();
    net.randomize_weights(&mut rng, 1.);
    let sequence = &set.sequences[0];

    bench.bench_function("bptt-coffee-sequence", |b| {
        b.iter(|| {
            net.randomize_hidden(&mut rng);
            net.calculate_weight_changes(sequence, ErrorFunction::SumSquare, false);
            net.clear_deltas();
        })
    });
    bench.bench_function("bptt-adjust", |b| b.iter(|| net.adjust_weights(0.1)));
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
    bench_bptt(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
