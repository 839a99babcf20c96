#![allow(missing_docs)]

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use skitter::locomotion::{
    generate_path, generate_path_with_samples, procedural_spider,
    CreatureAnimator, PathBounds,
};
use skitter::options::Options;
use skitter::util::easing::EasingFunction;

fn easing_benchmark(c: &mut Criterion) {
    let f = EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 };
    c.bench_function("cubic_hermite_easing", |b| {
        b.iter(|| black_box(f.evaluate(black_box(0.5))));
    });
}

fn path_generation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_generation");
    let bounds = PathBounds::square(10.0, 0.0);

    for samples in [100, 500, 2000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(samples),
            &samples,
            |b, &samples| {
                let mut rng = StdRng::seed_from_u64(0);
                b.iter(|| {
                    black_box(generate_path_with_samples(
                        8, samples, &bounds, &mut rng,
                    ))
                });
            },
        );
    }
    group.finish();
}

fn creature_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("creature_update");
    let mut rng = StdRng::seed_from_u64(0);
    let path = Arc::new(
        generate_path(8, &PathBounds::square(10.0, 0.0), &mut rng)
            .expect("path"),
    );
    let options = Options::default();

    for leg_pairs in [1, 4, 8] {
        let rig = procedural_spider(leg_pairs, 2.0);
        let mut animator =
            CreatureAnimator::new(&rig, Arc::clone(&path), 3.5, &options)
                .expect("rig");
        group.bench_with_input(
            BenchmarkId::from_parameter(leg_pairs * 2),
            &leg_pairs,
            |b, _| {
                b.iter(|| animator.update(black_box(1.0 / 60.0)));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    easing_benchmark,
    path_generation_benchmark,
    creature_update_benchmark,
);
criterion_main!(benches);
