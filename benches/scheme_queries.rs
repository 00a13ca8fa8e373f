use consistent_geohash::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

const SCHEMES: [HashingSchemeChoice; 2] = [HashingSchemeChoice::Grid, HashingSchemeChoice::Face];

fn indexed_scheme(
    choice: HashingSchemeChoice,
    dimension: usize,
    rng: &mut StdRng,
) -> (AnyHashingScheme, HashMap<BucketId, u64>, Vec<IntPoint>) {
    let scheme = make_hashing_scheme(choice, dimension, 5.0, DEFAULT_SCALE, rng).unwrap();
    let mut values = HashMap::new();
    for _ in 0..10_000 {
        let p = IntPoint::random(dimension, 1_000, rng);
        *values.entry(scheme.hash(&p)).or_insert(0) += 1;
    }
    let centers = (0..64).map(|_| IntPoint::random(dimension, 1_000, rng)).collect();
    (scheme, values, centers)
}

fn benchmark_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash");
    let mut rng = StdRng::seed_from_u64(1);

    for choice in SCHEMES {
        for dimension in [2, 5, 10, 20].iter() {
            let (scheme, _, points) = indexed_scheme(choice, *dimension, &mut rng);
            group.bench_with_input(
                BenchmarkId::new(choice.as_str(), dimension),
                dimension,
                |b, _| {
                    b.iter(|| {
                        for p in &points {
                            black_box(scheme.hash(black_box(p)));
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

/// Grid queries grow like 2^d; face queries stay O(d²).
fn benchmark_eval_ball(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval_ball");
    let mut rng = StdRng::seed_from_u64(2);

    for choice in SCHEMES {
        for dimension in [2, 4, 6, 8].iter() {
            let (scheme, values, centers) = indexed_scheme(choice, *dimension, &mut rng);
            let radius = scheme.max_radius();
            group.bench_with_input(
                BenchmarkId::new(choice.as_str(), dimension),
                dimension,
                |b, _| {
                    b.iter(|| {
                        for center in &centers {
                            black_box(scheme.eval_ball(center, radius, &Count, &values));
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_hash, benchmark_eval_ball);
criterion_main!(benches);
