//! Benchmarks for the hot paths: the O(n^2 k) distance table, the
//! personalization pipeline and the bounded path search.
//!
//! Run with: cargo bench --package engine
//!
//! The space is synthesized from a seeded generator so runs are comparable.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use engine::analysis::analyser::DimensionAnalyser;
use engine::model::{TasteSpace, UserData};
use engine::taste_ops;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CLUSTERS: usize = 500;
const DIMENSIONS: usize = 16;
const RATED: usize = 200;

fn synthetic_space() -> TasteSpace {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let cluster_ids: Vec<u32> = (1..=CLUSTERS as u32).collect();
    let coordinates: Vec<Vec<f32>> = (0..CLUSTERS)
        .map(|_| (0..DIMENSIONS).map(|_| rng.random_range(-2.0..2.0)).collect())
        .collect();
    TasteSpace::new(cluster_ids, coordinates)
}

fn synthetic_user(space: &TasteSpace) -> UserData {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut movie_ids = Vec::with_capacity(RATED);
    let mut cluster_ids = Vec::with_capacity(RATED);
    let mut ratings = Vec::with_capacity(RATED);
    let mut coordinates = Vec::with_capacity(RATED);
    for i in 0..RATED {
        let index = rng.random_range(0..space.num_clusters());
        movie_ids.push(10_000 + i as u32);
        cluster_ids.push(space.cluster_id(index));
        // rating loosely follows the first coordinate so the analysers
        // have something to find
        let half_points = (space.coordinate(index)[0] + 2.0) * 2.5;
        ratings.push((half_points.round() * 0.5).clamp(0.5, 5.0));
        coordinates.push(space.coordinate(index).to_vec());
    }
    UserData::new(movie_ids, cluster_ids, ratings, coordinates).expect("lengths match")
}

fn bench_distance_matrix(c: &mut Criterion) {
    let space = synthetic_space();
    c.bench_function("distance_matrix_compute", |b| {
        b.iter(|| black_box(black_box(&space).compute_distances()))
    });
}

fn bench_scale_to_user(c: &mut Criterion) {
    let space = synthetic_space();
    let user = synthetic_user(&space);
    c.bench_function("scale_to_user_inverse", |b| {
        b.iter(|| {
            black_box(taste_ops::scale_to_user(
                black_box(&space),
                black_box(&user),
                7,
                DimensionAnalyser::InverseFunction,
            ))
        })
    });
}

fn bench_analyse_midpoint(c: &mut Criterion) {
    let space = synthetic_space();
    let user = synthetic_user(&space);
    c.bench_function("analyse_midpoint_fit", |b| {
        b.iter(|| black_box(DimensionAnalyser::MidpointFit.analyse(black_box(&user))))
    });
}

criterion_group!(
    benches,
    bench_distance_matrix,
    bench_scale_to_user,
    bench_analyse_midpoint
);
criterion_main!(benches);
