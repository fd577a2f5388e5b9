//! End-to-end tests for the path finder over a small hand-built space.
//!
//! The fixture has eight clusters in three dimensions. Dimensions 0 and 1
//! line up with the user's ratings, dimension 2 is mostly noise, so a rank-2
//! personalization keeps the first two and the geometry below stays easy to
//! reason about: low-rated movies sit bottom-left, loved movies top-right,
//! and cluster 8 is a far-away outlier.

use engine::{
    DimensionAnalyser, EngineError, Movie, MovieLookup, PathFinder, PredictionKernel,
    SearchConfig, TasteSpace, UserData,
};
use std::sync::Arc;

const COORDS: [(u32, [f32; 3]); 8] = [
    (1, [-1.0, -1.0, 0.3]),
    (2, [-1.0, -0.8, -0.1]),
    (3, [1.0, 1.0, 0.2]),
    (4, [-0.5, -0.5, -0.3]),
    (5, [0.5, 0.5, 0.1]),
    (6, [0.9, 1.1, -0.2]),
    (7, [0.0, 0.0, 0.0]),
    (8, [2.0, -2.0, 0.25]),
];

fn space() -> TasteSpace {
    TasteSpace::new(
        COORDS.iter().map(|(id, _)| *id).collect(),
        COORDS.iter().map(|(_, c)| c.to_vec()).collect(),
    )
}

fn movie(id: u32, cluster_id: u32, title: &str, rating: Option<f32>) -> Movie {
    Movie {
        id,
        cluster_id,
        title: title.to_string(),
        genres: vec!["Drama".to_string()],
        rating,
        votes: rating.map(|_| 1000),
    }
}

fn lookup() -> MovieLookup {
    MovieLookup::new(vec![
        movie(1, 1, "Slow Water", Some(6.1)),
        movie(2, 2, "Harbor Lights", Some(6.8)),
        movie(3, 3, "The Long Meadow", Some(8.0)),
        movie(4, 4, "Night Office", Some(5.9)),
        movie(5, 5, "Paper Kites", Some(7.2)),
        movie(6, 6, "North of Nowhere", Some(7.9)),
        movie(7, 7, "Gray Morning", None),
        movie(8, 8, "Smith, Agent of Chaos", Some(4.9)),
        movie(9, 3, "Meadow Revisited", None),
        movie(10, 3, "The Longest Meadow", Some(9.1)),
    ])
}

// one point per rated movie, in the order the ratings were given
fn user() -> UserData {
    let entries: [(u32, u32, f32); 7] = [
        (1, 1, 1.0),
        (2, 2, 1.0),
        (4, 4, 2.5),
        (7, 7, 2.5),
        (5, 5, 4.0),
        (6, 6, 4.0),
        (3, 3, 5.0),
    ];
    let coordinates = entries
        .iter()
        .map(|(_, cluster, _)| {
            COORDS
                .iter()
                .find(|(id, _)| id == cluster)
                .map(|(_, c)| c.to_vec())
                .unwrap()
        })
        .collect();
    UserData::new(
        entries.iter().map(|(m, _, _)| *m).collect(),
        entries.iter().map(|(_, c, _)| *c).collect(),
        entries.iter().map(|(_, _, r)| *r).collect(),
        coordinates,
    )
    .unwrap()
}

fn empty_user() -> UserData {
    UserData::new(vec![], vec![], vec![], vec![]).unwrap()
}

fn finder() -> PathFinder {
    PathFinder::new(
        Arc::new(lookup()),
        Arc::new(space()),
        user(),
        DimensionAnalyser::InverseFunction,
        SearchConfig::default().with_user_dimensions(2),
    )
}

const DELTA: f64 = 1e-4;

#[test]
fn path_short() {
    let path = finder().find(Some(6), 3, None).unwrap();

    assert_eq!(path.start.id, 6);
    assert_eq!(path.target.id, 3);
    assert_eq!(path.cluster_ids, vec![6, 3]);
    assert!((path.distance - 0.1744).abs() < DELTA);

    assert_eq!(path.clusters.len(), 2);
    assert_eq!(path.clusters[0].len(), 1);
    // target cluster representatives come best-rated first, unrated last
    let ids: Vec<u32> = path.clusters[1].iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![10, 3, 9]);
}

#[test]
fn path_long() {
    let path = finder().find(Some(3), 1, None).unwrap();

    assert_eq!(path.start.id, 3);
    assert_eq!(path.target.id, 1);
    // walks the diagonal through every stepping-stone cluster
    assert_eq!(path.cluster_ids, vec![3, 5, 7, 4, 2, 1]);
    assert!((path.distance - 3.5818).abs() < DELTA);
}

#[test]
fn path_with_auto_start_uses_best_rated_movie() {
    // only "The Long Meadow" (5.0) clears the suitability threshold
    let path = finder().find(None, 8, None).unwrap();
    assert_eq!(path.start.id, 3);
    assert_eq!(path.cluster_ids, vec![3, 8]);
    assert!((path.distance - 3.8710).abs() < DELTA);
}

#[test]
fn path_auto_start_falls_back_when_threshold_unmet() {
    // the only movie above 4.5 sits in the target's own cluster, so the
    // unconstrained rescan picks the nearest rated movie instead
    let path = finder().find(None, 3, None).unwrap();
    assert_eq!(path.start.id, 6);
    assert_eq!(path.cluster_ids, vec![6, 3]);
}

#[test]
fn path_rejects_unknown_movie() {
    assert!(matches!(
        finder().find(Some(6), 999, None),
        Err(EngineError::UnknownMovie(999))
    ));
    assert!(matches!(
        finder().find(Some(999), 3, None),
        Err(EngineError::UnknownMovie(999))
    ));
}

#[test]
fn path_with_empty_profile_has_no_start() {
    assert!(matches!(
        finder().find(None, 8, Some(empty_user())),
        Err(EngineError::NoSuitableStart)
    ));
}

#[test]
fn predict_inverse_proportional() {
    let prediction = finder()
        .predict(8, PredictionKernel::InverseProportional, None)
        .unwrap();
    assert!((prediction.predicted_rating as f64 - 2.8690).abs() < 1e-3);

    // all seven rated movies contribute, nearest first
    assert_eq!(prediction.components.len(), 7);
    assert_eq!(prediction.components[0].movie_id, 7);
    assert!((prediction.components[0].distance - 3.4873).abs() < DELTA);
    let total: f64 = prediction.components.iter().map(|c| c.proportion).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn predict_gaussian() {
    let prediction = finder().predict(8, PredictionKernel::Gaussian, None).unwrap();
    assert!((prediction.predicted_rating as f64 - 2.9626).abs() < 1e-3);
}

#[test]
fn predict_same_cluster_neighbor_dominates() {
    // movie 9 shares a cluster with a rated movie; the zero-distance
    // neighbor is capped rather than blowing up, and dominates the estimate
    let prediction = finder()
        .predict(9, PredictionKernel::InverseProportional, None)
        .unwrap();
    assert!((prediction.predicted_rating as f64 - 4.8512).abs() < 1e-3);
    assert_eq!(prediction.components[0].movie_id, 3);
    assert_eq!(prediction.components[0].distance, 0.0);
    assert!((prediction.components[0].proportion - 0.7036).abs() < 1e-3);
}

#[test]
fn predict_is_always_within_rating_bounds() {
    let finder = finder();
    for movie_id in 1..=10 {
        for kernel in [
            PredictionKernel::InverseProportional,
            PredictionKernel::Gaussian,
        ] {
            let p = finder.predict(movie_id, kernel, None).unwrap();
            assert!(
                (0.0..=5.0).contains(&p.predicted_rating),
                "movie {movie_id} predicted outside the rating scale"
            );
        }
    }
}

#[test]
fn predict_with_empty_profile_is_degenerate() {
    assert!(matches!(
        finder().predict(8, PredictionKernel::InverseProportional, Some(empty_user())),
        Err(EngineError::DegeneratePrediction(8))
    ));
}

#[test]
fn predict_rejects_unknown_movie() {
    assert!(matches!(
        finder().predict(999, PredictionKernel::Gaussian, None),
        Err(EngineError::UnknownMovie(999))
    ));
}

#[test]
fn recommended_interleaves_rating_and_distance() {
    let recommendations = finder().find_recommended(3, None).unwrap();

    // seven candidate clusters exist; selection alternates between the
    // best-predicted and the most-distant ranking
    let clusters: Vec<u32> = recommendations
        .iter()
        .map(|p| p.movie.cluster_id)
        .collect();
    assert_eq!(clusters, vec![6, 8, 5, 1, 7, 2, 4]);

    // every cluster appears exactly once
    let mut unique = clusters.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), clusters.len());
}

#[test]
fn recommended_respects_k() {
    let finder = PathFinder::new(
        Arc::new(lookup()),
        Arc::new(space()),
        user(),
        DimensionAnalyser::InverseFunction,
        SearchConfig::default()
            .with_user_dimensions(2)
            .with_k_nearest(3),
    );
    let recommendations = finder.find_recommended(3, None).unwrap();
    assert_eq!(recommendations.len(), 3);
}

#[test]
fn custom_profile_changes_nothing_shared() {
    let finder = finder();
    let before = finder.predict(8, PredictionKernel::Gaussian, None).unwrap();
    // a request-scoped profile produces its own personalization
    let _ = finder.predict(8, PredictionKernel::Gaussian, Some(user()));
    let after = finder.predict(8, PredictionKernel::Gaussian, None).unwrap();
    assert_eq!(before.predicted_rating, after.predicted_rating);
}
