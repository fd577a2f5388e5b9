//! Analysers identifying user preference in individual taste dimensions,
//! along with each dimension's explanatory power.
//!
//! Both strategies are pure functions of the user data: no state is carried
//! between calls, so an analyser value can be shared freely.

use crate::analysis::sample::SampleIndexSequence;
use crate::analysis::vecmath;
use crate::model::dimension::DimensionStat;
use crate::model::user_data::UserData;

const MC_SAMPLES: usize = 10_000;

/// Strategy for scoring how well each embedding dimension explains a user's
/// ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionAnalyser {
    /// Scores dimensions by how tightly same-rating movies cluster
    InverseFunction,
    /// Scores dimensions by midpoint interpolation against a Monte-Carlo
    /// baseline
    MidpointFit,
}

impl DimensionAnalyser {
    pub fn analyse(&self, data: &UserData) -> Vec<DimensionStat> {
        match self {
            DimensionAnalyser::InverseFunction => analyse_inverse_function(data),
            DimensionAnalyser::MidpointFit => analyse_midpoint_fit(data),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DimensionAnalyser::InverseFunction => "inverse function",
            DimensionAnalyser::MidpointFit => "midpoint function",
        }
    }
}

/// Calculates explained variance of the inverse ratings function. A
/// dimension with high explained variance has strong monotonicity and
/// consistency: movies with the exact same rating sit close to each other
/// within that dimension.
///
/// This requires the data to include at least 2 movies with the exact same
/// rating. A profile of 11 movies with 11 distinct ratings carries no
/// signal here; several ratings with 10+ movies each work well. Degenerate
/// profiles produce NaN scores rather than an error.
pub fn analyse_inverse_function(data: &UserData) -> Vec<DimensionStat> {
    let k = data.dimensions();
    let by_rating = data.group_by_rating();

    let full_sse = vecmath::by_col(data.space().coordinates(), |col| {
        vecmath::sum_of_squared(col, vecmath::mean(col))
    });

    let mut sse = vec![0.0f32; k];
    for bucket in &by_rating {
        let bucket_sse = vecmath::by_col(bucket.space().coordinates(), |col| {
            vecmath::sum_of_squared(col, vecmath::mean(col))
        });
        if !bucket_sse.is_empty() {
            vecmath::addi(&mut sse, &bucket_sse);
        }
    }

    (0..k)
        .map(|i| DimensionStat::new(i, sse[i] as f64, full_sse[i] as f64))
        .collect()
}

/// Calculates explained variance of midpoint interpolation: movies close to
/// each other within a meaningful dimension should have similar ratings.
///
/// ## Algorithm
/// We want dimensions with an associated function f mapping the coordinate
/// to a rating, without assuming anything about f beyond being nice. Each
/// interior rating is predicted as the mean of its two neighbors' ratings in
/// coordinate-sorted order; the model entropy is the MSE of that estimator.
/// The baseline applies the same estimator to random orderings instead of
/// coordinate order (Monte-Carlo sampled from a fixed-seed generator, so the
/// score is reproducible), which isolates the benefit of this particular
/// dimension's ordering over any ordering.
pub fn analyse_midpoint_fit(data: &UserData) -> Vec<DimensionStat> {
    let k = data.dimensions();
    let columns = vecmath::transpose(data.space().coordinates());
    let ratings = data.ratings();

    // Baseline mse is independent of any coordinate
    let mut sampler = SampleIndexSequence::new(0, ratings.len().saturating_sub(1));
    let mut mse_parts = vec![0.0f32; MC_SAMPLES];
    for part in mse_parts.iter_mut() {
        let indices = sampler.random_sequence();
        *part = midpoint_mse(ratings, &indices);
    }
    let baseline_mse = vecmath::sum(&mse_parts) / mse_parts.len() as f32;

    let mut stats = Vec::with_capacity(k);
    for (i, column) in columns.iter().enumerate() {
        let sorted_indices = index_sort(column);
        let model_mse = midpoint_mse(ratings, &sorted_indices);
        stats.push(DimensionStat::new(
            i,
            model_mse as f64,
            baseline_mse as f64,
        ));
    }
    stats
}

/* Endpoints are excluded; fewer than 3 points degenerate to NaN */
fn midpoint_mse(ratings: &[f32], indices: &[usize]) -> f32 {
    let n = ratings.len().saturating_sub(2);
    let mut sse = vec![0.0f32; n];
    for j in 1..indices.len().saturating_sub(1) {
        let predicted = (ratings[indices[j - 1]] + ratings[indices[j + 1]]) * 0.5;
        let actual = ratings[indices[j]];
        sse[j - 1] = (predicted - actual) * (predicted - actual);
    }
    vecmath::sum(&sse) / sse.len() as f32
}

fn index_sort(values: &[f32]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(coordinates: Vec<Vec<f32>>, ratings: Vec<f32>) -> UserData {
        let n = ratings.len();
        let movie_ids: Vec<u32> = (1..=n as u32).collect();
        let cluster_ids: Vec<u32> = (101..=(100 + n) as u32).collect();
        UserData::new(movie_ids, cluster_ids, ratings, coordinates).unwrap()
    }

    #[test]
    fn test_inverse_function_prefers_consistent_dimension() {
        // dimension 0 separates the two rating groups cleanly,
        // dimension 1 mixes them
        let data = user(
            vec![
                vec![0.0, 0.0],
                vec![0.1, 9.0],
                vec![5.0, 0.2],
                vec![5.1, 9.1],
            ],
            vec![1.0, 1.0, 4.0, 4.0],
        );
        let stats = analyse_inverse_function(&data);
        assert_eq!(stats.len(), 2);
        assert!(stats[0].explained_entropy > 0.9);
        assert!(stats[0].explained_entropy > stats[1].explained_entropy);
    }

    #[test]
    fn test_inverse_function_exact_scores() {
        // dim 0 buckets: {0,1} and {2,3}, each sse 0.5 -> model 1.0;
        // global mean 1.5 -> baseline 5.0
        let data = user(
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]],
            vec![2.0, 2.0, 3.5, 3.5],
        );
        let stats = analyse_inverse_function(&data);
        assert!((stats[0].model_entropy - 1.0).abs() < 1e-6);
        assert!((stats[0].baseline_entropy - 5.0).abs() < 1e-6);
        assert!((stats[0].explained_entropy - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_midpoint_fit_perfect_linear_dimension() {
        // ratings form an arithmetic progression in coordinate order, so
        // every midpoint prediction is exact and the model error is zero
        let data = user(
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
            vec![1.0, 1.5, 2.0, 2.5, 3.0],
        );
        let stats = analyse_midpoint_fit(&data);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].model_entropy, 0.0);
        assert_eq!(stats[0].explained_entropy, 1.0);
        assert!(stats[0].baseline_entropy > 0.0);
    }

    #[test]
    fn test_midpoint_fit_is_deterministic() {
        let build = || {
            user(
                vec![vec![0.3], vec![2.0], vec![1.1], vec![4.0], vec![2.5]],
                vec![1.0, 3.0, 2.0, 5.0, 3.5],
            )
        };
        let a = analyse_midpoint_fit(&build());
        let b = analyse_midpoint_fit(&build());
        assert_eq!(a[0].baseline_entropy, b[0].baseline_entropy);
        assert_eq!(a[0].model_entropy, b[0].model_entropy);
    }

    #[test]
    fn test_midpoint_fit_unordered_dimension_scores_low() {
        // same multiset of ratings, but the coordinate order shuffles them;
        // the model cannot beat the random baseline by much
        let data = user(
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]],
            vec![3.0, 0.5, 4.5, 1.0, 5.0, 0.5],
        );
        let stats = analyse_midpoint_fit(&data);
        assert!(stats[0].explained_entropy < 0.5);
    }

    #[test]
    fn test_analyser_dispatch_and_names() {
        let data = user(
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]],
            vec![2.0, 2.0, 3.5, 3.5],
        );
        assert_eq!(DimensionAnalyser::InverseFunction.name(), "inverse function");
        assert_eq!(DimensionAnalyser::MidpointFit.name(), "midpoint function");
        assert_eq!(DimensionAnalyser::InverseFunction.analyse(&data).len(), 1);
        assert_eq!(DimensionAnalyser::MidpointFit.analyse(&data).len(), 1);
    }
}
