//! Reshapes the global taste space around one user's preferences.

use crate::analysis::analyser::DimensionAnalyser;
use crate::analysis::vecmath;
use crate::model::distance::DistanceMatrix;
use crate::model::taste_space::TasteSpace;
use crate::model::user_data::UserData;
use tracing::info;

/// Builds a distance matrix personalized to one user.
///
/// ## Algorithm
/// 1. Score every dimension with the analyser and keep the `rank` best by
///    explained entropy (capped at the available dimensionality).
/// 2. Project both the global space and the user's own space onto those
///    dimensions.
/// 3. Rescale each selected global column by `sqrt(explained / local
///    variance)` - a pure linear rescale, no translation - so the user's
///    local variance in that dimension equals its explained-entropy score.
///    Dimensions the user cares about count for proportionally more in
///    Euclidean distance; uninformative ones are damped.
/// 4. Compute the distance table of the scaled, reduced coordinate set.
///
/// A dimension with zero local variance yields a non-finite scale factor
/// that propagates as non-finite distances; callers tolerate those.
pub fn scale_to_user(
    space: &TasteSpace,
    userdata: &UserData,
    rank: usize,
    analyser: DimensionAnalyser,
) -> DistanceMatrix {
    let mut stats = analyser.analyse(userdata);
    stats.sort_by(|a, b| b.explained_entropy.total_cmp(&a.explained_entropy));

    let rank = rank.min(stats.len());
    let dims: Vec<usize> = stats[..rank].iter().map(|s| s.dimension).collect();
    let explained: Vec<f32> = stats[..rank]
        .iter()
        .map(|s| s.explained_entropy as f32)
        .collect();
    info!(
        "user preference from analyser '{}': {}",
        analyser.name(),
        format_preference(&dims, &explained)
    );

    // only the dimensions relevant to the user remain
    let subspace = space.subspace(&dims);
    let local_space = userdata.space().subspace(&dims);

    let local_columns = vecmath::transpose(local_space.coordinates());
    let global_columns = vecmath::transpose(subspace.coordinates());
    let scaled_columns: Vec<Vec<f32>> = global_columns
        .iter()
        .enumerate()
        .map(|(i, column)| rescale(column, &local_columns[i], explained[i]))
        .collect();

    // a rank of zero still covers every cluster, at distance zero
    let scaled_rows = if scaled_columns.is_empty() {
        vec![Vec::new(); subspace.num_clusters()]
    } else {
        vecmath::transpose(&scaled_columns)
    };
    DistanceMatrix::compute(subspace.cluster_ids(), &scaled_rows)
}

/* Scale the global column so the local subset ends up with variance `scale` */
fn rescale(global: &[f32], local: &[f32], scale: f32) -> Vec<f32> {
    let variance = vecmath::variance(local);
    let a = (scale / variance).sqrt();
    vecmath::axpb(global, a, 0.0)
}

fn format_preference(dims: &[usize], explained: &[f32]) -> String {
    let parts: Vec<String> = dims
        .iter()
        .zip(explained)
        .map(|(d, e)| format!("D{}: {:.1}%", d, e * 100.0))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
