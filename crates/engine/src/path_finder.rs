//! Path finding, rating prediction and recommendation assembly.
//!
//! The [`PathFinder`] owns the catalog, the global taste space and one
//! default user profile whose personalized distance matrix is computed at
//! construction. Every operation optionally takes a request-scoped profile;
//! supplying one triggers a fresh personalization for that request only and
//! never touches the shared state.

use crate::analysis::analyser::DimensionAnalyser;
use crate::config::SearchConfig;
use crate::error::{EngineError, Result};
use crate::lookup::MovieLookup;
use crate::model::distance::DistanceMatrix;
use crate::model::movie::{ClusterId, Movie, MovieId};
use crate::model::path::MoviePath;
use crate::model::prediction::{Component, Prediction};
use crate::model::taste_space::TasteSpace;
use crate::model::user_data::UserData;
use crate::taste_ops;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Representatives shown per cluster on a path
const CLUSTER_SAMPLE: usize = 4;

/// Converts a neighbor's distance into a prediction weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKernel {
    /// `1/d`, capped at 20 for near-zero distances
    InverseProportional,
    /// `exp(-d^2 / 2)`
    Gaussian,
}

impl PredictionKernel {
    pub fn weight(self, distance: f64) -> f64 {
        match self {
            PredictionKernel::InverseProportional => {
                if distance > 0.05 {
                    1.0 / distance
                } else {
                    20.0
                }
            }
            PredictionKernel::Gaussian => (-distance * distance / 2.0).exp(),
        }
    }
}

/// The search and prediction engine over one taste space.
pub struct PathFinder {
    lookup: Arc<MovieLookup>,
    space: Arc<TasteSpace>,
    default_user: UserData,
    default_distances: DistanceMatrix,
    analyser: DimensionAnalyser,
    config: SearchConfig,
}

/// Per-request view of (user data, personalized distances). Borrows the
/// defaults, or owns a request-scoped pair.
enum RequestScope<'a> {
    Default(&'a UserData, &'a DistanceMatrix),
    Custom(UserData, DistanceMatrix),
}

impl RequestScope<'_> {
    fn user(&self) -> &UserData {
        match self {
            RequestScope::Default(user, _) => user,
            RequestScope::Custom(user, _) => user,
        }
    }

    fn distances(&self) -> &DistanceMatrix {
        match self {
            RequestScope::Default(_, distances) => distances,
            RequestScope::Custom(_, distances) => distances,
        }
    }
}

impl PathFinder {
    /// Builds the engine and precomputes the default user's personalized
    /// distance matrix.
    pub fn new(
        lookup: Arc<MovieLookup>,
        space: Arc<TasteSpace>,
        default_user: UserData,
        analyser: DimensionAnalyser,
        config: SearchConfig,
    ) -> Self {
        let default_distances = taste_ops::scale_to_user(
            &space,
            &default_user,
            config.user_dimensions,
            analyser,
        );
        Self {
            lookup,
            space,
            default_user,
            default_distances,
            analyser,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Finds a short, low-distance chain of clusters from a start movie to
    /// the target. Without an explicit start, the nearest suitably-rated
    /// movie from the user's profile is used.
    #[instrument(skip(self, user), fields(target = target_id))]
    pub fn find(
        &self,
        start_id: Option<MovieId>,
        target_id: MovieId,
        user: Option<UserData>,
    ) -> Result<MoviePath> {
        let scope = self.scope(user);
        let target = self
            .lookup
            .movie(target_id)
            .ok_or(EngineError::UnknownMovie(target_id))?
            .clone();
        let start = match start_id {
            Some(id) => self
                .lookup
                .movie(id)
                .ok_or(EngineError::UnknownMovie(id))?
                .clone(),
            None => self.nearest_suitable(target_id, &scope)?,
        };

        let started = Instant::now();
        let distances = scope.distances();
        let index1 = distances.cluster_index(start.cluster_id)?;
        let index2 = distances.cluster_index(target.cluster_id)?;

        let path = find_path(distances, index1, index2, self.config.max_jumps);
        let path = match path {
            Some(p) if !p.distance.is_infinite() => p,
            _ => {
                warn!(
                    "no suitable path found between {} (C{}) and {} (C{}) with {} or fewer jumps",
                    start.title,
                    start.cluster_id,
                    target.title,
                    target.cluster_id,
                    self.config.max_jumps
                );
                return Err(EngineError::NoPathFound {
                    start: start.cluster_id,
                    target: target.cluster_id,
                    max_jumps: self.config.max_jumps,
                });
            }
        };

        let mut clusters = Vec::with_capacity(path.cluster_indexes.len());
        let mut cluster_ids = Vec::with_capacity(path.cluster_indexes.len());
        for &index in &path.cluster_indexes {
            let cluster_id = distances.cluster_id(index);
            let movies: Vec<Movie> = self
                .lookup
                .cluster(cluster_id)
                .into_iter()
                .take(CLUSTER_SAMPLE)
                .cloned()
                .collect();
            clusters.push(movies);
            cluster_ids.push(cluster_id);
        }

        info!(
            "path found between {} (C{}) and {} (C{}) in {:?}",
            start.title,
            start.cluster_id,
            target.title,
            target.cluster_id,
            started.elapsed()
        );
        Ok(MoviePath {
            start,
            target,
            clusters,
            cluster_ids,
            distance: path.distance,
        })
    }

    /// Predicts the user's rating for a movie by distance-weighted
    /// nearest-neighbor regression over the rated profile.
    #[instrument(skip(self, user), fields(movie = movie_id))]
    pub fn predict(
        &self,
        movie_id: MovieId,
        kernel: PredictionKernel,
        user: Option<UserData>,
    ) -> Result<Prediction> {
        let scope = self.scope(user);
        self.predict_scoped(movie_id, kernel, &scope)
    }

    /// Assembles k recommendations around a movie, balancing "likely to be
    /// loved" against "different from what is already known".
    ///
    /// ## Algorithm
    /// The 2k nearest clusters are ranked twice: by predicted rating
    /// (descending) and by distance from the query (descending, favoring
    /// the unfamiliar). Selection alternates between the rankings, skipping
    /// clusters already chosen, with the rating ranking going first so it
    /// wins ties.
    #[instrument(skip(self, user), fields(movie = movie_id))]
    pub fn find_recommended(
        &self,
        movie_id: MovieId,
        user: Option<UserData>,
    ) -> Result<Vec<Prediction>> {
        let scope = self.scope(user);
        let movie = self
            .lookup
            .movie(movie_id)
            .ok_or(EngineError::UnknownMovie(movie_id))?;
        let distances = scope.distances();
        let query = distances.cluster_index(movie.cluster_id)?;
        let k = self.config.k_nearest;

        let candidates = k_smallest(
            (0..distances.num_clusters())
                .filter(|&index| index != query)
                .map(|index| Neighbor {
                    distance: distances.distance(query, index) as f64,
                    point: index,
                }),
            k * 2,
        );

        // a local matrix over candidates + query keeps the relative
        // ordering independent of the rest of the space
        let mut local_ids: Vec<ClusterId> = Vec::with_capacity(candidates.len() + 1);
        local_ids.push(movie.cluster_id);
        local_ids.extend(candidates.iter().map(|nb| distances.cluster_id(nb.point)));
        let local = distances.restrict(&local_ids)?;

        struct Ranked {
            cluster_id: ClusterId,
            prediction: Prediction,
            distance: f64,
        }
        let mut ranked: Vec<Ranked> = Vec::with_capacity(candidates.len());
        for neighbor in &candidates {
            let cluster_id = distances.cluster_id(neighbor.point);
            let members = self.lookup.cluster(cluster_id);
            let Some(representative) = members.first() else {
                debug!(cluster = cluster_id, "cluster has no catalog movies, skipping");
                continue;
            };
            let prediction =
                self.predict_scoped(representative.id, PredictionKernel::InverseProportional, &scope)?;
            let distance = local.distance_by_id(movie.cluster_id, cluster_id)? as f64;
            ranked.push(Ranked {
                cluster_id,
                prediction,
                distance,
            });
        }

        let mut by_rating: Vec<usize> = (0..ranked.len()).collect();
        by_rating.sort_by(|&a, &b| {
            ranked[b]
                .prediction
                .predicted_rating
                .total_cmp(&ranked[a].prediction.predicted_rating)
        });
        let mut by_distance: Vec<usize> = (0..ranked.len()).collect();
        by_distance.sort_by(|&a, &b| ranked[b].distance.total_cmp(&ranked[a].distance));

        let mut chosen: Vec<usize> = Vec::with_capacity(k);
        let mut seen: HashSet<ClusterId> = HashSet::with_capacity(k);
        let (mut ia, mut ib) = (0, 0);
        while chosen.len() < k && (ia < by_rating.len() || ib < by_distance.len()) {
            while ia < by_rating.len() && seen.contains(&ranked[by_rating[ia]].cluster_id) {
                ia += 1;
            }
            if ia < by_rating.len() {
                seen.insert(ranked[by_rating[ia]].cluster_id);
                chosen.push(by_rating[ia]);
                ia += 1;
            }
            if chosen.len() >= k {
                break;
            }
            while ib < by_distance.len() && seen.contains(&ranked[by_distance[ib]].cluster_id) {
                ib += 1;
            }
            if ib < by_distance.len() {
                seen.insert(ranked[by_distance[ib]].cluster_id);
                chosen.push(by_distance[ib]);
                ib += 1;
            }
        }

        Ok(chosen
            .into_iter()
            .map(|i| ranked[i].prediction.clone())
            .collect())
    }

    fn predict_scoped(
        &self,
        movie_id: MovieId,
        kernel: PredictionKernel,
        scope: &RequestScope<'_>,
    ) -> Result<Prediction> {
        let movie = self
            .lookup
            .movie(movie_id)
            .ok_or(EngineError::UnknownMovie(movie_id))?;
        let user = scope.user();
        let distances = scope.distances();

        let neighbors = k_smallest(
            (0..user.num_points()).filter_map(|point| {
                let d = distances
                    .distance_by_id(movie.cluster_id, user.cluster_ids()[point])
                    .ok()?;
                Some(Neighbor {
                    distance: d as f64,
                    point,
                })
            }),
            self.config.k_nearest,
        );

        let weights: Vec<f64> = neighbors
            .iter()
            .map(|nb| kernel.weight(nb.distance))
            .collect();
        let weight_sum: f64 = weights.iter().sum();
        if !(weight_sum > 0.0 && weight_sum.is_finite()) {
            return Err(EngineError::DegeneratePrediction(movie_id));
        }

        let mut predicted = 0.0f64;
        let mut components = Vec::with_capacity(neighbors.len());
        for (neighbor, weight) in neighbors.iter().zip(&weights) {
            let proportion = weight / weight_sum;
            let rating = user.ratings()[neighbor.point];
            predicted += proportion * rating as f64;
            let neighbor_id = user.movie_ids()[neighbor.point];
            let title = self
                .lookup
                .movie(neighbor_id)
                .map(|m| m.title.clone())
                .unwrap_or_default();
            components.push(Component {
                movie_id: neighbor_id,
                title,
                rating,
                distance: neighbor.distance,
                proportion,
            });
        }

        // expand around the user's mean: bold predictions age better than
        // timid ones on a half-point scale
        let mean = user.mean_rating() as f64;
        let expanded = (predicted - mean) * self.config.expansion_factor as f64 + mean;
        Ok(Prediction {
            movie: movie.clone(),
            predicted_rating: expanded.clamp(0.0, 5.0) as f32,
            components,
        })
    }

    /// Finds the rated movie nearest the target, outside the target's own
    /// cluster, with a rating of at least the configured threshold. If no
    /// movie passes the threshold the scan repeats unconstrained; an empty
    /// profile is a fatal `NoSuitableStart`.
    fn nearest_suitable(&self, target_id: MovieId, scope: &RequestScope<'_>) -> Result<Movie> {
        let target_cluster = self
            .lookup
            .cluster_id(target_id)
            .ok_or(EngineError::UnknownMovie(target_id))?;
        let user = scope.user();
        let distances = scope.distances();

        let hit = nearest_constrained(
            user,
            distances,
            target_cluster,
            self.config.suitable_rating as f64,
        )
        .or_else(|| nearest_constrained(user, distances, target_cluster, f64::NEG_INFINITY));

        match hit {
            Some(found) => {
                let movie = self
                    .lookup
                    .movie(found.movie_id)
                    .ok_or(EngineError::UnknownMovie(found.movie_id))?;
                info!(
                    "optimal starting point is {} (C{}), rating: {:.1}, distance: {:.3}",
                    movie.title, movie.cluster_id, found.rating, found.distance
                );
                Ok(movie.clone())
            }
            None => Err(EngineError::NoSuitableStart),
        }
    }

    fn scope(&self, user: Option<UserData>) -> RequestScope<'_> {
        match user {
            Some(custom) => {
                let distances = taste_ops::scale_to_user(
                    &self.space,
                    &custom,
                    self.config.user_dimensions,
                    self.analyser,
                );
                RequestScope::Custom(custom, distances)
            }
            None => RequestScope::Default(&self.default_user, &self.default_distances),
        }
    }
}

struct StartCandidate {
    movie_id: MovieId,
    rating: f64,
    distance: f64,
}

/* The rating of each accepted candidate raises the bar for later ones */
fn nearest_constrained(
    user: &UserData,
    distances: &DistanceMatrix,
    target_cluster: ClusterId,
    min_rating: f64,
) -> Option<StartCandidate> {
    let mut found: Option<StartCandidate> = None;
    let mut rating = min_rating;
    let mut distance = f64::INFINITY;
    for point in 0..user.num_points() {
        let r = user.ratings()[point] as f64;
        if r >= rating {
            let cluster_id = user.cluster_ids()[point];
            if cluster_id != target_cluster {
                let Ok(d) = distances.distance_by_id(cluster_id, target_cluster) else {
                    continue;
                };
                let d = d as f64;
                if d < distance {
                    distance = d;
                    rating = r;
                    found = Some(StartCandidate {
                        movie_id: user.movie_ids()[point],
                        rating: r,
                        distance: d,
                    });
                }
            }
        }
    }
    found
}

/// An ordered cluster-index sequence with its total distance.
#[derive(Debug, Clone)]
pub(crate) struct ClusterPath {
    pub(crate) cluster_indexes: Vec<usize>,
    pub(crate) distance: f64,
}

/// Iterative-deepening search between two cluster indices.
///
/// ## Algorithm
/// Starting at the full hop budget, each attempt caps every hop at
/// `direct / jumps * 1.5` - 15% slack over the even per-hop share - and
/// retries with one hop less until a finite-distance path appears. The
/// returned sequence includes the start cluster. `None` means no attempt
/// produced any path; an infinite-distance result is possible and it is the
/// caller's job to reject it.
pub(crate) fn find_path(
    distances: &DistanceMatrix,
    index1: usize,
    index2: usize,
    max_jumps: u32,
) -> Option<ClusterPath> {
    let direct = distances.distance(index1, index2) as f64;
    let mut jumps = max_jumps;
    let mut path: Option<ClusterPath> = None;
    while path.as_ref().is_none_or(|p| p.distance.is_infinite()) && jumps > 0 {
        let max_dist = direct / jumps as f64 * 1.5;
        path = find_path_recursive(distances, index1, index2, jumps, max_dist);
        jumps -= 1;
    }
    let path = path?;
    let mut complete = Vec::with_capacity(path.cluster_indexes.len() + 1);
    complete.push(index1);
    complete.extend(path.cluster_indexes);
    Some(ClusterPath {
        cluster_indexes: complete,
        distance: path.distance,
    })
}

/// Bounded branch-and-bound: every cluster whose edge from the source fits
/// under the cap is branched into, keeping the cheapest continuation.
/// Exhaustive in breadth, bounded in depth, deliberately unmemoized -
/// repeated subproblems are recomputed. Acceptable for cluster counts in
/// the low thousands with hop budgets of at most 5; this is the hotspot if
/// either grows.
fn find_path_recursive(
    distances: &DistanceMatrix,
    index1: usize,
    index2: usize,
    remaining: u32,
    max_dist: f64,
) -> Option<ClusterPath> {
    if remaining == 0 && index1 == index2 {
        return Some(ClusterPath {
            cluster_indexes: Vec::new(),
            distance: 0.0,
        });
    }
    if remaining == 1 {
        let distance = distances.distance(index1, index2) as f64;
        if distance > max_dist {
            return None;
        }
        return Some(ClusterPath {
            cluster_indexes: vec![index2],
            distance,
        });
    }
    if remaining == 0 {
        return None;
    }

    let mut best = f64::INFINITY;
    let mut path0: Vec<usize> = Vec::new();
    for index in 0..distances.num_clusters() {
        if index == index1 || index == index2 {
            continue;
        }
        let d = distances.distance(index1, index) as f64;
        if d < max_dist {
            if let Some(next) = find_path_recursive(distances, index, index2, remaining - 1, max_dist)
            {
                let total = d + next.distance;
                if total < best {
                    let mut extended = Vec::with_capacity(next.cluster_indexes.len() + 1);
                    extended.push(index);
                    extended.extend(next.cluster_indexes);
                    path0 = extended;
                    best = total;
                }
            }
        }
    }
    Some(ClusterPath {
        cluster_indexes: path0,
        distance: best,
    })
}

#[derive(Debug, Clone, Copy)]
struct Neighbor {
    distance: f64,
    point: usize,
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.point.cmp(&other.point))
    }
}

/// Keeps the k smallest items of a stream with a bounded max-heap:
/// O(n log k) instead of a full sort. Returns them nearest-first.
fn k_smallest(items: impl Iterator<Item = Neighbor>, k: usize) -> Vec<Neighbor> {
    let mut heap: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k + 1);
    for item in items {
        if heap.len() < k {
            heap.push(item);
        } else if let Some(top) = heap.peek() {
            if item.distance < top.distance {
                heap.pop();
                heap.push(item);
            }
        }
    }
    heap.into_sorted_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_matrix(positions: &[f32]) -> DistanceMatrix {
        let ids: Vec<ClusterId> = (1..=positions.len() as u32).collect();
        let coords: Vec<Vec<f32>> = positions.iter().map(|&p| vec![p]).collect();
        DistanceMatrix::compute(&ids, &coords)
    }

    #[test]
    fn test_direct_neighbors_resolve_in_one_hop() {
        // the only other cluster is far away, so deepening falls through to
        // the single direct hop at the exact direct distance
        let m = line_matrix(&[0.0, 0.39, 100.0]);
        let path = find_path(&m, 0, 1, 5).unwrap();
        assert_eq!(path.cluster_indexes, vec![0, 1]);
        assert!((path.distance - 0.39).abs() < 1e-4);
    }

    #[test]
    fn test_three_hop_chain() {
        // A(0) M1(1) M2(2) B(3): budgets 5 and 4 cannot stretch, budget 3
        // walks the chain
        let m = line_matrix(&[0.0, 1.0, 2.0, 3.0]);
        let path = find_path(&m, 0, 3, 5).unwrap();
        assert_eq!(path.cluster_indexes, vec![0, 1, 2, 3]);
        assert!((path.distance - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_deepening_is_monotone() {
        // any budget at least as high as the needed one still finds the chain
        let m = line_matrix(&[0.0, 1.0, 2.0, 3.0]);
        for budget in 3..=8 {
            let path = find_path(&m, 0, 3, budget).unwrap();
            assert!(
                !path.distance.is_infinite(),
                "budget {budget} must find the known 3-hop path"
            );
            assert!((path.distance - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_shortcut_is_preferred_over_detour() {
        // two 2-hop chains exist; the cheaper intermediate must win
        let m = DistanceMatrix::compute(
            &[1, 2, 3, 4],
            &[
                vec![0.0, 0.0],
                vec![1.0, 0.4],   // dogleg
                vec![1.0, 0.0],   // straight midpoint
                vec![2.0, 0.0],
            ],
        );
        let path = find_path(&m, 0, 3, 2).unwrap();
        assert_eq!(path.cluster_indexes, vec![0, 2, 3]);
        assert!((path.distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_unreachable_target_reports_no_path() {
        // the separation overflows f32, leaving an infinite edge that no
        // budget can close
        let far = 3.0e38f32;
        let m = DistanceMatrix::compute(&[1, 2], &[vec![-far, -far], vec![far, far]]);
        assert!(m.distance(0, 1).is_infinite());
        let path = find_path(&m, 0, 1, 5).unwrap();
        assert!(path.distance.is_infinite());
    }

    #[test]
    fn test_kernels() {
        let inverse = PredictionKernel::InverseProportional;
        assert!((inverse.weight(2.0) - 0.5).abs() < 1e-12);
        assert_eq!(inverse.weight(0.05), 20.0);
        assert_eq!(inverse.weight(0.0), 20.0);

        let gaussian = PredictionKernel::Gaussian;
        assert_eq!(gaussian.weight(0.0), 1.0);
        assert!((gaussian.weight(1.0) - (-0.5f64).exp()).abs() < 1e-12);
        assert!(gaussian.weight(10.0) < 1e-20);
    }

    #[test]
    fn test_k_smallest_keeps_nearest() {
        let items = [5.0, 1.0, 3.0, 0.5, 4.0, 2.0]
            .iter()
            .enumerate()
            .map(|(point, &distance)| Neighbor { distance, point });
        let kept = k_smallest(items, 3);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].distance, 0.5);
        assert_eq!(kept[1].distance, 1.0);
        assert_eq!(kept[2].distance, 2.0);
    }

    #[test]
    fn test_k_smallest_short_stream() {
        let items = [2.0, 1.0]
            .iter()
            .enumerate()
            .map(|(point, &distance)| Neighbor { distance, point });
        let kept = k_smallest(items, 10);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].distance, 1.0);
    }
}
