//! A user's rated movies and the taste space they induce.

use crate::analysis::vecmath;
use crate::error::{EngineError, Result};
use crate::model::movie::{ClusterId, MovieId};
use crate::model::taste_space::TasteSpace;

/// Parallel arrays of a user's ratings plus the coordinates of each rated
/// movie's cluster. One entry per rated movie: several movies sharing a
/// cluster are kept as separate points, not collapsed.
#[derive(Debug, Clone)]
pub struct UserData {
    movie_ids: Vec<MovieId>,
    cluster_ids: Vec<ClusterId>,
    ratings: Vec<f32>,
    space: TasteSpace,
}

impl UserData {
    /// Builds user data from parallel arrays. All three arrays and the
    /// coordinate set must agree on length.
    pub fn new(
        movie_ids: Vec<MovieId>,
        cluster_ids: Vec<ClusterId>,
        ratings: Vec<f32>,
        coordinates: Vec<Vec<f32>>,
    ) -> Result<Self> {
        let n = movie_ids.len();
        validate_length("cluster_ids", cluster_ids.len(), n)?;
        validate_length("ratings", ratings.len(), n)?;
        validate_length("coordinates", coordinates.len(), n)?;
        let space = TasteSpace::new(cluster_ids.clone(), coordinates);
        Ok(Self {
            movie_ids,
            cluster_ids,
            ratings,
            space,
        })
    }

    pub fn num_points(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    pub fn cluster_ids(&self) -> &[ClusterId] {
        &self.cluster_ids
    }

    pub fn ratings(&self) -> &[f32] {
        &self.ratings
    }

    pub fn space(&self) -> &TasteSpace {
        &self.space
    }

    pub fn dimensions(&self) -> usize {
        self.space.dimensions()
    }

    pub fn contains_cluster(&self, cluster_id: ClusterId) -> bool {
        self.cluster_ids.contains(&cluster_id)
    }

    /// The rating the user gave a movie, if any
    pub fn rating(&self, movie_id: MovieId) -> Option<f32> {
        self.movie_ids
            .iter()
            .position(|&id| id == movie_id)
            .map(|i| self.ratings[i])
    }

    /// The user's mean rating over all rated movies
    pub fn mean_rating(&self) -> f32 {
        vecmath::sum(&self.ratings) / self.ratings.len() as f32
    }

    /// Partitions the data into 10 buckets, one per half-point rating value
    /// 0.5, 1.0, ..., 5.0. Each bucket is an independent read-only copy.
    pub fn group_by_rating(&self) -> Vec<UserData> {
        (1..=10)
            .map(|i| {
                let r = i as f32 * 0.5;
                let selected: Vec<usize> = (0..self.num_points())
                    .filter(|&j| self.ratings[j] == r)
                    .collect();
                let cluster_ids: Vec<ClusterId> =
                    selected.iter().map(|&j| self.cluster_ids[j]).collect();
                let coordinates = selected
                    .iter()
                    .map(|&j| {
                        // index lookup rather than row j: the induced space
                        // maps duplicate cluster ids onto one row
                        let index = self
                            .space
                            .cluster_index(self.cluster_ids[j])
                            .expect("bucket cluster is part of the induced space");
                        self.space.coordinate(index).to_vec()
                    })
                    .collect();
                UserData {
                    movie_ids: selected.iter().map(|&j| self.movie_ids[j]).collect(),
                    ratings: selected.iter().map(|&j| self.ratings[j]).collect(),
                    space: TasteSpace::new(cluster_ids.clone(), coordinates),
                    cluster_ids,
                }
            })
            .collect()
    }
}

fn validate_length(name: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(EngineError::LengthMismatch {
            name,
            actual,
            expected,
        });
    }
    Ok(())
}
