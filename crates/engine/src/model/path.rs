//! The result of a path search.

use crate::model::movie::{ClusterId, Movie};
use serde::Serialize;
use std::fmt;

/// A chain of clusters connecting two movies, with up to four
/// representative movies per cluster for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct MoviePath {
    pub start: Movie,
    pub target: Movie,
    /// Representatives of each cluster on the path, best-rated first
    pub clusters: Vec<Vec<Movie>>,
    pub cluster_ids: Vec<ClusterId>,
    /// Total distance walked, summed over the hops
    pub distance: f64,
}

impl fmt::Display for MoviePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Clusters: {:?}, Distance: {:.3}",
            self.cluster_ids, self.distance
        )?;
        for cluster in &self.clusters {
            writeln!(f, "[")?;
            for movie in cluster {
                writeln!(f, "  {}", movie.title)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
