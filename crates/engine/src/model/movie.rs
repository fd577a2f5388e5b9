//! The movie catalog record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Unique identifier for a cluster of similar movies
pub type ClusterId = u32;

/// A single catalog entry. Created once at catalog load, read-only
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// The taste-space cluster this movie belongs to
    pub cluster_id: ClusterId,
    pub title: String,
    pub genres: Vec<String>,
    /// Public aggregate rating; absent when the source has no votes
    pub rating: Option<f32>,
    pub votes: Option<u32>,
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, movieId: {}, clusterId: {}",
            self.title, self.id, self.cluster_id
        )
    }
}
