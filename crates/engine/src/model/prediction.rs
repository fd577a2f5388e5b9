//! The result of a rating prediction.

use crate::model::movie::{Movie, MovieId};
use serde::Serialize;
use std::fmt;

/// A predicted rating plus the neighbors that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub movie: Movie,
    pub predicted_rating: f32,
    /// The contributing neighbors, nearest first
    pub components: Vec<Component>,
}

/// One rated neighbor's contribution to a prediction.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub movie_id: MovieId,
    pub title: String,
    pub rating: f32,
    pub distance: f64,
    /// Normalized kernel weight; proportions sum to one
    pub proportion: f64,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prediction{{movie={}, predictedRating={}}}",
            self.movie, self.predicted_rating
        )
    }
}
