//! Search and prediction tuning knobs.
//!
//! All thresholds live in one struct that is handed to [`PathFinder`]
//! explicitly, so tests can sweep parameters without touching globals.
//!
//! [`PathFinder`]: crate::path_finder::PathFinder

/// Configuration for path search, prediction and recommendation assembly.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Minimum user rating for an auto-picked start movie
    pub suitable_rating: f32,

    /// Maximum number of hops tried by the path search
    pub max_jumps: u32,

    /// Number of taste dimensions kept when personalizing the metric
    pub user_dimensions: usize,

    /// Neighbor count for rating prediction
    pub k_nearest: usize,

    /// Mean-reversion expansion applied to predicted ratings
    pub expansion_factor: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            suitable_rating: 4.5,
            max_jumps: 5,
            user_dimensions: 7,
            k_nearest: 10,
            expansion_factor: 1.15,
        }
    }
}

impl SearchConfig {
    /// Configure the number of personalized taste dimensions
    pub fn with_user_dimensions(mut self, dimensions: usize) -> Self {
        self.user_dimensions = dimensions;
        self
    }

    /// Configure the hop budget for path search
    pub fn with_max_jumps(mut self, max_jumps: u32) -> Self {
        self.max_jumps = max_jumps;
        self
    }

    /// Configure the neighbor count used for prediction
    pub fn with_k_nearest(mut self, k: usize) -> Self {
        self.k_nearest = k;
        self
    }
}
