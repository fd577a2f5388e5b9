//! Error types for the engine crate.

use crate::model::{ClusterId, MovieId};
use thiserror::Error;

/// Errors raised by the engine.
///
/// The variants split into three classes: unknown identifiers
/// (`UnknownMovie`, `UnknownCluster`) reject a query outright; unsatisfiable
/// queries (`NoPathFound`, `NoSuitableStart`, `DegeneratePrediction`) are
/// expected, user-visible outcomes and must never be collapsed into a
/// default value; `LengthMismatch` is a construction invariant violation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A query referenced a movie id that is not in the catalog
    #[error("unknown movie id {0}")]
    UnknownMovie(MovieId),

    /// A cluster id with no coordinate in the taste space
    #[error("unknown cluster id {0}")]
    UnknownCluster(ClusterId),

    /// The user profile contains no rated movie usable as a path start
    #[error("no rated movie in the user profile can serve as a starting point")]
    NoSuitableStart,

    /// Every hop budget down to 1 was exhausted without a finite-distance path
    #[error("no path found between clusters {start} and {target} with {max_jumps} or fewer jumps")]
    NoPathFound {
        start: ClusterId,
        target: ClusterId,
        max_jumps: u32,
    },

    /// All neighbor weights summed to zero; there is nothing to predict from
    #[error("prediction weights for movie {0} do not sum to a usable total")]
    DegeneratePrediction(MovieId),

    /// Parallel arrays handed to a constructor disagree on length
    #[error("array {name} has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        actual: usize,
        expected: usize,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
