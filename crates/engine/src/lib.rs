//! # Engine Crate
//!
//! The taste-space recommendation engine. Everything in here operates on a
//! precomputed low-dimensional embedding in which each point stands for a
//! cluster of similar movies.
//!
//! ## Main Components
//!
//! - **model**: Core domain types (TasteSpace, DistanceMatrix, UserData, Movie)
//! - **lookup**: The movie catalog with title search
//! - **analysis**: Dimension-importance analysers and the vector math under them
//! - **taste_ops**: Builds a user-personalized distance matrix
//! - **path_finder**: Path search, rating prediction and recommendation assembly
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{DimensionAnalyser, PathFinder, PredictionKernel, SearchConfig};
//! use std::sync::Arc;
//!
//! let finder = PathFinder::new(
//!     Arc::new(lookup),
//!     Arc::new(space),
//!     default_user,
//!     DimensionAnalyser::MidpointFit,
//!     SearchConfig::default(),
//! );
//!
//! let path = finder.find(None, 4973, None)?;
//! let prediction = finder.predict(4973, PredictionKernel::InverseProportional, None)?;
//! ```
//!
//! The engine does no I/O. All data is built once, treated as read-only
//! afterwards and safe to share between request handlers without locking.
//! Request-scoped user profiles produce independent, short-lived state.

pub mod analysis;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod path_finder;
pub mod taste_ops;

// Re-export commonly used types for convenience
pub use analysis::analyser::DimensionAnalyser;
pub use config::SearchConfig;
pub use error::{EngineError, Result};
pub use lookup::MovieLookup;
pub use model::{
    ClusterId, Component, DimensionStat, DistanceMatrix, Movie, MovieId, MoviePath, Prediction,
    TasteSpace, UserData,
};
pub use path_finder::{PathFinder, PredictionKernel};
