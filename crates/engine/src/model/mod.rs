//! Core domain types for the taste-space engine.

pub mod dimension;
pub mod distance;
pub mod movie;
pub mod path;
pub mod prediction;
pub mod taste_space;
pub mod user_data;

pub use dimension::DimensionStat;
pub use distance::DistanceMatrix;
pub use movie::{ClusterId, Movie, MovieId};
pub use path::MoviePath;
pub use prediction::{Component, Prediction};
pub use taste_space::TasteSpace;
pub use user_data::UserData;
