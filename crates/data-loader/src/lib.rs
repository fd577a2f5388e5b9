//! # Data Loader Crate
//!
//! Reads the three input files of the recommender and turns them into the
//! engine's model types:
//!
//! - **movie map**: the catalog, `movieId,clusterId,title,genres,rating,votes`
//! - **taste space**: the embedding, `clusterId,d1,...,dk`
//! - **user ratings**: a ratings export whose first column is the movie id
//!   and whose fourth column is the rating
//!
//! All readers are gzip-transparent: paths ending in `.gz` are decompressed
//! on the fly. Parsing problems surface as [`DataLoadError`] with the
//! offending file and line; whether that is fatal is the caller's decision
//! (core datasets at startup: yes, per-request profile overrides: no).

pub mod error;
pub mod parser;

// Re-export commonly used items for convenience
pub use error::{DataLoadError, Result};
pub use parser::{
    read_movie_map, read_movie_map_from, read_taste_space, read_taste_space_from,
    read_user_data, read_user_data_from, read_user_ratings, read_user_ratings_from,
};
