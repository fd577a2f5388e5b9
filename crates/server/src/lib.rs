//! Server crate for the reelpath recommender.
//!
//! Holds the service facade that loads all core datasets once and answers
//! path, prediction, recommendation and search requests against them.

pub mod service;

pub use service::{RecommenderService, ServiceConfig};
