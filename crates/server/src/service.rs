//! # Recommender Service
//!
//! The orchestration facade over the engine:
//! 1. Load the catalog, the taste space and the default user profile
//! 2. Build the path finder with its personalized default metric
//! 3. Answer requests, resolving an optional per-request profile override
//!
//! Loading failures of the core datasets are fatal at init. A malformed
//! per-request override is not: it logs a warning and the request proceeds
//! on the default profile. All loaded state is read-only afterwards, so one
//! service value can be shared across threads behind an `Arc` without
//! locking; request-scoped overrides live and die inside a single call.

use anyhow::{Context, Result};
use data_loader as loader;
use engine::{
    DimensionAnalyser, MovieLookup, MoviePath, PathFinder, Prediction, PredictionKernel,
    SearchConfig, TasteSpace, UserData,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const MAX_SEARCH_RESULTS: usize = 10;

/// Where the core datasets live and how the engine is tuned.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub movie_map: PathBuf,
    pub taste_space: PathBuf,
    pub default_user: PathBuf,
    pub search: SearchConfig,
    pub analyser: DimensionAnalyser,
}

impl ServiceConfig {
    pub fn new(movie_map: PathBuf, taste_space: PathBuf, default_user: PathBuf) -> Self {
        Self {
            movie_map,
            taste_space,
            default_user,
            search: SearchConfig::default(),
            analyser: DimensionAnalyser::MidpointFit,
        }
    }
}

/// The initialized service: catalog + taste space + default profile,
/// wired into a [`PathFinder`].
pub struct RecommenderService {
    lookup: Arc<MovieLookup>,
    space: Arc<TasteSpace>,
    finder: PathFinder,
}

impl RecommenderService {
    /// Eagerly loads every core dataset and precomputes the default
    /// personalization. Any failure here means the service cannot answer
    /// anything and is reported as fatal.
    pub fn init(config: &ServiceConfig) -> Result<Self> {
        let start = Instant::now();
        let lookup = Arc::new(
            loader::read_movie_map(&config.movie_map)
                .with_context(|| format!("could not read movie map at '{}'", config.movie_map.display()))?,
        );
        let space = Arc::new(
            loader::read_taste_space(&config.taste_space)
                .with_context(|| format!("could not read taste space at '{}'", config.taste_space.display()))?,
        );
        let default_user = loader::read_user_data(&config.default_user, &lookup, &space)
            .with_context(|| {
                format!(
                    "could not read default user ratings at '{}'",
                    config.default_user.display()
                )
            })?;
        let finder = PathFinder::new(
            lookup.clone(),
            space.clone(),
            default_user,
            config.analyser,
            config.search,
        );
        info!("service initialized in {:?}", start.elapsed());
        Ok(Self {
            lookup,
            space,
            finder,
        })
    }

    /// Finds a path from a start movie (or the nearest suitable rated
    /// movie) to the target.
    pub fn find_path(
        &self,
        start: Option<engine::MovieId>,
        target: engine::MovieId,
        user_file: Option<&Path>,
    ) -> engine::Result<MoviePath> {
        self.finder.find(start, target, self.user_override(user_file))
    }

    /// Predicts the rating the profile's owner would give a movie.
    pub fn predict(
        &self,
        movie_id: engine::MovieId,
        kernel: PredictionKernel,
        user_file: Option<&Path>,
    ) -> engine::Result<Prediction> {
        self.finder
            .predict(movie_id, kernel, self.user_override(user_file))
    }

    /// Assembles recommendations around a movie.
    pub fn recommend(
        &self,
        movie_id: engine::MovieId,
        user_file: Option<&Path>,
    ) -> engine::Result<Vec<Prediction>> {
        self.finder
            .find_recommended(movie_id, self.user_override(user_file))
    }

    /// Title search, formatted for display and truncated.
    pub fn search(&self, term: &str) -> Vec<String> {
        let result = self.lookup.search(term);
        let mut output: Vec<String> = result
            .iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|m| format!("{}: ID={}", m.title, m.id))
            .collect();
        if result.len() > MAX_SEARCH_RESULTS {
            output.push("[...] truncated".to_string());
        }
        output
    }

    pub fn lookup(&self) -> &MovieLookup {
        &self.lookup
    }

    pub fn space(&self) -> &TasteSpace {
        &self.space
    }

    /* A broken override degrades to the default profile, never to a failed
     * request */
    fn user_override(&self, user_file: Option<&Path>) -> Option<UserData> {
        let path = user_file?;
        match loader::read_user_data(path, &self.lookup, &self.space) {
            Ok(user) => {
                info!(
                    "using request profile from '{}' ({} ratings)",
                    path.display(),
                    user.num_points()
                );
                Some(user)
            }
            Err(e) => {
                warn!(
                    "could not read user ratings at '{}', falling back to the default profile: {e}",
                    path.display()
                );
                None
            }
        }
    }
}
