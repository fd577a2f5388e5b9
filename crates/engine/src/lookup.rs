//! The movie catalog: metadata for every movie in the system.
//!
//! All information hangs off the movie id. For callers that do not know the
//! id, a case- and diacritic-insensitive title search is provided.

use crate::model::movie::{ClusterId, Movie, MovieId};
use std::cmp::Ordering;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Read-only catalog with id and title lookup.
#[derive(Debug)]
pub struct MovieLookup {
    movies: HashMap<MovieId, Movie>,
    search_index: HashMap<MovieId, String>,
}

impl MovieLookup {
    pub fn new(movies: Vec<Movie>) -> Self {
        let search_index = movies
            .iter()
            .map(|m| (m.id, normalize(&m.title)))
            .collect();
        let movies = movies.into_iter().map(|m| (m.id, m)).collect();
        Self {
            movies,
            search_index,
        }
    }

    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movies.get(&movie_id)
    }

    pub fn cluster_id(&self, movie_id: MovieId) -> Option<ClusterId> {
        self.movies.get(&movie_id).map(|m| m.cluster_id)
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.movies.contains_key(&movie_id)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// All catalog movie ids, in no particular order
    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.movies.keys().copied().collect()
    }

    /// All movies whose title contains the provided string, disregarding
    /// case and diacritics. Results are ordered by id.
    pub fn search(&self, term: &str) -> Vec<&Movie> {
        let query = normalize(term);
        let mut result: Vec<&Movie> = self
            .search_index
            .iter()
            .filter(|(_, title)| title.contains(&query))
            .filter_map(|(id, _)| self.movies.get(id))
            .collect();
        result.sort_by_key(|m| m.id);
        result
    }

    /// All movies belonging to a cluster, highest public rating first,
    /// unrated last.
    pub fn cluster(&self, cluster_id: ClusterId) -> Vec<&Movie> {
        let mut result: Vec<&Movie> = self
            .movies
            .values()
            .filter(|m| m.cluster_id == cluster_id)
            .collect();
        result.sort_by(|a, b| decreasing_rating(a, b));
        result
    }
}

/* Lowercase and strip combining marks so "Amélie" matches "amelie" */
fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn decreasing_rating(m1: &Movie, m2: &Movie) -> Ordering {
    match (m1.rating, m2.rating) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(r1), Some(r2)) => r2.total_cmp(&r1),
    }
}
