//! Parsers for the movie map, the taste space and user rating files.
//!
//! Every format is CSV with one header line. The movie map needs a real
//! CSV parser since titles contain quoted commas; the other two are plain
//! numeric tables but run through the same reader for uniform error
//! reporting.

use crate::error::{DataLoadError, Result};
use csv::ReaderBuilder;
use engine::{ClusterId, Movie, MovieId, MovieLookup, TasteSpace, UserData};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

const NA: &str = "NA";

/// Opens a file, decompressing transparently when the name ends in `.gz`.
fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|source| DataLoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads the movie catalog from a file.
pub fn read_movie_map(path: &Path) -> Result<MovieLookup> {
    let start = Instant::now();
    let lookup = read_movie_map_from(open(path)?)?;
    info!(
        "read '{}' ({} movies) in {:?}",
        path.display(),
        lookup.len(),
        start.elapsed()
    );
    Ok(lookup)
}

/// Reads the movie catalog from any reader.
///
/// Columns: `movieId,clusterId,title,genres,rating,votes`. Genres are
/// pipe-separated; `NA` marks an absent rating or vote count.
pub fn read_movie_map_from<R: Read>(reader: R) -> Result<MovieLookup> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut movies = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let line = i + 2; // header is line 1
        let record = record?;
        if record.len() < 6 {
            return Err(DataLoadError::FieldCountMismatch {
                expected: 6,
                found: record.len(),
                line,
            });
        }
        movies.push(Movie {
            id: parse_field(&record[0], "movieId", line)?,
            cluster_id: parse_field(&record[1], "clusterId", line)?,
            title: record[2].to_string(),
            genres: record[3]
                .split('|')
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect(),
            rating: parse_optional(&record[4], "rating", line)?,
            votes: parse_optional(&record[5], "votes", line)?,
        });
    }
    if movies.is_empty() {
        return Err(DataLoadError::Empty("movie map has no rows"));
    }
    Ok(MovieLookup::new(movies))
}

/// Reads the taste space from a file.
pub fn read_taste_space(path: &Path) -> Result<TasteSpace> {
    let start = Instant::now();
    let space = read_taste_space_from(open(path)?)?;
    info!(
        "read '{}' ({} clusters, {} dimensions) in {:?}",
        path.display(),
        space.num_clusters(),
        space.dimensions(),
        start.elapsed()
    );
    Ok(space)
}

/// Reads the taste space from any reader.
///
/// Columns: `clusterId,d1,...,dk`; the header fixes the dimensionality and
/// every row must provide all coordinates.
pub fn read_taste_space_from<R: Read>(reader: R) -> Result<TasteSpace> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let dimensions = csv.headers()?.len().saturating_sub(1);
    if dimensions == 0 {
        return Err(DataLoadError::Empty("taste space has no dimensions"));
    }
    let mut cluster_ids: Vec<ClusterId> = Vec::new();
    let mut coordinates: Vec<Vec<f32>> = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let line = i + 2;
        let record = record?;
        if record.len() != dimensions + 1 {
            return Err(DataLoadError::FieldCountMismatch {
                expected: dimensions + 1,
                found: record.len(),
                line,
            });
        }
        cluster_ids.push(parse_field(&record[0], "clusterId", line)?);
        let row = record
            .iter()
            .skip(1)
            .map(|value| parse_field::<f32>(value, "coordinate", line))
            .collect::<Result<Vec<f32>>>()?;
        coordinates.push(row);
    }
    if cluster_ids.is_empty() {
        return Err(DataLoadError::Empty("taste space has no rows"));
    }
    Ok(TasteSpace::new(cluster_ids, coordinates))
}

/// Reads a user's (movie id, rating) pairs from a file.
pub fn read_user_ratings(path: &Path) -> Result<Vec<(MovieId, f32)>> {
    let start = Instant::now();
    let ratings = read_user_ratings_from(open(path)?)?;
    info!(
        "read '{}' ({} ratings) in {:?}",
        path.display(),
        ratings.len(),
        start.elapsed()
    );
    Ok(ratings)
}

/// Reads a user's (movie id, rating) pairs from any reader.
///
/// The export layout puts the movie id in the first column and the rating
/// in the fourth; anything in between is carried metadata and ignored.
/// File order is preserved; a repeated movie id overwrites the earlier
/// rating in place.
pub fn read_user_ratings_from<R: Read>(reader: R) -> Result<Vec<(MovieId, f32)>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut ratings: Vec<(MovieId, f32)> = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let line = i + 2;
        let record = record?;
        if record.len() < 4 {
            return Err(DataLoadError::FieldCountMismatch {
                expected: 4,
                found: record.len(),
                line,
            });
        }
        let movie_id: MovieId = parse_field(&record[0], "movieId", line)?;
        let rating: f32 = parse_field(&record[3], "rating", line)?;
        match ratings.iter_mut().find(|(id, _)| *id == movie_id) {
            Some(entry) => entry.1 = rating,
            None => ratings.push((movie_id, rating)),
        }
    }
    Ok(ratings)
}

/// Reads a user rating file and joins it against the catalog and the global
/// taste space.
pub fn read_user_data(
    path: &Path,
    lookup: &MovieLookup,
    space: &TasteSpace,
) -> Result<UserData> {
    let ratings = read_user_ratings(path)?;
    build_user_data(ratings, lookup, space)
}

/// In-memory variant of [`read_user_data`].
pub fn read_user_data_from<R: Read>(
    reader: R,
    lookup: &MovieLookup,
    space: &TasteSpace,
) -> Result<UserData> {
    let ratings = read_user_ratings_from(reader)?;
    build_user_data(ratings, lookup, space)
}

/// Ratings for movies outside the catalog are dropped; each kept movie
/// contributes one point carrying the coordinates of its cluster.
fn build_user_data(
    ratings: Vec<(MovieId, f32)>,
    lookup: &MovieLookup,
    space: &TasteSpace,
) -> Result<UserData> {
    let mut movie_ids = Vec::with_capacity(ratings.len());
    let mut cluster_ids = Vec::with_capacity(ratings.len());
    let mut kept_ratings = Vec::with_capacity(ratings.len());
    let mut coordinates = Vec::with_capacity(ratings.len());
    for (movie_id, rating) in ratings {
        let Some(cluster_id) = lookup.cluster_id(movie_id) else {
            debug!(movie = movie_id, "rated movie not in the catalog, dropped");
            continue;
        };
        let Ok(index) = space.cluster_index(cluster_id) else {
            debug!(
                movie = movie_id,
                cluster = cluster_id,
                "rated movie's cluster not in the taste space, dropped"
            );
            continue;
        };
        movie_ids.push(movie_id);
        cluster_ids.push(cluster_id);
        kept_ratings.push(rating);
        coordinates.push(space.coordinate(index).to_vec());
    }
    Ok(UserData::new(
        movie_ids,
        cluster_ids,
        kept_ratings,
        coordinates,
    )?)
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DataLoadError::InvalidValue {
            field,
            line,
            value: value.to_string(),
        })
}

fn parse_optional<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<Option<T>> {
    if value.trim() == NA {
        return Ok(None);
    }
    parse_field(value, field, line).map(Some)
}
