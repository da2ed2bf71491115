/// Domain model for the remote movie catalog
///
/// The wire shape is maximally tolerant: every field may be absent or
/// null, and lists may contain null elements. Helpers flatten that
/// tolerance away for consumers.
use serde::{Deserialize, Serialize};

/// The full catalog document as delivered by the remote source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub genres: Option<Vec<Option<String>>>,
    pub movies: Option<Vec<Option<Movie>>>,
}

impl Catalog {
    /// All movies, null entries dropped, in source order.
    pub fn movie_list(&self) -> Vec<Movie> {
        self.movies
            .iter()
            .flatten()
            .flatten()
            .cloned()
            .collect()
    }

    /// Catalog-level genre labels, null entries dropped, in source order.
    /// Duplicates are preserved; the coordinator dedupes for its vocabulary.
    pub fn genre_labels(&self) -> Vec<String> {
        self.genres.iter().flatten().flatten().cloned().collect()
    }
}

/// One movie entry
///
/// Only `id` matters structurally (bookmark key); everything else is
/// display data and legitimately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movie {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub genres: Option<Vec<Option<String>>>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
}

impl Movie {
    /// Genres with null and empty fragments dropped.
    pub fn genre_list(&self) -> Vec<String> {
        self.genres
            .iter()
            .flatten()
            .flatten()
            .filter(|g| !g.is_empty())
            .cloned()
            .collect()
    }

    /// Numeric sort key for descending-year ordering.
    /// Non-numeric or missing years sort below every real year.
    pub fn year_ordinal(&self) -> i32 {
        self.year
            .as_deref()
            .and_then(|y| y.trim().parse::<i32>().ok())
            .unwrap_or(i32::MIN)
    }
}
