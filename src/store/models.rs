/// Persistence models for the local catalog store
use crate::model::Movie;
use chrono::{DateTime, Utc};

/// The single cached catalog row: the raw serialized catalog document.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCatalog {
    pub payload: String,
    pub cached_at: DateTime<Utc>,
}

/// One bookmarked movie, snapshotted at bookmark time.
///
/// Snapshot fields are copies of the movie as it looked when bookmarked;
/// re-inserting replaces the whole row (no in-place mutation).
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkRecord {
    pub movie_id: i64,
    pub title: Option<String>,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub runtime: Option<String>,
    /// Genres joined into one comma-separated string
    pub genres: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl BookmarkRecord {
    /// Snapshot a movie into a bookmark record. Returns `None` when the
    /// movie has no id to key the record by.
    pub fn snapshot(movie: &Movie, added_at: DateTime<Utc>) -> Option<Self> {
        let movie_id = movie.id?;
        let genres = movie.genres.as_ref().map(|_| movie.genre_list().join(","));
        Some(Self {
            movie_id,
            title: movie.title.clone(),
            year: movie.year.clone(),
            poster_url: movie.poster_url.clone(),
            plot: movie.plot.clone(),
            director: movie.director.clone(),
            actors: movie.actors.clone(),
            runtime: movie.runtime.clone(),
            genres,
            added_at,
        })
    }

    /// Map the snapshot back to a movie entity, splitting the joined
    /// genre string and dropping empty fragments.
    pub fn into_movie(self) -> Movie {
        let genres = self.genres.map(|joined| {
            joined
                .split(',')
                .filter(|g| !g.is_empty())
                .map(|g| Some(g.to_string()))
                .collect::<Vec<_>>()
        });
        Movie {
            id: Some(self.movie_id),
            title: self.title,
            year: self.year,
            runtime: self.runtime,
            genres,
            director: self.director,
            actors: self.actors,
            plot: self.plot,
            poster_url: self.poster_url,
        }
    }
}
