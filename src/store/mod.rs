/// Local Catalog Store - persistence layer for the cached catalog blob
/// and the bookmark table
pub mod models;

pub use models::{BookmarkRecord, CachedCatalog};

use crate::error::{CatalogError, CatalogResult};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

/// Store manager over the SQLite pool
///
/// Owned exclusively by the repository; no other component touches the
/// persisted rows directly.
#[derive(Clone)]
pub struct CatalogStore {
    db: SqlitePool,
}

impl CatalogStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Get the single cached catalog blob, or `None` when no cache exists.
    /// Absence is a normal return value, not an error.
    pub async fn get_cached_catalog(&self) -> CatalogResult<Option<CachedCatalog>> {
        let result = sqlx::query(
            r#"
            SELECT payload, cached_at
            FROM catalog_cache
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.db)
        .await
        .map_err(CatalogError::Database)?;

        if let Some(row) = result {
            let cached = CachedCatalog {
                payload: row.try_get("payload")?,
                cached_at: parse_timestamp(&row.try_get::<String, _>("cached_at")?)?,
            };
            return Ok(Some(cached));
        }

        Ok(None)
    }

    /// Upsert the catalog blob. An existing blob is silently replaced.
    pub async fn insert_catalog(&self, payload: &str) -> CatalogResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO catalog_cache (id, payload, cached_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                cached_at = excluded.cached_at
            "#,
        )
        .bind(payload)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(CatalogError::Database)?;

        Ok(())
    }

    /// Remove the cached blob. No-op when absent.
    pub async fn delete_all_catalog(&self) -> CatalogResult<()> {
        sqlx::query("DELETE FROM catalog_cache")
            .execute(&self.db)
            .await
            .map_err(CatalogError::Database)?;

        Ok(())
    }

    /// All bookmarks, most recently added first.
    pub async fn list_bookmarks(&self) -> CatalogResult<Vec<BookmarkRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT movie_id, title, year, poster_url, plot, director,
                   actors, runtime, genres, added_at
            FROM bookmark
            ORDER BY added_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(CatalogError::Database)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(BookmarkRecord {
                movie_id: row.try_get("movie_id")?,
                title: row.try_get("title")?,
                year: row.try_get("year")?,
                poster_url: row.try_get("poster_url")?,
                plot: row.try_get("plot")?,
                director: row.try_get("director")?,
                actors: row.try_get("actors")?,
                runtime: row.try_get("runtime")?,
                genres: row.try_get("genres")?,
                added_at: parse_timestamp(&row.try_get::<String, _>("added_at")?)?,
            });
        }

        Ok(records)
    }

    /// Ids of all bookmarked movies.
    pub async fn list_bookmark_ids(&self) -> CatalogResult<HashSet<i64>> {
        let rows = sqlx::query("SELECT movie_id FROM bookmark")
            .fetch_all(&self.db)
            .await
            .map_err(CatalogError::Database)?;

        let mut ids = HashSet::with_capacity(rows.len());
        for row in rows {
            ids.insert(row.try_get("movie_id")?);
        }

        Ok(ids)
    }

    pub async fn is_bookmarked(&self, movie_id: i64) -> CatalogResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM bookmark WHERE movie_id = ?1) AS present")
            .bind(movie_id)
            .fetch_one(&self.db)
            .await
            .map_err(CatalogError::Database)?;

        Ok(row.try_get::<i64, _>("present")? != 0)
    }

    /// Upsert a bookmark. Re-inserting replaces the whole row.
    pub async fn upsert_bookmark(&self, record: &BookmarkRecord) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookmark (movie_id, title, year, poster_url, plot,
                                  director, actors, runtime, genres, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(movie_id) DO UPDATE SET
                title = excluded.title,
                year = excluded.year,
                poster_url = excluded.poster_url,
                plot = excluded.plot,
                director = excluded.director,
                actors = excluded.actors,
                runtime = excluded.runtime,
                genres = excluded.genres,
                added_at = excluded.added_at
            "#,
        )
        .bind(record.movie_id)
        .bind(&record.title)
        .bind(&record.year)
        .bind(&record.poster_url)
        .bind(&record.plot)
        .bind(&record.director)
        .bind(&record.actors)
        .bind(&record.runtime)
        .bind(&record.genres)
        .bind(record.added_at.to_rfc3339())
        .execute(&self.db)
        .await
        .map_err(CatalogError::Database)?;

        Ok(())
    }

    /// Remove one bookmark. No-op when absent.
    pub async fn delete_bookmark(&self, movie_id: i64) -> CatalogResult<()> {
        sqlx::query("DELETE FROM bookmark WHERE movie_id = ?1")
            .bind(movie_id)
            .execute(&self.db)
            .await
            .map_err(CatalogError::Database)?;

        Ok(())
    }

    pub async fn delete_all_bookmarks(&self) -> CatalogResult<()> {
        sqlx::query("DELETE FROM bookmark")
            .execute(&self.db)
            .await
            .map_err(CatalogError::Database)?;

        Ok(())
    }

    pub async fn count_bookmarks(&self) -> CatalogResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM bookmark")
            .fetch_one(&self.db)
            .await
            .map_err(CatalogError::Database)?;

        Ok(row.try_get("n")?)
    }
}

/// Parse RFC3339 timestamp
fn parse_timestamp(s: &str) -> CatalogResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::Unexpected(format!("Invalid timestamp: {}", e)))
}
