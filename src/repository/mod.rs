/// Catalog Repository - cache-aside reads over the local store and the
/// remote source, plus bookmark pass-through
///
/// Every failure is normalized into `Resource::Error` here; nothing
/// transport- or storage-flavored propagates past this boundary.
/// Bookmark operations use a stricter swallow-and-default policy so a
/// failing store never blocks browsing.
use crate::{
    error::{CatalogError, CatalogResult},
    model::{Catalog, Movie},
    remote::CatalogSource,
    resource::Resource,
    store::{BookmarkRecord, CatalogStore},
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CatalogRepository {
    store: CatalogStore,
    source: Arc<dyn CatalogSource>,
}

impl CatalogRepository {
    pub fn new(store: CatalogStore, source: Arc<dyn CatalogSource>) -> Self {
        Self { store, source }
    }

    /// Cache-aside read: local blob first, else fetch-and-populate.
    pub async fn get_catalog(&self) -> Resource<Catalog> {
        match self.load_catalog().await {
            Ok(catalog) => Resource::Success(catalog),
            Err(e) => Resource::error(e.resource_message()),
        }
    }

    /// Forced refresh: clear the cached blob, then fetch-and-populate.
    /// A deletion fault aborts the refresh; the remote is not consulted.
    pub async fn refresh_catalog(&self) -> Resource<Catalog> {
        if let Err(e) = self.store.delete_all_catalog().await {
            return Resource::error(e.resource_message());
        }

        match self.fetch_and_populate().await {
            Ok(catalog) => Resource::Success(catalog),
            Err(e) => Resource::error(e.resource_message()),
        }
    }

    async fn load_catalog(&self) -> CatalogResult<Catalog> {
        if let Some(cached) = self.store.get_cached_catalog().await? {
            debug!("Catalog cache hit (cached at {})", cached.cached_at);
            let catalog: Catalog = serde_json::from_str(&cached.payload)?;
            return Ok(catalog);
        }

        debug!("Catalog cache miss");
        self.fetch_and_populate().await
    }

    async fn fetch_and_populate(&self) -> CatalogResult<Catalog> {
        let body = self.source.fetch_catalog().await?;
        if body.trim().is_empty() {
            return Err(CatalogError::EmptyBody);
        }

        // A JSON `null` document counts as an absent body, not a catalog.
        let catalog: Option<Catalog> = serde_json::from_str(&body)?;
        let catalog = catalog.ok_or(CatalogError::EmptyBody)?;

        let payload = serde_json::to_string(&catalog)?;
        self.store.insert_catalog(&payload).await?;

        Ok(catalog)
    }

    /// Stored bookmarks mapped back to movie entities, most recent first.
    /// Storage faults yield an empty list.
    pub async fn bookmarked_movies(&self) -> Vec<Movie> {
        match self.store.list_bookmarks().await {
            Ok(records) => records.into_iter().map(BookmarkRecord::into_movie).collect(),
            Err(e) => {
                warn!("Failed to list bookmarks: {}", e);
                Vec::new()
            }
        }
    }

    /// Snapshot and persist a bookmark. No-op when the movie has no id.
    pub async fn add_bookmark(&self, movie: &Movie) {
        let Some(record) = BookmarkRecord::snapshot(movie, Utc::now()) else {
            return;
        };

        if let Err(e) = self.store.upsert_bookmark(&record).await {
            warn!("Failed to add bookmark {}: {}", record.movie_id, e);
        }
    }

    pub async fn remove_bookmark(&self, movie_id: i64) {
        if let Err(e) = self.store.delete_bookmark(movie_id).await {
            warn!("Failed to remove bookmark {}: {}", movie_id, e);
        }
    }

    pub async fn clear_bookmarks(&self) {
        if let Err(e) = self.store.delete_all_bookmarks().await {
            warn!("Failed to clear bookmarks: {}", e);
        }
    }

    pub async fn is_bookmarked(&self, movie_id: i64) -> bool {
        match self.store.is_bookmarked(movie_id).await {
            Ok(present) => present,
            Err(e) => {
                warn!("Failed to check bookmark {}: {}", movie_id, e);
                false
            }
        }
    }

    pub async fn bookmark_count(&self) -> i64 {
        match self.store.count_bookmarks().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count bookmarks: {}", e);
                0
            }
        }
    }

    pub async fn bookmark_ids(&self) -> HashSet<i64> {
        match self.store.list_bookmark_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to list bookmark ids: {}", e);
                HashSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that always answers with the same body, counting calls
    struct StaticSource {
        body: String,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for StaticSource {
        async fn fetch_catalog(&self) -> CatalogResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    /// Source that always answers with a non-success status
    struct StatusSource {
        code: u16,
        reason: &'static str,
    }

    #[async_trait]
    impl CatalogSource for StatusSource {
        async fn fetch_catalog(&self) -> CatalogResult<String> {
            Err(CatalogError::HttpStatus {
                code: self.code,
                reason: self.reason.to_string(),
            })
        }
    }

    /// Source with no connectivity
    struct NetworkDownSource;

    #[async_trait]
    impl CatalogSource for NetworkDownSource {
        async fn fetch_catalog(&self) -> CatalogResult<String> {
            Err(CatalogError::Connectivity("connection refused".to_string()))
        }
    }

    async fn create_repository(source: Arc<dyn CatalogSource>) -> (CatalogRepository, SqlitePool) {
        let db = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::run_migrations(&db).await.unwrap();
        let store = CatalogStore::new(db.clone());
        (CatalogRepository::new(store, source), db)
    }

    fn movie(id: i64, title: &str, year: &str, genres: &[&str]) -> Movie {
        Movie {
            id: Some(id),
            title: Some(title.to_string()),
            year: Some(year.to_string()),
            genres: Some(genres.iter().map(|g| Some(g.to_string())).collect()),
            director: Some("Director".to_string()),
            actors: Some("Actor 1, Actor 2".to_string()),
            plot: Some("Plot".to_string()),
            runtime: Some("120".to_string()),
            poster_url: Some("https://example.com/poster.jpg".to_string()),
        }
    }

    fn catalog_json() -> String {
        let catalog = Catalog {
            genres: Some(vec![Some("Action".to_string()), Some("Drama".to_string())]),
            movies: Some(vec![
                Some(movie(1, "Test Movie 1", "2023", &["Action", "Drama"])),
                Some(movie(2, "Test Movie 2", "2022", &["Drama"])),
            ]),
        };
        serde_json::to_string(&catalog).unwrap()
    }

    #[tokio::test]
    async fn test_get_catalog_returns_cached_data_without_remote_call() {
        // A status source would fail the call if consulted
        let (repo, _db) =
            create_repository(Arc::new(StatusSource { code: 500, reason: "Internal Server Error" }))
                .await;
        repo.store.insert_catalog(&catalog_json()).await.unwrap();

        let result = repo.get_catalog().await;
        let catalog = match result {
            Resource::Success(c) => c,
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(catalog.movie_list().len(), 2);
    }

    #[tokio::test]
    async fn test_get_catalog_fetches_and_populates_on_cache_miss() {
        let source = Arc::new(StaticSource::new(catalog_json()));
        let (repo, _db) = create_repository(source.clone()).await;

        let first = repo.get_catalog().await;
        assert!(first.is_success());
        assert!(repo.store.get_cached_catalog().await.unwrap().is_some());

        // Second read is served from the cache
        let second = repo.get_catalog().await;
        assert!(second.is_success());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_catalog_maps_http_status_and_skips_insert() {
        let (repo, _db) =
            create_repository(Arc::new(StatusSource { code: 404, reason: "Not Found" })).await;

        let result = repo.get_catalog().await;
        assert_eq!(result.error_message(), Some("HTTP 404: Not Found"));
        assert!(repo.store.get_cached_catalog().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_catalog_maps_null_body_to_empty_response() {
        let (repo, _db) = create_repository(Arc::new(StaticSource::new("null"))).await;

        let result = repo.get_catalog().await;
        assert_eq!(result.error_message(), Some("Empty response body"));
        assert!(repo.store.get_cached_catalog().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_catalog_maps_blank_body_to_empty_response() {
        let (repo, _db) = create_repository(Arc::new(StaticSource::new("  "))).await;

        let result = repo.get_catalog().await;
        assert_eq!(result.error_message(), Some("Empty response body"));
    }

    #[tokio::test]
    async fn test_get_catalog_surfaces_malformed_cache_as_error() {
        let (repo, _db) = create_repository(Arc::new(StaticSource::new(catalog_json()))).await;
        repo.store.insert_catalog("invalid json").await.unwrap();

        let result = repo.get_catalog().await;
        let message = result.error_message().unwrap();
        assert!(message.starts_with("Unexpected error: "), "got: {}", message);
    }

    #[tokio::test]
    async fn test_get_catalog_maps_connectivity_fault() {
        let (repo, _db) = create_repository(Arc::new(NetworkDownSource)).await;

        let result = repo.get_catalog().await;
        assert_eq!(
            result.error_message(),
            Some("Network error: connection refused")
        );
    }

    #[tokio::test]
    async fn test_refresh_replaces_cache_and_get_reflects_it() {
        let (repo, _db) = create_repository(Arc::new(StaticSource::new(catalog_json()))).await;
        repo.store.insert_catalog(r#"{"movies":[]}"#).await.unwrap();

        let refreshed = repo.refresh_catalog().await;
        let refreshed_ids: Vec<Option<i64>> = match &refreshed {
            Resource::Success(c) => c.movie_list().iter().map(|m| m.id).collect(),
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(refreshed_ids, vec![Some(1), Some(2)]);

        // Cache now reflects the last successful fetch
        let cached = repo.get_catalog().await;
        let cached_ids: Vec<Option<i64>> = match &cached {
            Resource::Success(c) => c.movie_list().iter().map(|m| m.id).collect(),
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(cached_ids, refreshed_ids);
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_cache_cleared() {
        let (repo, _db) = create_repository(Arc::new(NetworkDownSource)).await;
        repo.store.insert_catalog(&catalog_json()).await.unwrap();

        let result = repo.refresh_catalog().await;
        assert!(result.error_message().is_some());
        assert!(repo.store.get_cached_catalog().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bookmark_roundtrip() {
        let (repo, _db) = create_repository(Arc::new(StaticSource::new(catalog_json()))).await;
        let m = movie(1, "Test Movie 1", "2023", &["Action", "Drama"]);

        repo.add_bookmark(&m).await;
        assert!(repo.is_bookmarked(1).await);
        assert_eq!(repo.bookmark_count().await, 1);
        assert_eq!(repo.bookmark_ids().await, HashSet::from([1]));

        let movies = repo.bookmarked_movies().await;
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, Some(1));
        assert_eq!(movies[0].genre_list(), vec!["Action", "Drama"]);

        repo.remove_bookmark(1).await;
        assert!(!repo.is_bookmarked(1).await);
        assert_eq!(repo.bookmark_count().await, 0);
    }

    #[tokio::test]
    async fn test_clear_bookmarks() {
        let (repo, _db) = create_repository(Arc::new(StaticSource::new(catalog_json()))).await;
        repo.add_bookmark(&movie(1, "A", "2023", &[])).await;
        repo.add_bookmark(&movie(2, "B", "2022", &[])).await;

        repo.clear_bookmarks().await;
        assert_eq!(repo.bookmark_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_bookmark_without_id_is_noop() {
        let (repo, _db) = create_repository(Arc::new(StaticSource::new(catalog_json()))).await;

        repo.add_bookmark(&Movie {
            title: Some("No Id".to_string()),
            ..Default::default()
        })
        .await;

        assert_eq!(repo.bookmark_count().await, 0);
    }

    #[tokio::test]
    async fn test_bookmark_operations_default_on_storage_fault() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let (repo, db) = create_repository(Arc::new(StaticSource::new(catalog_json()))).await;
        db.close().await;

        assert!(repo.bookmarked_movies().await.is_empty());
        assert!(!repo.is_bookmarked(1).await);
        assert_eq!(repo.bookmark_count().await, 0);
        assert!(repo.bookmark_ids().await.is_empty());

        // Mutations are swallowed, not surfaced
        repo.add_bookmark(&movie(1, "A", "2023", &[])).await;
        repo.remove_bookmark(1).await;
        repo.clear_bookmarks().await;
    }
}
