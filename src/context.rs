/// Application context and dependency injection
///
/// The composition root: the store is constructed once here and handed
/// to the repository, which is the only component allowed to touch it.
use crate::{
    config::CatalogConfig,
    coordinator::CatalogCoordinator,
    db,
    error::CatalogResult,
    remote::{HttpCatalogSource, HttpSourceConfig},
    repository::CatalogRepository,
    store::CatalogStore,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<CatalogConfig>,
    pub db: SqlitePool,
    pub repository: Arc<CatalogRepository>,
    pub coordinator: Arc<CatalogCoordinator>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let pool = db::create_pool(&config.storage.catalog_db, db::DatabaseOptions::default())
            .await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;
        info!("Catalog database ready at {:?}", config.storage.catalog_db);

        let store = CatalogStore::new(pool.clone());
        let source = Arc::new(HttpCatalogSource::new(HttpSourceConfig {
            catalog_url: config.remote.catalog_url.clone(),
            user_agent: config.remote.user_agent.clone(),
            timeout_secs: config.remote.timeout_secs,
        })?);

        let repository = Arc::new(CatalogRepository::new(store, source));
        let coordinator = Arc::new(CatalogCoordinator::new(Arc::clone(&repository)));

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            repository,
            coordinator,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &CatalogConfig) -> CatalogResult<()> {
        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory).await?;
        }

        Ok(())
    }
}
