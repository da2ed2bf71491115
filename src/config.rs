/// Configuration management for the cinefile catalog core
use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
}

/// Remote catalog source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Full URL of the catalog JSON document
    pub catalog_url: String,
    /// User-Agent header for HTTP requests
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub catalog_db: PathBuf,
}

impl CatalogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> CatalogResult<Self> {
        dotenv::dotenv().ok();

        let catalog_url = env::var("CINEFILE_CATALOG_URL").unwrap_or_else(|_| {
            "https://raw.githubusercontent.com/erik-sytnyk/movies-list/master/db.json".to_string()
        });
        let user_agent =
            env::var("CINEFILE_USER_AGENT").unwrap_or_else(|_| "cinefile/0.1".to_string());
        let timeout_secs = env::var("CINEFILE_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| CatalogError::Validation("Invalid HTTP timeout".to_string()))?;

        let data_directory: PathBuf = env::var("CINEFILE_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let catalog_db = env::var("CINEFILE_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("catalog.sqlite"));

        let config = Self {
            remote: RemoteConfig {
                catalog_url,
                user_agent,
                timeout_secs,
            },
            storage: StorageConfig {
                data_directory,
                catalog_db,
            },
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CatalogResult<()> {
        if !self.remote.catalog_url.starts_with("http://")
            && !self.remote.catalog_url.starts_with("https://")
        {
            return Err(CatalogError::Validation(format!(
                "Catalog URL must be http(s): {}",
                self.remote.catalog_url
            )));
        }
        if self.remote.timeout_secs == 0 {
            return Err(CatalogError::Validation(
                "HTTP timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
