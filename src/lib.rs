/// cinefile - offline-first movie catalog browsing core
///
/// Fetches a static movie catalog from a remote JSON endpoint, caches it
/// in SQLite (cache-aside), and coordinates the filtered, searched,
/// paginated view state plus the bookmarked-movie set for a presentation
/// layer that subscribes to its observable state.

pub mod config;
pub mod context;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod model;
pub mod remote;
pub mod repository;
pub mod resource;
pub mod store;

pub use config::CatalogConfig;
pub use context::AppContext;
pub use coordinator::{CatalogCoordinator, PAGE_SIZE};
pub use error::{CatalogError, CatalogResult};
pub use model::{Catalog, Movie};
pub use remote::{CatalogSource, HttpCatalogSource, HttpSourceConfig};
pub use repository::CatalogRepository;
pub use resource::Resource;
pub use store::{BookmarkRecord, CatalogStore};
