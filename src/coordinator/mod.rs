/// View-State Coordinator
///
/// Owns the in-memory catalog and derives the filtered, searched,
/// paginated slice the presentation layer renders. Published state lives
/// in `tokio::sync::watch` cells: latest value visible to readers,
/// updates delivered in emission order. Driven by a single logical
/// consumer; busy flags drop re-entrant page loads and bookmark toggles
/// instead of queuing them.
use crate::{
    model::{Catalog, Movie},
    repository::CatalogRepository,
    resource::Resource,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;

/// Number of movies appended per page load
pub const PAGE_SIZE: usize = 10;

/// Non-observable coordinator state
#[derive(Default)]
struct CoordinatorInner {
    full_movies: Vec<Movie>,
    current_page: usize,
    selected_movie: Option<Movie>,
}

pub struct CatalogCoordinator {
    repository: Arc<CatalogRepository>,
    inner: Mutex<CoordinatorInner>,
    page_busy: AtomicBool,
    bookmark_busy: AtomicBool,
    /// Token for the current load cycle; stale cycles discard their result
    generation: AtomicU64,

    // Observable state cells
    catalog_state: watch::Sender<Resource<Catalog>>,
    loading: watch::Sender<bool>,
    loading_more: watch::Sender<bool>,
    displayed: watch::Sender<Vec<Movie>>,
    selected_genre: watch::Sender<Option<String>>,
    available_genres: watch::Sender<Vec<String>>,
    search_query: watch::Sender<String>,
    search_active: watch::Sender<bool>,
    bookmark_ids: watch::Sender<HashSet<i64>>,
    bookmark_count: watch::Sender<i64>,
    bookmark_loading: watch::Sender<bool>,
}

impl CatalogCoordinator {
    pub fn new(repository: Arc<CatalogRepository>) -> Self {
        Self {
            repository,
            inner: Mutex::new(CoordinatorInner::default()),
            page_busy: AtomicBool::new(false),
            bookmark_busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            catalog_state: watch::Sender::new(Resource::Loading),
            loading: watch::Sender::new(false),
            loading_more: watch::Sender::new(false),
            displayed: watch::Sender::new(Vec::new()),
            selected_genre: watch::Sender::new(None),
            available_genres: watch::Sender::new(Vec::new()),
            search_query: watch::Sender::new(String::new()),
            search_active: watch::Sender::new(false),
            bookmark_ids: watch::Sender::new(HashSet::new()),
            bookmark_count: watch::Sender::new(0),
            bookmark_loading: watch::Sender::new(false),
        }
    }

    /// Cache-aside load of the catalog.
    pub async fn load(&self) {
        self.run_cycle(false).await;
    }

    /// Forced refresh: cursor and displayed slice reset before re-entering
    /// the loading state.
    pub async fn refresh(&self) {
        self.inner.lock().unwrap().current_page = 0;
        self.displayed.send_replace(Vec::new());
        self.run_cycle(true).await;
    }

    async fn run_cycle(&self, refresh: bool) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading.send_replace(true);
        self.catalog_state.send_replace(Resource::Loading);

        let result = if refresh {
            self.repository.refresh_catalog().await
        } else {
            self.repository.get_catalog().await
        };

        // A newer cycle started meanwhile; this result must not land.
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale catalog result (generation {})", generation);
            return;
        }

        if let Resource::Success(catalog) = &result {
            let mut movies = catalog.movie_list();
            movies.sort_by_key(|m| std::cmp::Reverse(m.year_ordinal()));

            let mut genres = catalog.genre_labels();
            genres.sort();
            genres.dedup();

            {
                let mut inner = self.inner.lock().unwrap();
                inner.full_movies = movies;
                inner.current_page = 0;
            }
            self.available_genres.send_replace(genres);
            self.displayed.send_replace(Vec::new());
            self.load_next_page();
        }
        // On error the full list is left untouched; stale data stays usable.

        self.catalog_state.send_replace(result);
        self.loading.send_replace(false);
        self.refresh_bookmark_state().await;
    }

    /// Append the next page of the filtered result to the displayed slice.
    /// Re-entrant calls while a page load is in flight are dropped; calling
    /// past the end of the filtered result is a no-op.
    pub fn load_next_page(&self) {
        if self
            .page_busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.loading_more.send_replace(true);

        {
            let mut inner = self.inner.lock().unwrap();
            let filtered = self.filter_movies(&inner.full_movies);
            let start = inner.current_page * PAGE_SIZE;
            if start < filtered.len() {
                let end = usize::min(start + PAGE_SIZE, filtered.len());
                self.displayed
                    .send_modify(|d| d.extend_from_slice(&filtered[start..end]));
                inner.current_page += 1;
            }
        }

        self.loading_more.send_replace(false);
        self.page_busy.store(false, Ordering::SeqCst);
    }

    /// True while the cursor has not exhausted the filtered result.
    pub fn has_more(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        let filtered = self.filter_movies(&inner.full_movies);
        inner.current_page * PAGE_SIZE < filtered.len()
    }

    pub fn set_genre_filter(&self, genre: Option<String>) {
        self.selected_genre.send_replace(genre);
        self.reset_displayed();
        self.load_next_page();
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.search_query.send_replace(query.into());
        self.reset_displayed();
        self.load_next_page();
    }

    /// Toggle search mode. Deactivating also clears the query text.
    pub fn set_search_active(&self, active: bool) {
        self.search_active.send_replace(active);
        if !active {
            self.search_query.send_replace(String::new());
        }
        self.reset_displayed();
        self.load_next_page();
    }

    fn reset_displayed(&self) {
        self.inner.lock().unwrap().current_page = 0;
        self.displayed.send_replace(Vec::new());
    }

    /// Toggle bookmark membership for a movie in the full list. Unknown
    /// ids are ignored; overlapping toggles are dropped by the busy flag.
    pub async fn toggle_bookmark(&self, movie_id: i64) {
        if self
            .bookmark_busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.bookmark_loading.send_replace(true);

        let movie = {
            let inner = self.inner.lock().unwrap();
            inner
                .full_movies
                .iter()
                .find(|m| m.id == Some(movie_id))
                .cloned()
        };

        if let Some(movie) = movie {
            let bookmarked = self.repository.is_bookmarked(movie_id).await;
            if bookmarked {
                self.repository.remove_bookmark(movie_id).await;
            } else {
                self.repository.add_bookmark(&movie).await;
            }

            // Optimistic update, then reconcile with the store
            self.bookmark_ids.send_modify(|ids| {
                if bookmarked {
                    ids.remove(&movie_id);
                } else {
                    ids.insert(movie_id);
                }
            });
            let optimistic = self.bookmark_ids.borrow().len() as i64;
            self.bookmark_count.send_replace(optimistic);
            self.refresh_bookmark_state().await;
        }

        self.bookmark_loading.send_replace(false);
        self.bookmark_busy.store(false, Ordering::SeqCst);
    }

    async fn refresh_bookmark_state(&self) {
        let ids = self.repository.bookmark_ids().await;
        let count = self.repository.bookmark_count().await;
        self.bookmark_ids.send_replace(ids);
        self.bookmark_count.send_replace(count);
    }

    /// Hand a chosen movie to a detail view without re-fetching.
    pub fn select_movie(&self, movie: Movie) {
        self.inner.lock().unwrap().selected_movie = Some(movie);
    }

    pub fn selected_movie(&self) -> Option<Movie> {
        self.inner.lock().unwrap().selected_movie.clone()
    }

    /// Lookup against the full in-memory list.
    pub fn movie_by_id(&self, movie_id: i64) -> Option<Movie> {
        self.inner
            .lock()
            .unwrap()
            .full_movies
            .iter()
            .find(|m| m.id == Some(movie_id))
            .cloned()
    }

    pub fn is_bookmarked(&self, movie_id: i64) -> bool {
        self.bookmark_ids.borrow().contains(&movie_id)
    }

    /// Persisted bookmarks as movie entities, most recent first.
    pub async fn bookmarked_movies(&self) -> Vec<Movie> {
        self.repository.bookmarked_movies().await
    }

    fn filter_movies(&self, movies: &[Movie]) -> Vec<Movie> {
        let genre = self.selected_genre.borrow().clone();
        let query = self.search_query.borrow().trim().to_lowercase();

        movies
            .iter()
            .filter(|m| Self::matches_genre(m, genre.as_deref()) && Self::matches_query(m, &query))
            .cloned()
            .collect()
    }

    fn matches_genre(movie: &Movie, genre: Option<&str>) -> bool {
        match genre {
            None => true,
            Some(g) => movie.genre_list().iter().any(|label| label == g),
        }
    }

    /// Case-insensitive substring match against title, plot, director,
    /// actors, or any genre. An empty query matches everything.
    fn matches_query(movie: &Movie, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let field_matches = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(query))
        };
        field_matches(&movie.title)
            || field_matches(&movie.plot)
            || field_matches(&movie.director)
            || field_matches(&movie.actors)
            || movie
                .genre_list()
                .iter()
                .any(|g| g.to_lowercase().contains(query))
    }
}

/// Current-value snapshots and subscriptions for every observable stream
impl CatalogCoordinator {
    pub fn catalog_state(&self) -> Resource<Catalog> {
        self.catalog_state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn is_loading_more(&self) -> bool {
        *self.loading_more.borrow()
    }

    pub fn displayed_movies(&self) -> Vec<Movie> {
        self.displayed.borrow().clone()
    }

    pub fn selected_genre(&self) -> Option<String> {
        self.selected_genre.borrow().clone()
    }

    pub fn available_genres(&self) -> Vec<String> {
        self.available_genres.borrow().clone()
    }

    pub fn search_query(&self) -> String {
        self.search_query.borrow().clone()
    }

    pub fn is_search_active(&self) -> bool {
        *self.search_active.borrow()
    }

    pub fn bookmark_ids(&self) -> HashSet<i64> {
        self.bookmark_ids.borrow().clone()
    }

    pub fn bookmark_count(&self) -> i64 {
        *self.bookmark_count.borrow()
    }

    pub fn is_bookmark_loading(&self) -> bool {
        *self.bookmark_loading.borrow()
    }

    pub fn subscribe_catalog_state(&self) -> watch::Receiver<Resource<Catalog>> {
        self.catalog_state.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn subscribe_loading_more(&self) -> watch::Receiver<bool> {
        self.loading_more.subscribe()
    }

    pub fn subscribe_displayed(&self) -> watch::Receiver<Vec<Movie>> {
        self.displayed.subscribe()
    }

    pub fn subscribe_selected_genre(&self) -> watch::Receiver<Option<String>> {
        self.selected_genre.subscribe()
    }

    pub fn subscribe_available_genres(&self) -> watch::Receiver<Vec<String>> {
        self.available_genres.subscribe()
    }

    pub fn subscribe_search_query(&self) -> watch::Receiver<String> {
        self.search_query.subscribe()
    }

    pub fn subscribe_search_active(&self) -> watch::Receiver<bool> {
        self.search_active.subscribe()
    }

    pub fn subscribe_bookmark_ids(&self) -> watch::Receiver<HashSet<i64>> {
        self.bookmark_ids.subscribe()
    }

    pub fn subscribe_bookmark_count(&self) -> watch::Receiver<i64> {
        self.bookmark_count.subscribe()
    }

    pub fn subscribe_bookmark_loading(&self) -> watch::Receiver<bool> {
        self.bookmark_loading.subscribe()
    }
}
