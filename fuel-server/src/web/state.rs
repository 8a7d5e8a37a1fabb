//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::StationCache;
use crate::favorites::FavoritesStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached canonical station data.
    pub cache: Arc<StationCache>,

    /// Per-user favorite stations.
    pub favorites: FavoritesStore,
}

impl AppState {
    /// Create a new app state.
    pub fn new(cache: StationCache, favorites: FavoritesStore) -> Self {
        Self {
            cache: Arc::new(cache),
            favorites,
        }
    }
}
