//! User favorites: store interface and read-time overlay.
//!
//! Favorites belong to the persistence collaborator, not to the canonical
//! dataset. The overlay annotates copies of stations at read time; the
//! cache's snapshot is never touched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::Station;

/// Outcome of adding a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// Outcome of removing a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// In-memory favorites store.
///
/// Stands in for the external document store: one record per
/// `(user, station)` pair with its creation time. Swapping in a real
/// persistence backend means reimplementing these three operations.
#[derive(Clone, Default)]
pub struct FavoritesStore {
    inner: Arc<RwLock<HashMap<String, HashMap<String, DateTime<Utc>>>>>,
}

impl FavoritesStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The station ids a user has favorited.
    pub async fn list_ids(&self, user_id: &str) -> HashSet<String> {
        let guard = self.inner.read().await;
        guard
            .get(user_id)
            .map(|stations| stations.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Mark a station as a favorite of the user.
    pub async fn add(&self, user_id: &str, station_id: &str) -> AddOutcome {
        let mut guard = self.inner.write().await;
        let stations = guard.entry(user_id.to_string()).or_default();

        if stations.contains_key(station_id) {
            return AddOutcome::AlreadyExists;
        }
        stations.insert(station_id.to_string(), Utc::now());
        AddOutcome::Added
    }

    /// Remove a station from the user's favorites.
    pub async fn remove(&self, user_id: &str, station_id: &str) -> RemoveOutcome {
        let mut guard = self.inner.write().await;
        match guard.get_mut(user_id) {
            Some(stations) => {
                if stations.remove(station_id).is_some() {
                    RemoveOutcome::Removed
                } else {
                    RemoveOutcome::NotFound
                }
            }
            None => RemoveOutcome::NotFound,
        }
    }
}

/// A station annotated with a user's favorite flag.
#[derive(Debug, Clone)]
pub struct AnnotatedStation {
    pub station: Station,
    pub is_favorite: bool,
}

/// Overlay a user's favorite ids onto canonical stations.
///
/// Pure with respect to the cache: the input slice is only read, the output
/// carries copies.
pub fn annotate_favorites(
    stations: &[Station],
    favorite_ids: &HashSet<String>,
) -> Vec<AnnotatedStation> {
    stations
        .iter()
        .map(|s| AnnotatedStation {
            is_favorite: favorite_ids.contains(&s.id),
            station: s.clone(),
        })
        .collect()
}
