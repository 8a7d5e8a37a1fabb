//! Caching layer for the canonical station list.
//!
//! One immutable snapshot behind an atomically-swapped pointer. Queries read
//! whatever snapshot is installed; the first query after the TTL elapses
//! triggers a refresh through the raw source chain. Staleness is preferred
//! over unavailability: a failed refresh keeps the old snapshot in place,
//! and only a cold cache with every source exhausted fails a query.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::domain::Station;
use crate::provider::{NormalizeStats, ProviderError, RawSource, SourceTier, normalize};

/// Default snapshot TTL: 6 hours.
const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Configuration for the station cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a snapshot is served without attempting a refresh.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

/// One immutable generation of the canonical station list.
///
/// Replaced wholesale on refresh, never mutated: readers holding an `Arc` to
/// a snapshot keep a consistent view while a refresh installs the next one.
#[derive(Debug)]
pub struct CacheSnapshot {
    /// The canonical stations.
    pub stations: Vec<Station>,
    /// Wall-clock fetch time, for observability.
    pub fetched_at: DateTime<Utc>,
    /// Which source tier supplied the raw payload.
    pub tier: SourceTier,
    /// Normalization counters for this generation.
    pub stats: NormalizeStats,
    /// Monotonic fetch instant used for TTL checks.
    fetched: Instant,
}

impl CacheSnapshot {
    /// Age of this snapshot.
    pub fn age(&self) -> Duration {
        self.fetched.elapsed()
    }
}

/// TTL cache over the raw source chain.
pub struct StationCache {
    source: RawSource,
    ttl: Duration,
    snapshot: RwLock<Option<Arc<CacheSnapshot>>>,
    /// Single-flight guard: at most one refresh runs per process.
    refresh_lock: Mutex<()>,
}

impl StationCache {
    /// Create a cache over the given source.
    pub fn new(source: RawSource, config: CacheConfig) -> Self {
        Self {
            source,
            ttl: config.ttl,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Get the current canonical snapshot, refreshing if needed.
    ///
    /// Cold cache: blocks on a fetch and fails only when every source tier
    /// is exhausted. Stale cache: attempts one refresh; if another refresh
    /// is already in flight, or the refresh fails, the pre-refresh snapshot
    /// is served instead.
    pub async fn stations(&self) -> Result<Arc<CacheSnapshot>, ProviderError> {
        match self.current().await {
            Some(snapshot) if snapshot.age() < self.ttl => Ok(snapshot),
            Some(stale) => Ok(self.refresh_stale(stale).await),
            None => self.fill_cold().await,
        }
    }

    async fn current(&self) -> Option<Arc<CacheSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Refresh a stale snapshot, serving the old one on any failure.
    async fn refresh_stale(&self, stale: Arc<CacheSnapshot>) -> Arc<CacheSnapshot> {
        // Losing the race means a refresh is in flight; the pre-refresh
        // snapshot is still good enough for this query.
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            return stale;
        };

        // The previous holder may have installed a fresh snapshot between
        // our staleness check and acquiring the lock.
        if let Some(current) = self.current().await
            && current.age() < self.ttl
        {
            return current;
        }

        match self.fetch_snapshot().await {
            Ok(fresh) => {
                self.install(fresh.clone()).await;
                fresh
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    age_secs = stale.age().as_secs(),
                    "refresh failed, serving stale snapshot"
                );
                stale
            }
        }
    }

    /// Populate an empty cache, waiting behind any in-flight refresh.
    async fn fill_cold(&self) -> Result<Arc<CacheSnapshot>, ProviderError> {
        let _guard = self.refresh_lock.lock().await;

        // The refresh we queued behind may already have filled the cache.
        if let Some(snapshot) = self.current().await {
            return Ok(snapshot);
        }

        let fresh = self.fetch_snapshot().await?;
        self.install(fresh.clone()).await;
        Ok(fresh)
    }

    async fn fetch_snapshot(&self) -> Result<Arc<CacheSnapshot>, ProviderError> {
        let (payload, tier) = self.source.fetch_raw().await?;
        let (stations, stats) = normalize(&payload);

        // An all-rejected batch must not replace a good snapshot.
        if stations.is_empty() {
            return Err(ProviderError::EmptyPayload);
        }

        tracing::info!(
            tier = %tier,
            processed = stats.processed,
            rejected = stats.rejected,
            "normalized station snapshot"
        );

        Ok(Arc::new(CacheSnapshot {
            stations,
            fetched_at: Utc::now(),
            tier,
            stats,
            fetched: Instant::now(),
        }))
    }

    async fn install(&self, snapshot: Arc<CacheSnapshot>) {
        *self.snapshot.write().await = Some(snapshot);
    }
}
