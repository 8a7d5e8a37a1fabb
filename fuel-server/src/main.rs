use std::net::SocketAddr;
use std::time::Duration;

use fuel_server::cache::{CacheConfig, StationCache};
use fuel_server::favorites::FavoritesStore;
use fuel_server::provider::{
    BackupStore, ProviderClient, ProviderClientConfig, RawSource, ShellFetchConfig, ShellFetcher,
};
use fuel_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Optional overrides; the defaults point at the production provider.
    let mut client_config = ProviderClientConfig::new();
    if let Ok(url) = std::env::var("FUEL_PROVIDER_URL") {
        client_config = client_config.with_base_url(url);
    }
    let provider_url = client_config.base_url.clone();

    let backup_path = std::env::var("FUEL_BACKUP_PATH")
        .unwrap_or_else(|_| "fuel_stations_backup.json".to_string());

    let client = ProviderClient::new(client_config).expect("failed to create provider client");
    let shell = ShellFetcher::new(ShellFetchConfig::new(provider_url));
    let backup = BackupStore::new(&backup_path);
    let source = RawSource::standard(client, shell, backup);

    let mut cache_config = CacheConfig::default();
    if let Ok(raw) = std::env::var("FUEL_CACHE_TTL_SECS")
        && let Ok(secs) = raw.parse::<u64>()
    {
        cache_config = cache_config.with_ttl(Duration::from_secs(secs));
    }

    let cache = StationCache::new(source, cache_config);
    let state = AppState::new(cache, FavoritesStore::new());
    let app = create_router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(%addr, backup = %backup_path, "fuel station service listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
