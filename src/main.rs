use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use hotel_listings::auth::TokenVerifier;
use hotel_listings::client::{QueryCache, RemoteApi};
use hotel_listings::search::SessionRegistry;
use hotel_listings::{create_router, AppConfig, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Hotel Listings API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");

    tracing::info!("Using upstream API at {}", config.upstream_api_url);
    let remote = Arc::new(
        RemoteApi::new(&config.upstream_api_url, config.upstream_timeout)
            .expect("Failed to create upstream API client"),
    );

    let state = AppState::new(
        remote.clone(),
        remote,
        QueryCache::new(config.cache_ttl),
        TokenVerifier::new(&config.jwt_secret),
    )
    .with_sessions(SessionRegistry::with_limits(config.session_capacity, config.session_idle_ttl));
    spawn_cache_sweeper(state.clone(), config.cache_ttl);

    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Hotel Listings API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

/// Drops expired cache entries and idle search sessions once per TTL
fn spawn_cache_sweeper(state: AppState, ttl: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl.max(std::time::Duration::from_secs(1)));
        loop {
            interval.tick().await;
            state.cache.purge_stale().await;
            state.sessions.purge_idle().await;
        }
    });
}
