use std::sync::Arc;

use anyhow::Context;
use curator_api::{
    cache::{create_redis_client, Cache, CacheWriterHandle},
    config::Config,
    routes::{create_router, AppState},
    services::{
        providers::{Geocoder, GoogleGeocoder, NoopGeocoder},
        HaversineResolver, RankingPolicy, Recommender,
    },
    store::SignalStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curator_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Loading signal store");

    let store = Arc::new(
        SignalStore::load(&config.data_dir)
            .with_context(|| format!("failed to load snapshots from {}", config.data_dir.display()))?,
    );

    let (geocoder, cache_writer) = build_geocoder(&config)?;
    tracing::info!(provider = geocoder.name(), "Geocoder ready");

    let recommender = Recommender::new(
        store.clone(),
        geocoder,
        Arc::new(HaversineResolver),
        RankingPolicy {
            top_k: config.top_k,
            max_want_to_try: config.max_want_to_try,
        },
        config.geocode_timeout(),
    );

    let state = Arc::new(AppState { store, recommender });
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Google when an API key is configured, with a Redis cache when a URL is
/// configured; otherwise a geocoder that never resolves anything
fn build_geocoder(config: &Config) -> anyhow::Result<(Arc<dyn Geocoder>, Option<CacheWriterHandle>)> {
    let Some(api_key) = config.google_maps_api_key.clone() else {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set, distance scoring disabled");
        return Ok((Arc::new(NoopGeocoder), None));
    };

    let (cache, writer) = match config.redis_url.as_deref() {
        Some(url) => {
            let (cache, writer) = Cache::new(create_redis_client(url)?);
            tracing::info!("Geocode cache enabled");
            (Some(cache), Some(writer))
        }
        None => (None, None),
    };

    let geocoder = GoogleGeocoder::new(api_key, config.geocode_api_url.clone(), cache);
    Ok((Arc::new(geocoder), writer))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
