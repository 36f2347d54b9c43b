use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aeropath_api::{app, config::Config, AppState};
use aeropath_core::{AirlineCatalog, AirlineRecord, ReliabilityTable, StaticDirectory};
use aeropath_live::{HttpLiveSearchClient, LiveSearchCache, SystemClock, Verifier};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aeropath_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Aeropath API on port {}", config.server.port);

    let airlines: Vec<AirlineRecord> = load_json(&config.data.airlines_file);
    let cities: HashMap<String, String> = load_json(&config.data.cities_file);
    tracing::info!(airlines = airlines.len(), cities = cities.len(), "directory data loaded");

    let catalog = Arc::new(AirlineCatalog::new(airlines.clone()));
    let directory = Arc::new(StaticDirectory::new(cities, airlines));
    let reliability = Arc::new(ReliabilityTable::new(config.reliability.clone()));

    let cache = Arc::new(LiveSearchCache::with_ttl(
        Box::new(SystemClock),
        config.live_search.cache_ttl_minutes,
    ));
    let client = Arc::new(HttpLiveSearchClient::new(config.live_search.base_url.clone()));
    let verifier = Arc::new(Verifier::with_timeout(
        client,
        cache,
        Duration::from_secs(config.live_search.lookup_timeout_seconds),
    ));

    let app_state = AppState {
        catalog,
        reliability,
        directory,
        verifier,
        supported_programs: config.live_search.supported_programs.iter().cloned().collect(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn load_json<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {path}: {e}"));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("Failed to parse {path}: {e}"))
}
