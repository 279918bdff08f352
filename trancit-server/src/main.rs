use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trancit_server::accounts::AccountStore;
use trancit_server::cache::{CachedGeocoder, CachedRouteProvider};
use trancit_server::config::AppConfig;
use trancit_server::fare::FareTable;
use trancit_server::geocode::{AddressResolver, NominatimClient};
use trancit_server::persist::JsonSnapshot;
use trancit_server::planner::RoutePlanner;
use trancit_server::routing::OsrmClient;
use trancit_server::saved::RouteStore;
use trancit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // External services, each behind a cache
    let geocoder = CachedGeocoder::new(
        Arc::new(NominatimClient::new(config.nominatim.clone())?),
        &config.cache,
    );
    let router = CachedRouteProvider::new(
        Arc::new(OsrmClient::new(config.osrm.clone())?),
        &config.cache,
    );
    info!(
        geocoder = %config.nominatim.base_url,
        router = %config.osrm.base_url,
        "configured external services"
    );

    let planner = RoutePlanner::new(
        AddressResolver::new(Arc::new(geocoder)),
        Arc::new(router),
        FareTable::default(),
    );

    // Persistent stores
    let accounts = AccountStore::open(JsonSnapshot::new(config.accounts_path())).await?;
    let routes = RouteStore::open(JsonSnapshot::new(config.routes_path())).await?;

    let app = create_router(AppState::new(planner, accounts, routes));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, "TranCIT route planner listening");

    axum::serve(listener, app).await?;
    Ok(())
}
