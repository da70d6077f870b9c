use std::process::ExitCode;
use std::sync::Arc;

use tide_server::config::ServerConfig;
use tide_server::stations::{
    FileStationSource, NoaaStationClient, NoaaStationClientConfig, StationDirectory, StationSource,
};
use tide_server::tides::{TideAggregator, WorldTidesClient, WorldTidesConfig};
use tide_server::web::{AppState, create_router};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tide_server=info,tower_http=info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if config.worldtides_api_key.is_empty() {
        warn!("WORLDTIDES_INFO_API_KEY not set. Tide lookups will fail.");
    }

    // Station source: a local file if configured, otherwise NOAA
    let source: Arc<dyn StationSource> = match &config.stations_file {
        Some(path) => {
            info!(path = %path.display(), "loading stations from file");
            Arc::new(FileStationSource::new(path))
        }
        None => {
            let mut noaa_config =
                NoaaStationClientConfig::new().with_timeout(config.upstream_timeout_secs());
            if let Some(url) = &config.noaa_base_url {
                noaa_config = noaa_config.with_base_url(url);
            }
            match NoaaStationClient::new(noaa_config) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    error!(error = %e, "failed to create NOAA station client");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    let stations = StationDirectory::new(source, config.upstream_timeout);

    // Initial load. Keep serving on failure: nearest/by-id report an empty
    // directory until a refresh succeeds.
    match stations.refresh().await {
        Ok(snapshot) => info!(count = snapshot.len(), "loaded stations"),
        Err(e) => warn!(error = %e, "initial station load failed; starting with empty directory"),
    }

    // Spawn background task to refresh stations periodically
    let refresher = stations.clone();
    let period = config.station_refresh_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match refresher.refresh().await {
                Ok(snapshot) => info!(
                    count = snapshot.len(),
                    version = snapshot.version(),
                    "refreshed stations"
                ),
                Err(e) => warn!(error = %e, "scheduled station refresh failed"),
            }
        }
    });

    // Create tide provider
    let mut wt_config = WorldTidesConfig::new(&config.worldtides_api_key)
        .with_timeout(config.upstream_timeout_secs());
    if let Some(url) = &config.worldtides_base_url {
        wt_config = wt_config.with_base_url(url);
    }
    let provider = match WorldTidesClient::new(wt_config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create WorldTides client");
            return ExitCode::FAILURE;
        }
    };

    let tides = TideAggregator::new(Arc::new(provider), stations.clone(), config.upstream_timeout);
    let app = create_router(AppState::new(stations, tides));

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.listen_addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %config.listen_addr, "tide server listening");
    info!("  GET  /health");
    info!("  GET  /json/tides/by-location/{{lat}},{{lon}}");
    info!("  GET  /json/tides/by-station/{{id}}");
    info!("  GET  /json/stations");
    info!("  POST /json/stations/refresh");
    info!("  GET  /json/station/by-id/{{id}}");
    info!("  GET  /json/station/by-nearest/{{lat}},{{lon}}");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
