//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen address.
const DEFAULT_ADDR: &str = "0.0.0.0:5000";

/// Default upstream timeout in seconds.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// How often to refresh the station directory (24 hours).
const DEFAULT_STATION_REFRESH_SECS: u64 = 24 * 60 * 60;

/// Error from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {name}={value:?}: {reason}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
    reason: String,
}

/// Configuration for the tide server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WorldTides API key.
    pub worldtides_api_key: String,

    /// Override for the WorldTides endpoint.
    pub worldtides_base_url: Option<String>,

    /// Override for the NOAA metadata endpoint.
    pub noaa_base_url: Option<String>,

    /// Load stations from this JSON file instead of NOAA.
    pub stations_file: Option<PathBuf>,

    /// Address to listen on.
    pub listen_addr: SocketAddr,

    /// Bound on every upstream call.
    pub upstream_timeout: Duration,

    /// Period of the background station refresh.
    pub station_refresh_interval: Duration,
}

impl ServerConfig {
    /// Read configuration from the process environment, after loading a
    /// `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal in production.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let listen_addr = match non_empty("TIDE_SERVER_ADDR") {
            Some(value) => value.trim().parse().map_err(|e: std::net::AddrParseError| ConfigError {
                name: "TIDE_SERVER_ADDR",
                value,
                reason: e.to_string(),
            })?,
            None => DEFAULT_ADDR.parse().map_err(|e: std::net::AddrParseError| ConfigError {
                name: "TIDE_SERVER_ADDR",
                value: DEFAULT_ADDR.to_string(),
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            worldtides_api_key: non_empty("WORLDTIDES_INFO_API_KEY").unwrap_or_default(),
            worldtides_base_url: non_empty("WORLDTIDES_BASE_URL"),
            noaa_base_url: non_empty("NOAA_STATIONS_BASE_URL"),
            stations_file: non_empty("STATIONS_FILE").map(PathBuf::from),
            listen_addr,
            upstream_timeout: Duration::from_secs(seconds(
                "UPSTREAM_TIMEOUT_SECS",
                non_empty("UPSTREAM_TIMEOUT_SECS"),
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
            station_refresh_interval: Duration::from_secs(seconds(
                "STATION_REFRESH_SECS",
                non_empty("STATION_REFRESH_SECS"),
                DEFAULT_STATION_REFRESH_SECS,
            )?),
        })
    }

    /// Upstream timeout in whole seconds, for the HTTP client configs.
    pub fn upstream_timeout_secs(&self) -> u64 {
        self.upstream_timeout.as_secs()
    }
}

/// Parse a positive number of seconds, or use `default` when unset.
fn seconds(name: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError {
            name,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError {
            name,
            value,
            reason: e.to_string(),
        }),
    }
}
