//! NOAA CO-OPS metadata API station source.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{Coordinate, Station, StationId};

use super::directory::StationSource;
use super::error::StationError;

/// Default base URL for the CO-OPS metadata API.
const DEFAULT_BASE_URL: &str = "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi";

/// Organization prefix for NOAA station ids.
const NOAA_ORG: &str = "NOAA";

/// Wrapper for the stations response.
#[derive(Debug, Deserialize)]
struct StationsResponse {
    stations: Vec<NoaaStationDto>,
}

/// Minimal DTO for a NOAA station. Ids arrive as strings; coordinates as
/// `lat`/`lng`.
#[derive(Debug, Clone, Deserialize)]
struct NoaaStationDto {
    id: String,
    name: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    state: Option<String>,
}

/// Configuration for the NOAA station client.
#[derive(Debug, Clone)]
pub struct NoaaStationClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NoaaStationClientConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NoaaStationClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the NOAA station list.
#[derive(Debug, Clone)]
pub struct NoaaStationClient {
    http: reqwest::Client,
    base_url: String,
}

impl NoaaStationClient {
    pub fn new(config: NoaaStationClientConfig) -> Result<Self, StationError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StationError::UpstreamUnavailable(format!("HTTP client setup: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch all tide prediction stations.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, StationError> {
        let url = format!("{}/stations.json", self.base_url);
        debug!(%url, "fetching NOAA station list");

        let response = self
            .http
            .get(&url)
            .query(&[("type", "tidepredictions")])
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StationError::UpstreamUnavailable(format!(
                "station source refused request ({status})"
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StationError::UpstreamUnavailable(format!(
                "API error {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.text().await?;
        parse_stations(&body)
    }
}

impl StationSource for NoaaStationClient {
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Station>, StationError>> {
        self.fetch_stations().boxed()
    }
}

/// Parse a CO-OPS station list body, skipping entries we cannot represent.
fn parse_stations(body: &str) -> Result<Vec<Station>, StationError> {
    let response: StationsResponse = serde_json::from_str(body)
        .map_err(|e| StationError::InvalidUpstreamData(format!("JSON parse error: {e}")))?;

    Ok(response
        .stations
        .into_iter()
        .filter_map(|dto| match convert_station(&dto) {
            Ok(station) => Some(station),
            Err(e) => {
                warn!(id = %dto.id, error = %e, "skipping NOAA station");
                None
            }
        })
        .collect())
}

fn convert_station(dto: &NoaaStationDto) -> Result<Station, StationError> {
    let id = StationId::from_parts(NOAA_ORG, dto.id.trim())?;
    let coordinate = Coordinate::new(dto.lat, dto.lng)?;
    let name = match dto.state.as_deref().map(str::trim) {
        Some(state) if !state.is_empty() => format!("{}, {}", dto.name.trim(), state),
        _ => dto.name.trim().to_string(),
    };

    Ok(Station {
        id,
        name,
        coordinate,
        organization: NOAA_ORG.to_string(),
        is_authoritative: true,
    })
}
