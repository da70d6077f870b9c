//! WorldTides v3 HTTP client.
//!
//! Requests extremes in station local time against chart datum, the same
//! query the web front end has always issued.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::Coordinate;

use super::aggregator::TideProvider;
use super::error::TideError;
use super::types::RawExtremesPayload;

/// Default base URL for the WorldTides API.
const DEFAULT_BASE_URL: &str = "https://www.worldtides.info/api/v3";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Vertical datum for heights. Chart datum is what tide tables print.
const DATUM: &str = "CD";

/// Configuration for the WorldTides client.
#[derive(Debug, Clone)]
pub struct WorldTidesConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production WorldTides)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl WorldTidesConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// WorldTides API client.
///
/// Uses a semaphore to limit concurrent requests; every request spends
/// API credits.
#[derive(Debug, Clone)]
pub struct WorldTidesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl WorldTidesClient {
    pub fn new(config: WorldTidesConfig) -> Result<Self, TideError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TideError::Internal(format!("HTTP client setup: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Get predicted extremes near a coordinate.
    pub async fn get_extremes(&self, coord: Coordinate) -> Result<RawExtremesPayload, TideError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| TideError::Internal("semaphore closed".to_string()))?;

        debug!(%coord, "requesting WorldTides extremes");

        // `extremes` and `localtime` are bare flags; reqwest cannot express
        // valueless parameters, so they live in the path.
        let url = format!("{}?extremes&localtime", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("datum", DATUM.to_string()),
                ("lat", coord.lat().to_string()),
                ("lon", coord.lon().to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TideError::UpstreamUnavailable(
                "unauthorized: check WORLDTIDES_INFO_API_KEY".to_string(),
            ));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TideError::UpstreamUnavailable(
                "rate limited by WorldTides".to_string(),
            ));
        }

        // WorldTides reports request errors (bad key, no credits) as 400 with
        // a JSON body, which the aggregator turns into a readable message.
        let body = response.text().await?;
        if status.is_server_error() {
            return Err(TideError::UpstreamUnavailable(format!(
                "API error {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        parse_payload(&body)
    }
}

impl TideProvider for WorldTidesClient {
    fn fetch_extremes(
        &self,
        coord: Coordinate,
    ) -> BoxFuture<'_, Result<RawExtremesPayload, TideError>> {
        self.get_extremes(coord).boxed()
    }
}

fn parse_payload(body: &str) -> Result<RawExtremesPayload, TideError> {
    serde_json::from_str(body).map_err(|e| {
        TideError::InvalidUpstreamData(format!(
            "JSON parse error: {} (body: {})",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })
}
