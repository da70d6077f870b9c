//! Tide aggregation error types.

use crate::stations::StationError;

/// Errors from fetching and classifying tide extremes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TideError {
    /// Resolving the station through the directory failed
    #[error(transparent)]
    Station(#[from] StationError),

    /// Tide provider could not be reached or refused the request
    #[error("tide provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Tide provider did not answer within the configured timeout
    #[error("tide provider timed out")]
    UpstreamTimeout,

    /// Provider payload cannot yield a meaningful result
    #[error("invalid tide data: {0}")]
    InvalidUpstreamData(String),

    /// Unexpected failure inside the service
    #[error("internal error: {0}")]
    Internal(String),
}

impl TideError {
    /// Stable category name for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            TideError::Station(e) => e.kind(),
            TideError::UpstreamUnavailable(_) => "upstream_unavailable",
            TideError::UpstreamTimeout => "upstream_timeout",
            TideError::InvalidUpstreamData(_) => "invalid_upstream_data",
            TideError::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for TideError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TideError::UpstreamTimeout
        } else if err.is_decode() {
            TideError::InvalidUpstreamData(err.to_string())
        } else {
            TideError::UpstreamUnavailable(err.to_string())
        }
    }
}
