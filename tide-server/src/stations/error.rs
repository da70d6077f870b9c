//! Station directory error types.

use crate::domain::{InvalidCoordinate, InvalidStationId};

/// Errors from station lookup and refresh.
///
/// `Clone` so that one refresh outcome can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StationError {
    /// Malformed station id or coordinate
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No station with this id in the current snapshot
    #[error("station not found: {0}")]
    NotFound(String),

    /// Nearest lookup before any successful refresh
    #[error("station directory is empty")]
    EmptyDirectory,

    /// Station source could not be reached or refused the request
    #[error("station source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Station source did not answer within the configured timeout
    #[error("station source timed out")]
    UpstreamTimeout,

    /// Station source answered with something we cannot use
    #[error("invalid station data: {0}")]
    InvalidUpstreamData(String),

    /// Refresh task failed inside the service
    #[error("internal error: {0}")]
    Internal(String),
}

impl StationError {
    /// Stable category name for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            StationError::InvalidArgument(_) => "invalid_argument",
            StationError::NotFound(_) => "not_found",
            StationError::EmptyDirectory => "empty_directory",
            StationError::UpstreamUnavailable(_) => "upstream_unavailable",
            StationError::UpstreamTimeout => "upstream_timeout",
            StationError::InvalidUpstreamData(_) => "invalid_upstream_data",
            StationError::Internal(_) => "internal_error",
        }
    }
}

impl From<InvalidStationId> for StationError {
    fn from(err: InvalidStationId) -> Self {
        StationError::InvalidArgument(err.to_string())
    }
}

impl From<InvalidCoordinate> for StationError {
    fn from(err: InvalidCoordinate) -> Self {
        StationError::InvalidArgument(err.to_string())
    }
}

impl From<reqwest::Error> for StationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StationError::UpstreamTimeout
        } else if err.is_decode() {
            StationError::InvalidUpstreamData(err.to_string())
        } else {
            StationError::UpstreamUnavailable(err.to_string())
        }
    }
}
