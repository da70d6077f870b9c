//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::domain::{Coordinate, InvalidCoordinate};
use crate::stations::StationError;
use crate::tides::TideError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/json/tides/by-location/:location", get(tides_by_location))
        .route("/json/tides/by-station/:id", get(tides_by_station))
        .route("/json/stations", get(list_stations))
        .route(
            "/json/stations/refresh",
            get(refresh_stations).post(refresh_stations),
        )
        .route("/json/station/by-id/:id", get(station_by_id))
        .route("/json/station/by-nearest/:location", get(station_by_nearest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Tides near a coordinate, e.g. `/json/tides/by-location/42.665,-70.9119`.
async fn tides_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<TidesResponse>, AppError> {
    let coord = Coordinate::parse_pair(&location)?;
    debug!(%coord, "tides by location");

    let result = state.tides.by_coordinate(coord, Utc::now()).await?;
    Ok(Json(TidesResponse::from_result(&result)))
}

/// Tides at a directory station, e.g. `/json/tides/by-station/NOAA:8440452`.
async fn tides_by_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TidesResponse>, AppError> {
    debug!(%id, "tides by station");

    let result = state.tides.by_station(&id, Utc::now()).await?;
    Ok(Json(TidesResponse::from_result(&result)))
}

/// All cached stations.
async fn list_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let snapshot = state.stations.snapshot().await;
    Json(StationsResponse::from_snapshot(&snapshot))
}

/// Refresh the station cache and return the new list.
async fn refresh_stations(
    State(state): State<AppState>,
) -> Result<Json<StationsResponse>, AppError> {
    info!("station refresh requested");

    let snapshot = state.stations.refresh().await?;
    Ok(Json(StationsResponse::from_snapshot(&snapshot)))
}

/// A station by id, e.g. `/json/station/by-id/NOAA:8441241`.
async fn station_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationResponse>, AppError> {
    let station = state.stations.get(&id).await?;
    Ok(Json(StationResponse::new(&station)))
}

/// The station nearest a coordinate, e.g. `/json/station/by-nearest/42.665,-70.9119`.
async fn station_by_nearest(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<StationResponse>, AppError> {
    let coord = Coordinate::parse_pair(&location)?;
    let station = state.stations.nearest(coord).await?;
    Ok(Json(StationResponse::new(&station)))
}

/// Application error type.
///
/// Carries the stable error category so every failure reaches the client
/// as a structured body with a predictable status.
#[derive(Debug)]
pub struct AppError {
    kind: &'static str,
    message: String,
}

impl AppError {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// HTTP status for this error's category.
    pub fn status(&self) -> StatusCode {
        match self.kind {
            "invalid_argument" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "empty_directory" => StatusCode::SERVICE_UNAVAILABLE,
            "upstream_unavailable" | "invalid_upstream_data" => StatusCode::BAD_GATEWAY,
            "upstream_timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvalidCoordinate> for AppError {
    fn from(e: InvalidCoordinate) -> Self {
        AppError::new("invalid_argument", e.to_string())
    }
}

impl From<StationError> for AppError {
    fn from(e: StationError) -> Self {
        AppError::new(e.kind(), e.to_string())
    }
}

impl From<TideError> for AppError {
    fn from(e: TideError) -> Self {
        AppError::new(e.kind(), e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            warn!(%status, kind = self.kind, message = %self.message, "request failed");
        } else {
            debug!(%status, kind = self.kind, message = %self.message, "request rejected");
        }

        let body = Json(ErrorResponse {
            status: "error",
            kind: self.kind,
            message: self.message,
        });
        (status, body).into_response()
    }
}
