//! Data transfer objects for web responses.
//!
//! Field names match the JSON the front end already consumes.

use serde::Serialize;

use crate::domain::{ClassifiedTide, Station, TemporalClass, TideResult};
use crate::stations::StationSnapshot;

/// Status string for successful station responses.
const OK: &str = "OK";

/// One tide extreme.
#[derive(Debug, Serialize)]
pub struct TideView {
    /// `MM-DD` in station local time
    pub date: String,

    /// Abbreviated weekday
    pub day: String,

    /// Height in metres above chart datum
    pub height: f64,

    /// Timestamp as the provider sent it
    #[serde(rename = "iso-date")]
    pub iso_date: String,

    /// `prior` for events before the request, otherwise `future`
    pub prior: &'static str,

    /// `HH:MM` in station local time
    pub time: String,

    /// `High` or `Low`
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Response for tide lookups.
#[derive(Debug, Serialize)]
pub struct TidesResponse {
    pub req_lat: f64,
    pub req_lon: f64,

    /// Request time in station local time
    pub req_timestamp: String,

    pub resp_lat: f64,
    pub resp_lon: f64,

    /// Station name
    pub station: String,

    /// Directory id, present for by-station lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,

    /// Timezone name as reported by the provider
    pub station_tz: String,

    /// Provider status code
    pub status: u16,

    /// Provider attribution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wti_copyright: Option<String>,

    pub tides: Vec<TideView>,
}

/// A station.
#[derive(Debug, Serialize)]
pub struct StationView {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub name: String,

    /// Government-operated station
    pub noaa: bool,

    pub org: String,
    pub org_id: String,
}

/// Response for a single station.
#[derive(Debug, Serialize)]
pub struct StationResponse {
    pub status: &'static str,
    pub station: StationView,
}

/// Response for the station list.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub status: &'static str,

    /// Snapshot version the list was read from
    pub version: u64,

    pub station_count: usize,
    pub stations: Vec<StationView>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `error`
    pub status: &'static str,

    /// Stable error category, e.g. `not_found`
    pub kind: &'static str,

    /// Human-readable message
    pub message: String,
}

// Conversion implementations

impl TideView {
    /// Create from a classified tide.
    pub fn from_tide(tide: &ClassifiedTide) -> Self {
        Self {
            date: tide.local_date.clone(),
            day: tide.local_day.clone(),
            height: tide.extreme.height_meters,
            iso_date: tide.provider_timestamp.clone(),
            prior: match tide.temporal_class {
                TemporalClass::Past => "prior",
                TemporalClass::Future => "future",
            },
            time: tide.local_time.clone(),
            kind: tide.extreme.kind.as_str(),
        }
    }
}

impl TidesResponse {
    /// Create from a tide result.
    pub fn from_result(result: &TideResult) -> Self {
        Self {
            req_lat: result.requested.lat(),
            req_lon: result.requested.lon(),
            req_timestamp: result.evaluated_at_display.clone(),
            resp_lat: result.response_lat,
            resp_lon: result.response_lon,
            station: result.station.name.clone(),
            station_id: result.station.id.as_ref().map(|id| id.to_string()),
            station_tz: result.station.timezone.clone(),
            status: result.provider_status,
            wti_copyright: result.provider_copyright.clone(),
            tides: result.tides.iter().map(TideView::from_tide).collect(),
        }
    }
}

impl StationView {
    /// Create from a domain Station.
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id.to_string(),
            lat: station.coordinate.lat(),
            lon: station.coordinate.lon(),
            name: station.name.clone(),
            noaa: station.is_authoritative,
            org: station.organization.clone(),
            org_id: station.id.org_id().to_string(),
        }
    }
}

impl StationResponse {
    pub fn new(station: &Station) -> Self {
        Self {
            status: OK,
            station: StationView::from_station(station),
        }
    }
}

impl StationsResponse {
    /// List every station in a snapshot.
    pub fn from_snapshot(snapshot: &StationSnapshot) -> Self {
        Self {
            status: OK,
            version: snapshot.version(),
            station_count: snapshot.len(),
            stations: snapshot
                .stations()
                .iter()
                .map(StationView::from_station)
                .collect(),
        }
    }
}
