//! Turns raw provider payloads into classified tide results.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::domain::{ClassifiedTide, Coordinate, ResolvedStation, TideExtreme, TideKind, TideResult};
use crate::stations::StationDirectory;

use super::error::TideError;
use super::types::{RawExtreme, RawExtremesPayload};
use super::zone::StationZone;

/// Status the provider reports in the body of a successful response.
const PROVIDER_OK: u16 = 200;

/// Third-party source of tide predictions.
pub trait TideProvider: Send + Sync {
    /// Fetch predicted extremes for the given location.
    fn fetch_extremes(
        &self,
        coord: Coordinate,
    ) -> BoxFuture<'_, Result<RawExtremesPayload, TideError>>;
}

/// Resolves tide extremes by coordinate or by station.
#[derive(Clone)]
pub struct TideAggregator {
    provider: Arc<dyn TideProvider>,
    stations: StationDirectory,
    timeout: Duration,
}

impl TideAggregator {
    /// `timeout` bounds each provider call.
    pub fn new(
        provider: Arc<dyn TideProvider>,
        stations: StationDirectory,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            stations,
            timeout,
        }
    }

    /// Tide extremes near `coord`, classified against `evaluated_at`.
    pub async fn by_coordinate(
        &self,
        coord: Coordinate,
        evaluated_at: DateTime<Utc>,
    ) -> Result<TideResult, TideError> {
        debug!(%coord, "fetching tides by coordinate");

        let payload = tokio::time::timeout(self.timeout, self.provider.fetch_extremes(coord))
            .await
            .map_err(|_| {
                warn!(%coord, timeout = ?self.timeout, "tide provider timed out");
                TideError::UpstreamTimeout
            })??;

        build_result(coord, payload, evaluated_at)
    }

    /// Tide extremes for a directory station.
    ///
    /// The station's name and id come from the directory, whatever the
    /// provider echoes back.
    pub async fn by_station(
        &self,
        id: &str,
        evaluated_at: DateTime<Utc>,
    ) -> Result<TideResult, TideError> {
        let station = self.stations.get(id).await?;
        debug!(station = %station.id, "fetching tides by station");

        let mut result = self.by_coordinate(station.coordinate, evaluated_at).await?;
        result.station.id = Some(station.id);
        result.station.name = station.name;
        Ok(result)
    }
}

/// Validate a payload and classify its extremes.
///
/// Fails only when the payload as a whole is unusable. Individual extremes
/// that cannot be parsed are dropped, and an unrecognised timezone falls
/// back to UTC.
pub fn build_result(
    requested: Coordinate,
    payload: RawExtremesPayload,
    evaluated_at: DateTime<Utc>,
) -> Result<TideResult, TideError> {
    let status = payload.status.unwrap_or(PROVIDER_OK);
    if status != PROVIDER_OK {
        let message = payload
            .error
            .unwrap_or_else(|| "no error message given".to_string());
        return Err(TideError::InvalidUpstreamData(format!(
            "provider status {status}: {message}"
        )));
    }

    let timezone = payload
        .timezone
        .filter(|tz| !tz.trim().is_empty())
        .ok_or_else(|| TideError::InvalidUpstreamData("payload has no timezone".to_string()))?;
    let station_name = payload
        .station
        .ok_or_else(|| TideError::InvalidUpstreamData("payload has no station".to_string()))?;
    let raw_extremes = payload
        .extremes
        .ok_or_else(|| TideError::InvalidUpstreamData("payload has no extremes list".to_string()))?;

    let zone = StationZone::resolve_or_utc(&timezone);

    let total = raw_extremes.len();
    let tides: Vec<ClassifiedTide> = raw_extremes
        .into_iter()
        .filter_map(|raw| classify(raw, zone, evaluated_at))
        .collect();
    if tides.len() < total {
        warn!(
            dropped = total - tides.len(),
            total, "dropped unparsable tide extremes"
        );
    }

    Ok(TideResult {
        requested,
        station: ResolvedStation {
            id: None,
            name: station_name,
            timezone,
        },
        response_lat: payload.response_lat.unwrap_or(requested.lat()),
        response_lon: payload.response_lon.unwrap_or(requested.lon()),
        tides,
        evaluated_at: zone.project(evaluated_at),
        evaluated_at_display: zone.display(evaluated_at),
        provider_status: status,
        provider_copyright: payload.copyright.filter(|c| !c.is_empty()),
    })
}

/// Classify one raw extreme, or `None` if any part of it is unusable.
fn classify(
    raw: RawExtreme,
    zone: StationZone,
    evaluated_at: DateTime<Utc>,
) -> Option<ClassifiedTide> {
    let date = raw.date?;
    let timestamp = match DateTime::parse_from_rfc3339(date.trim()) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            debug!(%date, error = %e, "unparsable extreme timestamp");
            return None;
        }
    };
    let kind = TideKind::parse(raw.kind.as_deref()?)?;
    let height_meters = raw.height.filter(|h| h.is_finite())?;

    let extreme = TideExtreme {
        timestamp,
        kind,
        height_meters,
    };
    Some(ClassifiedTide::new(
        extreme,
        date,
        zone.project(timestamp),
        evaluated_at,
    ))
}
