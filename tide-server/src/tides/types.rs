//! WorldTides API response DTOs.
//!
//! These types map directly to the WorldTides v3 `extremes` response.
//! Everything is optional: the provider omits fields on error responses,
//! and the aggregator decides which absences are fatal.

use serde::Deserialize;

/// Response from a WorldTides `?extremes` request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtremesPayload {
    /// HTTP-like status code echoed in the body (200 on success).
    pub status: Option<u16>,

    /// Error text, present when `status` is not 200.
    pub error: Option<String>,

    /// Credits charged for this request.
    pub call_count: Option<u32>,

    /// Attribution string that must accompany the data.
    pub copyright: Option<String>,

    pub request_lat: Option<f64>,
    pub request_lon: Option<f64>,

    /// Coordinate the prediction was actually computed for.
    pub response_lat: Option<f64>,
    pub response_lon: Option<f64>,

    /// Tidal atlas or station source used for the prediction.
    pub atlas: Option<String>,

    /// Nearest named station, as the provider calls it.
    pub station: Option<String>,

    /// IANA name or offset for the station's local time.
    pub timezone: Option<String>,

    pub request_datum: Option<String>,
    pub response_datum: Option<String>,

    /// Extremes in provider order.
    pub extremes: Option<Vec<RawExtreme>>,
}

/// One extreme as sent by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RawExtreme {
    /// Unix timestamp (seconds).
    pub dt: Option<i64>,

    /// ISO 8601 timestamp with a fixed offset, e.g. `2025-06-11T18:31:50-04:00`.
    pub date: Option<String>,

    /// Height in metres relative to the response datum.
    pub height: Option<f64>,

    /// `High` or `Low`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_success_payload() {
        let json = r#"{
            "status": 200,
            "callCount": 1,
            "copyright": "Tidal data retrieved from www.worldtides.info.",
            "requestLat": 42.6724,
            "requestLon": -70.9443,
            "responseLat": 42.7101,
            "responseLon": -70.7886,
            "atlas": "NOAA",
            "station": "Plum Island Sound (south end), Massachusetts",
            "timezone": "America/New_York",
            "requestDatum": "CD",
            "responseDatum": "CD",
            "extremes": [
                {"dt": 1749681110, "date": "2025-06-11T18:31:50-04:00", "height": 0.483, "type": "Low"}
            ]
        }"#;

        let payload: RawExtremesPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.status, Some(200));
        assert_eq!(payload.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(payload.response_lon, Some(-70.7886));

        let extremes = payload.extremes.unwrap();
        assert_eq!(extremes.len(), 1);
        assert_eq!(extremes[0].kind.as_deref(), Some("Low"));
        assert_eq!(extremes[0].height, Some(0.483));
    }

    #[test]
    fn deserialize_error_payload() {
        let json = r#"{"status": 400, "error": "No location specified"}"#;
        let payload: RawExtremesPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.status, Some(400));
        assert_eq!(payload.error.as_deref(), Some("No location specified"));
        assert!(payload.extremes.is_none());
    }
}
