//! Geographic coordinate type.

use std::fmt;

use serde::Serialize;

/// Error returned when a latitude/longitude pair is out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: String,
}

impl InvalidCoordinate {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A point on the Earth's surface in decimal degrees.
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180];
/// any `Coordinate` value is valid by construction.
///
/// # Examples
///
/// ```
/// use tide_server::domain::Coordinate;
///
/// let plum_island = Coordinate::new(42.7101, -70.7886).unwrap();
/// assert_eq!(plum_island.lat(), 42.7101);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(0.0, -180.5).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Validate and build a coordinate.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate::new("latitude and longitude must be finite"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate::new(format!(
                "latitude {lat} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate::new(format!(
                "longitude {lon} outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Parse the `"lat,lon"` form used in request paths.
    ///
    /// Surrounding whitespace around either number is ignored.
    pub fn parse_pair(s: &str) -> Result<Self, InvalidCoordinate> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| InvalidCoordinate::new(format!("expected \"lat,lon\", got {s:?}")))?;

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| InvalidCoordinate::new(format!("latitude {:?} is not a number", lat)))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| InvalidCoordinate::new(format!("longitude {:?} is not a number", lon)))?;

        Self::new(lat, lon)
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}
