//! Great-circle distance between coordinates.
//!
//! Uses the haversine formula on a spherical Earth. Good to a fraction of
//! a percent, which is plenty for picking the nearest tide station.

use crate::domain::Coordinate;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between `a` and `b` in kilometres.
///
/// Symmetric, and zero for identical coordinates. Both inputs are
/// already range-checked by [`Coordinate::new`].
///
/// # Examples
///
/// ```
/// use tide_server::domain::Coordinate;
/// use tide_server::geo::distance_km;
///
/// let boston = Coordinate::new(42.3601, -71.0589).unwrap();
/// let portland = Coordinate::new(43.6591, -70.2568).unwrap();
/// let d = distance_km(boston, portland);
/// assert!((d - 158.0).abs() < 2.0);
/// ```
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon() - a.lon()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h marginally above 1 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}
