//! Immutable, versioned station snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{Coordinate, Station, StationId};
use crate::geo::distance_km;

use super::error::StationError;

/// A point-in-time copy of the full station list.
///
/// Never mutated after construction. Station ids are unique and the
/// insertion order of the upstream list is preserved.
#[derive(Debug)]
pub struct StationSnapshot {
    version: u64,
    fetched_at: Option<DateTime<Utc>>,
    stations: Vec<Station>,
    by_id: HashMap<StationId, usize>,
}

impl StationSnapshot {
    /// The snapshot a directory starts with, before any refresh.
    pub fn empty() -> Self {
        Self {
            version: 0,
            fetched_at: None,
            stations: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Validate an upstream station list and build a snapshot from it.
    ///
    /// Fails with `InvalidUpstreamData` if the list is empty or contains
    /// a duplicated id.
    pub fn build(
        version: u64,
        fetched_at: DateTime<Utc>,
        stations: Vec<Station>,
    ) -> Result<Self, StationError> {
        if stations.is_empty() {
            return Err(StationError::InvalidUpstreamData(
                "station list is empty".to_string(),
            ));
        }

        let mut by_id = HashMap::with_capacity(stations.len());
        for (i, station) in stations.iter().enumerate() {
            if by_id.insert(station.id.clone(), i).is_some() {
                return Err(StationError::InvalidUpstreamData(format!(
                    "duplicate station id {}",
                    station.id
                )));
            }
        }

        Ok(Self {
            version,
            fetched_at: Some(fetched_at),
            stations,
            by_id,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// When the upstream list was fetched; `None` for the initial empty snapshot.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// All stations in upstream order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Exact lookup by id.
    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.by_id.get(id).map(|&i| &self.stations[i])
    }

    /// The station closest to `coord`.
    ///
    /// Equal distances are broken by the lexicographically smallest id, so
    /// the answer does not depend on upstream ordering.
    pub fn nearest(&self, coord: Coordinate) -> Option<&Station> {
        self.stations
            .iter()
            .map(|s| (distance_km(coord, s.coordinate), s))
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)))
            .map(|(_, s)| s)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn station(id: &str, lat: f64, lon: f64) -> Station {
        let id = StationId::parse(id).unwrap();
        Station {
            name: format!("Station {}", id.org_id()),
            organization: id.org().to_string(),
            id,
            coordinate: Coordinate::new(lat, lon).unwrap(),
            is_authoritative: true,
        }
    }

    fn snapshot(stations: Vec<Station>) -> StationSnapshot {
        StationSnapshot::build(1, Utc::now(), stations).unwrap()
    }

    #[test]
    fn empty_snapshot() {
        let snap = StationSnapshot::empty();
        assert_eq!(snap.version(), 0);
        assert!(snap.fetched_at().is_none());
        assert!(snap.is_empty());
        assert!(snap.nearest(Coordinate::new(0.0, 0.0).unwrap()).is_none());
    }

    #[test]
    fn build_rejects_empty_list() {
        let err = StationSnapshot::build(1, Utc::now(), vec![]).unwrap_err();
        assert_eq!(err.kind(), "invalid_upstream_data");
    }

    #[test]
    fn build_rejects_duplicate_ids() {
        let err = StationSnapshot::build(
            1,
            Utc::now(),
            vec![
                station("NOAA:1", 42.0, -70.0),
                station("NOAA:2", 43.0, -70.0),
                station("NOAA:1", 44.0, -70.0),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            StationError::InvalidUpstreamData("duplicate station id NOAA:1".to_string())
        );
    }

    #[test]
    fn preserves_insertion_order() {
        let snap = snapshot(vec![
            station("NOAA:3", 0.0, 0.0),
            station("NOAA:1", 1.0, 0.0),
            station("NOAA:2", 2.0, 0.0),
        ]);
        let ids: Vec<_> = snap.stations().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["NOAA:3", "NOAA:1", "NOAA:2"]);
    }

    #[test]
    fn get_by_id() {
        let snap = snapshot(vec![station("NOAA:1", 0.0, 0.0), station("NOAA:2", 1.0, 1.0)]);
        let id = StationId::parse("NOAA:2").unwrap();
        assert_eq!(snap.get(&id).unwrap().coordinate.lat(), 1.0);
        assert!(snap.get(&StationId::parse("NOAA:9").unwrap()).is_none());
    }

    #[test]
    fn nearest_picks_closest() {
        let snap = snapshot(vec![
            station("NOAA:8443970", 42.3548, -71.0534),
            station("NOAA:8441241", 42.7101, -70.7886),
            station("NOAA:8418150", 43.6567, -70.2467),
        ]);
        let newburyport = Coordinate::new(42.8126, -70.8773).unwrap();
        assert_eq!(snap.nearest(newburyport).unwrap().id.as_str(), "NOAA:8441241");
    }

    #[test]
    fn nearest_tie_breaks_on_smallest_id() {
        // Both stations are exactly one degree of latitude from the query point.
        let snap = snapshot(vec![
            station("NOAA:B", 1.0, 0.0),
            station("NOAA:A", -1.0, 0.0),
        ]);
        let origin = Coordinate::new(0.0, 0.0).unwrap();
        assert_eq!(snap.nearest(origin).unwrap().id.as_str(), "NOAA:A");
    }

    #[test]
    fn nearest_exact_match() {
        let snap = snapshot(vec![station("NOAA:1", 10.0, 10.0), station("NOAA:2", 10.5, 10.0)]);
        let here = Coordinate::new(10.5, 10.0).unwrap();
        assert_eq!(snap.nearest(here).unwrap().id.as_str(), "NOAA:2");
    }
}
