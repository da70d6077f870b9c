//! Station source backed by a local JSON file.
//!
//! Reads the same `{"stations": [...]}` shape that the list endpoint
//! serves, so a saved response can be replayed offline.

use std::path::{Path, PathBuf};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::domain::{Coordinate, Station, StationId};

use super::directory::StationSource;
use super::error::StationError;

#[derive(Debug, Deserialize)]
struct StationFile {
    stations: Vec<StationRecord>,
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    id: String,
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    org: Option<String>,
    #[serde(default)]
    noaa: bool,
}

/// Loads stations from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileStationSource {
    path: PathBuf,
}

impl FileStationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the station file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    ///
    /// Unlike the HTTP source, a bad record fails the whole load: the file
    /// is under local control and should be fixed rather than skipped.
    pub async fn load(&self) -> Result<Vec<Station>, StationError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StationError::UpstreamUnavailable(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let file: StationFile = serde_json::from_str(&contents).map_err(|e| {
            StationError::InvalidUpstreamData(format!(
                "failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;

        file.stations
            .into_iter()
            .map(|record| {
                let id = StationId::parse(&record.id)
                    .map_err(|e| StationError::InvalidUpstreamData(e.to_string()))?;
                let coordinate = Coordinate::new(record.lat, record.lon)
                    .map_err(|e| StationError::InvalidUpstreamData(format!("{id}: {e}")))?;
                let organization = record.org.unwrap_or_else(|| id.org().to_string());

                Ok(Station {
                    id,
                    name: record.name,
                    coordinate,
                    organization,
                    is_authoritative: record.noaa,
                })
            })
            .collect()
    }
}

impl StationSource for FileStationSource {
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<Station>, StationError>> {
        self.load().boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn loads_stations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(
            &path,
            r#"{
                "status": "OK",
                "station_count": 2,
                "stations": [
                    {"id": "NOAA:8441241", "lat": 42.7101, "lon": -70.7886,
                     "name": "Plum Island Sound (south end), Massachusetts",
                     "noaa": true, "org": "NOAA", "org_id": "8441241"},
                    {"id": "UKHO:0113", "lat": 51.5, "lon": 0.0, "name": "London Bridge"}
                ]
            }"#,
        )
        .unwrap();

        let source = FileStationSource::new(&path);
        let stations = source.load().await.unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id.as_str(), "NOAA:8441241");
        assert!(stations[0].is_authoritative);
        assert_eq!(stations[1].organization, "UKHO");
        assert!(!stations[1].is_authoritative);
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = FileStationSource::new("/nonexistent/path/stations.json");
        let err = source.load().await.unwrap_err();
        assert_eq!(err.kind(), "upstream_unavailable");
    }

    #[tokio::test]
    async fn bad_record_fails_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(
            &path,
            r#"{"stations": [{"id": "NOAA:1", "name": "Nowhere", "lat": 95.0, "lon": 0.0}]}"#,
        )
        .unwrap();

        let err = FileStationSource::new(&path).load().await.unwrap_err();
        assert_eq!(err.kind(), "invalid_upstream_data");
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStationSource::new(&path).fetch_all().await.unwrap_err();
        assert_eq!(err.kind(), "invalid_upstream_data");
    }
}
