//! Tide station directory.
//!
//! Holds the full station list as an immutable snapshot, answers lookups
//! by id and by nearest coordinate, and refreshes from an upstream source
//! (the NOAA metadata API, or a local JSON file for offline use).

mod client;
mod directory;
mod error;
mod file;
mod snapshot;

pub use client::{NoaaStationClient, NoaaStationClientConfig};
pub use directory::{StationDirectory, StationSource};
pub use error::StationError;
pub use file::FileStationSource;
pub use snapshot::StationSnapshot;
