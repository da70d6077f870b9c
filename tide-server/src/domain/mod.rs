//! Domain types for the tide service.
//!
//! All types enforce their invariants at construction time, so code that
//! receives a `Coordinate` or `StationId` can trust its validity.

mod coordinate;
mod station;
mod tide;

pub use coordinate::{Coordinate, InvalidCoordinate};
pub use station::{InvalidStationId, Station, StationId};
pub use tide::{ClassifiedTide, ResolvedStation, TemporalClass, TideExtreme, TideKind, TideResult};
