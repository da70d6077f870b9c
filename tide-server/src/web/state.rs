//! Application state for the web layer.

use crate::stations::StationDirectory;
use crate::tides::TideAggregator;

/// Shared application state.
///
/// Both members are cheap handles over shared internals.
#[derive(Clone)]
pub struct AppState {
    /// Station lookup and refresh
    pub stations: StationDirectory,

    /// Tide extremes by coordinate or station
    pub tides: TideAggregator,
}

impl AppState {
    /// Create a new app state.
    pub fn new(stations: StationDirectory, tides: TideAggregator) -> Self {
        Self { stations, tides }
    }
}
