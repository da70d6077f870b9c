//! Tide extremes aggregation.
//!
//! Fetches predicted high and low water from a third-party provider
//! (WorldTides), resolves the station's local timezone, and classifies
//! each event as past or future relative to the request time.
//!
//! Key characteristics of the provider data:
//! - Timezones are usually IANA names but not guaranteed; unknown ones
//!   degrade to UTC
//! - Individual extremes may be malformed; those are dropped, not fatal
//! - Event order is the provider's and is never re-sorted

mod aggregator;
mod client;
mod error;
mod types;
mod zone;

pub use aggregator::{TideAggregator, TideProvider, build_result};
pub use client::{WorldTidesClient, WorldTidesConfig};
pub use error::TideError;
pub use types::{RawExtreme, RawExtremesPayload};
pub use zone::{StationZone, UnknownZone};
