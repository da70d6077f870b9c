//! Tide station identifiers and records.

use std::fmt;

use super::Coordinate;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id {input:?}: {reason}")]
pub struct InvalidStationId {
    input: String,
    reason: &'static str,
}

/// A globally unique station identifier of the form `<org>:<org_id>`.
///
/// The organization part is non-empty ASCII alphanumeric; the
/// organization-local id is non-empty and contains no whitespace or
/// further colons.
///
/// # Examples
///
/// ```
/// use tide_server::domain::StationId;
///
/// let id = StationId::parse("NOAA:8441241").unwrap();
/// assert_eq!(id.org(), "NOAA");
/// assert_eq!(id.org_id(), "8441241");
///
/// assert!(StationId::parse("8441241").is_err());
/// assert!(StationId::parse("NOAA:").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId {
    raw: String,
    split: usize,
}

impl StationId {
    /// Parse a station id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let invalid = |reason| InvalidStationId {
            input: s.to_string(),
            reason,
        };

        let (org, org_id) = s.split_once(':').ok_or_else(|| invalid("missing ':' separator"))?;

        if org.is_empty() {
            return Err(invalid("organization must not be empty"));
        }
        if !org.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid("organization must be ASCII alphanumeric"));
        }
        if org_id.is_empty() {
            return Err(invalid("organization id must not be empty"));
        }
        if org_id.chars().any(|c| c == ':' || c.is_whitespace()) {
            return Err(invalid("organization id must not contain ':' or whitespace"));
        }

        Ok(Self {
            raw: s.to_string(),
            split: org.len(),
        })
    }

    /// Build an id from its two halves.
    pub fn from_parts(org: &str, org_id: &str) -> Result<Self, InvalidStationId> {
        Self::parse(&format!("{org}:{org_id}"))
    }

    /// The full `<org>:<org_id>` form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The issuing organization, e.g. `NOAA`.
    pub fn org(&self) -> &str {
        &self.raw[..self.split]
    }

    /// The organization-local identifier, e.g. `8441241`.
    pub fn org_id(&self) -> &str {
        &self.raw[self.split + 1..]
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.raw)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A tide station known to the directory.
///
/// Stations are only created by a directory refresh and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub coordinate: Coordinate,
    pub organization: String,
    /// Whether the station is operated by a government agency.
    pub is_authoritative: bool,
}
