//! Station timezone resolution.
//!
//! The provider reports timezones as IANA names most of the time, but
//! offset strings turn up too. Resolution is fallible; callers that must
//! not fail use [`StationZone::resolve_or_utc`].

use chrono::{DateTime, FixedOffset, Offset, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Error returned when a timezone string is neither an IANA name nor an offset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timezone {0:?}")]
pub struct UnknownZone(String);

/// A station's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationZone {
    /// IANA zone with daylight-saving rules, e.g. `America/New_York`.
    Named(Tz),
    /// Constant offset from UTC.
    Fixed(FixedOffset),
}

impl StationZone {
    /// Coordinated Universal Time.
    pub fn utc() -> Self {
        StationZone::Fixed(Utc.fix())
    }

    /// Resolve an IANA name (`Europe/London`) or offset form (`-05:00`,
    /// `+0530`, `UTC-5`, `GMT+2`, `Z`).
    pub fn resolve(name: &str) -> Result<Self, UnknownZone> {
        let name = name.trim();
        if let Ok(tz) = name.parse::<Tz>() {
            return Ok(StationZone::Named(tz));
        }
        parse_offset(name)
            .map(StationZone::Fixed)
            .ok_or_else(|| UnknownZone(name.to_string()))
    }

    /// Resolve `name`, falling back to UTC when it is not recognised.
    pub fn resolve_or_utc(name: &str) -> Self {
        match Self::resolve(name) {
            Ok(zone) => zone,
            Err(e) => {
                warn!(error = %e, "falling back to UTC");
                Self::utc()
            }
        }
    }

    /// The same instant expressed in this zone's local time.
    pub fn project(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = match self {
            StationZone::Named(tz) => instant.with_timezone(tz).offset().fix(),
            StationZone::Fixed(offset) => *offset,
        };
        instant.with_timezone(&offset)
    }

    /// Short zone label at `instant`: the abbreviation for named zones
    /// (`EDT`), the numeric offset for fixed ones (`-05:00`, or `UTC`).
    pub fn abbreviation(&self, instant: DateTime<Utc>) -> String {
        match self {
            StationZone::Named(tz) => instant.with_timezone(tz).format("%Z").to_string(),
            StationZone::Fixed(offset) if offset.local_minus_utc() == 0 => "UTC".to_string(),
            StationZone::Fixed(offset) => offset.to_string(),
        }
    }

    /// Render `instant` as `Wed, 11 Jun 2025 10:08:36 EDT`.
    pub fn display(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            self.project(instant).format("%a, %-d %b %Y %H:%M:%S"),
            self.abbreviation(instant)
        )
    }
}

/// Parse `Z`, `UTC`, `GMT`, or a signed `H`, `HH`, `HHMM`, `HH:MM`
/// offset, optionally prefixed by `UTC`/`GMT`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let upper = s.to_ascii_uppercase();
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    if rest.is_empty() {
        // Bare "UTC"/"GMT" stripped to nothing; an empty input is not a zone.
        return (!upper.is_empty()).then(|| Utc.fix());
    }
    if rest == "Z" {
        return Some(Utc.fix());
    }

    let (sign, digits) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.len() > 2 {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
