//! Tide extremes and their classification relative to a request time.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

use super::{Coordinate, StationId};

/// Whether an extreme is a high or a low water event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    /// Parse the provider's type tag. Matching is case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("high") {
            Some(TideKind::High)
        } else if s.eq_ignore_ascii_case("low") {
            Some(TideKind::Low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TideKind::High => "High",
            TideKind::Low => "Low",
        }
    }
}

impl fmt::Display for TideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One predicted high or low water event.
#[derive(Debug, Clone, PartialEq)]
pub struct TideExtreme {
    pub timestamp: DateTime<Utc>,
    pub kind: TideKind,
    /// Height relative to datum. May be negative, never NaN or infinite.
    pub height_meters: f64,
}

/// Whether an extreme happened before the request was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalClass {
    Past,
    Future,
}

impl TemporalClass {
    /// Strictly-before is past; an event at exactly `now` is still future.
    pub fn classify(instant: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if instant < now {
            TemporalClass::Past
        } else {
            TemporalClass::Future
        }
    }
}

/// A tide extreme projected into the station's local time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTide {
    pub extreme: TideExtreme,
    /// The timestamp string exactly as the provider sent it.
    pub provider_timestamp: String,
    /// `MM-DD` in station local time.
    pub local_date: String,
    /// Abbreviated weekday, e.g. `Wed`.
    pub local_day: String,
    /// `HH:MM` in station local time.
    pub local_time: String,
    pub temporal_class: TemporalClass,
}

impl ClassifiedTide {
    /// Classify `extreme` against `now`, using `local` (the same instant in
    /// station time) for the display fields.
    pub fn new(
        extreme: TideExtreme,
        provider_timestamp: String,
        local: DateTime<FixedOffset>,
        now: DateTime<Utc>,
    ) -> Self {
        let temporal_class = TemporalClass::classify(extreme.timestamp, now);
        Self {
            local_date: local.format("%m-%d").to_string(),
            local_day: local.format("%a").to_string(),
            local_time: local.format("%H:%M").to_string(),
            provider_timestamp,
            extreme,
            temporal_class,
        }
    }
}

/// The station a tide result refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStation {
    /// Directory id, known only when the request came in by station.
    pub id: Option<StationId>,
    pub name: String,
    /// Timezone name as reported by the provider.
    pub timezone: String,
}

/// Tide extremes for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct TideResult {
    pub requested: Coordinate,
    pub station: ResolvedStation,
    /// Coordinate the provider actually answered for.
    pub response_lat: f64,
    pub response_lon: f64,
    /// Provider order, not re-sorted.
    pub tides: Vec<ClassifiedTide>,
    /// The evaluation instant in station local time.
    pub evaluated_at: DateTime<FixedOffset>,
    /// `evaluated_at` rendered as `Wed, 11 Jun 2025 10:08:36 EDT`.
    pub evaluated_at_display: String,
    pub provider_status: u16,
    pub provider_copyright: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kind_parse() {
        assert_eq!(TideKind::parse("High"), Some(TideKind::High));
        assert_eq!(TideKind::parse("low"), Some(TideKind::Low));
        assert_eq!(TideKind::parse("LOW"), Some(TideKind::Low));
        assert_eq!(TideKind::parse("Slack"), None);
        assert_eq!(TideKind::parse(""), None);
    }

    #[test]
    fn kind_display() {
        assert_eq!(TideKind::High.to_string(), "High");
        assert_eq!(TideKind::Low.to_string(), "Low");
    }

    #[test]
    fn classify_strictly_before_is_past() {
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 10, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 6, 11, 9, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 11, 10, 0, 1).unwrap();

        assert_eq!(TemporalClass::classify(before, now), TemporalClass::Past);
        assert_eq!(TemporalClass::classify(now, now), TemporalClass::Future);
        assert_eq!(TemporalClass::classify(after, now), TemporalClass::Future);
    }

    #[test]
    fn classified_tide_local_fields() {
        let local = DateTime::parse_from_rfc3339("2025-06-11T18:31:50-04:00").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 14, 8, 36).unwrap();
        let extreme = TideExtreme {
            timestamp: local.with_timezone(&Utc),
            kind: TideKind::Low,
            height_meters: 0.483,
        };

        let tide = ClassifiedTide::new(
            extreme,
            "2025-06-11T18:31:50-04:00".to_string(),
            local,
            now,
        );

        assert_eq!(tide.local_date, "06-11");
        assert_eq!(tide.local_day, "Wed");
        assert_eq!(tide.local_time, "18:31");
        assert_eq!(tide.temporal_class, TemporalClass::Future);
    }
}
