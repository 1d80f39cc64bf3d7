//! Trip records as loaded from a warehouse export.
//!
//! A [`TripRecord`] is one observed rental. Records are immutable once
//! loaded; every page and aggregation borrows them from a shared
//! [`Session`](crate::session::Session).
//!
//! Only the start timestamp is needed for time bucketing. It is kept as an
//! `Option` so that rows with a null `start_date` survive loading and are
//! reported by the aggregator instead of disappearing silently.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// One bike-share rental event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    /// Local start time of the trip; `None` when the source value was null.
    pub start_date: Option<NaiveDateTime>,
    /// Name of the station the trip started from.
    pub start_station_name: String,
    /// Latitude of the start station, if known.
    pub start_station_latitude: Option<f64>,
    /// Longitude of the start station, if known.
    pub start_station_longitude: Option<f64>,
    /// Rider category, for example `Subscriber` or `Customer`.
    pub subscriber_type: Option<String>,
    /// Rider birth year, if reported.
    pub member_birth_year: Option<i32>,
    /// Rider gender, if reported.
    pub member_gender: Option<String>,
}

impl TripRecord {
    /// Create a record with a start time and station; all other attributes
    /// start out missing.
    pub fn new(start_date: Option<NaiveDateTime>, start_station_name: impl Into<String>) -> Self {
        Self {
            start_date,
            start_station_name: start_station_name.into(),
            start_station_latitude: None,
            start_station_longitude: None,
            subscriber_type: None,
            member_birth_year: None,
            member_gender: None,
        }
    }

    /// Set the start station coordinates.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.start_station_latitude = Some(latitude);
        self.start_station_longitude = Some(longitude);
        self
    }

    /// Set the subscriber type.
    pub fn with_subscriber_type(mut self, subscriber_type: impl Into<String>) -> Self {
        self.subscriber_type = Some(subscriber_type.into());
        self
    }

    /// Set the member birth year.
    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.member_birth_year = Some(year);
        self
    }

    /// Set the member gender.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.member_gender = Some(gender.into());
        self
    }

    /// Hour of day (0-23) the trip started, if the start time is known.
    pub fn start_hour(&self) -> Option<u32> {
        self.start_date.map(|ts| ts.hour())
    }

    /// Start coordinates as `(latitude, longitude)` when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.start_station_latitude, self.start_station_longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Parse a textual start timestamp.
///
/// Accepted shapes, tried in order:
///
/// - `YYYY-MM-DD HH:MM:SS[.fff]` (optionally with a trailing ` UTC`, as
///   emitted by warehouse exports) or the same with a `T` separator;
/// - RFC 3339 with an offset, converted to UTC and made naive;
/// - `YYYY-MM-DD HH:MM`;
/// - a bare `YYYY-MM-DD`, taken as midnight.
///
/// Returns `None` for anything else, including the empty string.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_suffix(" UTC").unwrap_or(s);

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
