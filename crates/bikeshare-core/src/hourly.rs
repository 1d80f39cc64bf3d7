//! Hour-of-day views used by the geographic page: the hour selector and
//! the rides-per-hour distribution.

use std::{fmt, str::FromStr};

use serde::Serialize;
use snafu::prelude::*;

use crate::trip::TripRecord;

/// Errors produced when parsing or converting an hour of day.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ParseHourError {
    /// The input was not a number.
    #[snafu(display("hour '{input}' is not a number: {source}"))]
    InvalidNumber {
        /// The original input.
        input: String,
        /// Underlying integer parse error.
        source: std::num::ParseIntError,
    },

    /// The number was outside 0-23.
    #[snafu(display("hour must be in 0..=23 (got {value})"))]
    OutOfRange {
        /// The rejected value.
        value: u32,
    },
}

/// An hour of day, 0-23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Hour(u8);

impl Hour {
    /// Number of hours in a day.
    pub const COUNT: usize = 24;

    /// Build an hour, rejecting values above 23.
    pub fn new(value: u32) -> Result<Self, ParseHourError> {
        ensure!(value < Self::COUNT as u32, OutOfRangeSnafu { value });
        Ok(Hour(value as u8))
    }

    /// The hour as a plain number.
    pub fn get(self) -> u32 {
        self.0 as u32
    }
}

impl Default for Hour {
    /// Noon, the slider's starting position.
    fn default() -> Self {
        Hour(12)
    }
}

impl TryFrom<u8> for Hour {
    type Error = ParseHourError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Hour::new(value as u32)
    }
}

impl FromStr for Hour {
    type Err = ParseHourError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let value: u32 = trimmed.parse().context(InvalidNumberSnafu { input: trimmed })?;
        Hour::new(value)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trip counts for each hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyHistogram {
    bins: [u64; Hour::COUNT],
    skipped: u64,
}

impl HourlyHistogram {
    /// Count for one hour.
    pub fn count(&self, hour: Hour) -> u64 {
        self.bins[hour.0 as usize]
    }

    /// All 24 bins, index = hour.
    pub fn bins(&self) -> &[u64; Hour::COUNT] {
        &self.bins
    }

    /// Records left out because they had no start timestamp.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Sum over all bins.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Chart-ready `(hour label, count)` pairs for hours 0 through 23.
    pub fn to_series(&self) -> Vec<(String, u64)> {
        self.bins
            .iter()
            .enumerate()
            .map(|(h, &c)| (h.to_string(), c))
            .collect()
    }
}

/// Distribution of trip start times over the 24 hours of the day.
///
/// The histogram always has 24 bins. Records without a start timestamp
/// cannot be placed and are tallied in [`HourlyHistogram::skipped`].
pub fn rides_per_hour(records: &[TripRecord]) -> HourlyHistogram {
    let mut bins = [0u64; Hour::COUNT];
    let mut skipped = 0;

    for record in records {
        match record.start_hour() {
            Some(h) => bins[h as usize] += 1,
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("rides_per_hour skipped {skipped} records without start_date");
    }

    HourlyHistogram { bins, skipped }
}

/// Records whose trip started during `hour`.
pub fn trips_at_hour(records: &[TripRecord], hour: Hour) -> impl Iterator<Item = &TripRecord> {
    records
        .iter()
        .filter(move |r| r.start_hour() == Some(hour.get()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip_at(hour: u32) -> TripRecord {
        let ts = NaiveDate::from_ymd_opt(2018, 3, 1)
            .and_then(|d| d.and_hms_opt(hour, 15, 0))
            .expect("valid timestamp");
        TripRecord::new(Some(ts), "Station")
    }

    #[test]
    fn hour_parses_and_validates_range() {
        assert_eq!("7".parse::<Hour>().map(Hour::get), Ok(7));
        assert_eq!(" 23 ".parse::<Hour>().map(Hour::get), Ok(23));
        assert_eq!(
            "24".parse::<Hour>(),
            Err(ParseHourError::OutOfRange { value: 24 })
        );
        assert!(matches!(
            "noon".parse::<Hour>(),
            Err(ParseHourError::InvalidNumber { .. })
        ));
        assert!(Hour::try_from(30u8).is_err());
        assert_eq!(Hour::default().get(), 12);
    }

    #[test]
    fn histogram_has_24_bins_and_counts_by_start_hour() {
        let records = vec![trip_at(8), trip_at(8), trip_at(17), trip_at(0)];
        let hist = rides_per_hour(&records);

        assert_eq!(hist.bins().len(), 24);
        assert_eq!(hist.count(Hour::new(8).expect("hour")), 2);
        assert_eq!(hist.count(Hour::new(17).expect("hour")), 1);
        assert_eq!(hist.count(Hour::new(0).expect("hour")), 1);
        assert_eq!(hist.count(Hour::new(23).expect("hour")), 0);
        assert_eq!(hist.total(), 4);

        let series = hist.to_series();
        assert_eq!(series.len(), 24);
        assert_eq!(series[8], ("8".to_string(), 2));
    }

    #[test]
    fn histogram_skips_records_without_timestamp() {
        let records = vec![trip_at(9), TripRecord::new(None, "Nowhere")];
        let hist = rides_per_hour(&records);
        assert_eq!(hist.total(), 1);
        assert_eq!(hist.skipped(), 1);
    }

    #[test]
    fn trips_at_hour_filters_exact_hour() {
        let records = vec![trip_at(7), trip_at(8), trip_at(8), TripRecord::new(None, "x")];
        let hour = Hour::new(8).expect("hour");
        assert_eq!(trips_at_hour(&records, hour).count(), 2);
    }
}
