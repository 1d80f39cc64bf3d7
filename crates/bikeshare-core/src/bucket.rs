//! Bucket keys produced by mapping a trip timestamp through a
//! [`BucketGranularity`](crate::granularity::BucketGranularity).
//!
//! Keys of the same granularity order naturally:
//!
//! - dates and months ascend chronologically;
//! - weeks and days of month ascend numerically.
//!
//! Keys of different granularities never meet in one aggregation, so the
//! cross-variant order (variant declaration order) carries no meaning.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Group key for one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    /// A calendar date.
    Date(NaiveDate),
    /// A calendar month of a specific year.
    Month {
        /// Calendar year.
        year: i32,
        /// Month of year, 1-12.
        month: u32,
    },
    /// Sunday-start week of year, 0-53 (see [`sunday_week_of_year`]).
    Week(u32),
    /// Day of month, 1-31, merged across months and years.
    DayOfMonth(u32),
}

impl BucketKey {
    /// Date bucket for a timestamp.
    pub fn date_of(ts: NaiveDateTime) -> Self {
        BucketKey::Date(ts.date())
    }

    /// Month bucket for a timestamp.
    pub fn month_of(ts: NaiveDateTime) -> Self {
        BucketKey::Month {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Week bucket for a timestamp.
    pub fn week_of(ts: NaiveDateTime) -> Self {
        BucketKey::Week(sunday_week_of_year(ts.date()))
    }

    /// Day-of-month bucket for a timestamp.
    pub fn day_of_month_of(ts: NaiveDateTime) -> Self {
        BucketKey::DayOfMonth(ts.day())
    }
}

/// Week of year where weeks start on Sunday.
///
/// This is the C `%U` rule: the first Sunday of the year opens week 1 and
/// any days before it fall in week 0, so the result is in `0..=53`. Weeks
/// never straddle a year boundary.
pub fn sunday_week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - date.weekday().num_days_from_sunday()) / 7
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            BucketKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            BucketKey::Week(w) => write!(f, "{w:02}"),
            BucketKey::DayOfMonth(d) => write!(f, "{d}"),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).expect("valid time")
    }

    #[test]
    fn sunday_week_days_before_first_sunday_are_week_zero() {
        // 2021-01-01 is a Friday; the first Sunday is 2021-01-03.
        assert_eq!(sunday_week_of_year(date(2021, 1, 1)), 0);
        assert_eq!(sunday_week_of_year(date(2021, 1, 2)), 0);
        assert_eq!(sunday_week_of_year(date(2021, 1, 3)), 1);
        assert_eq!(sunday_week_of_year(date(2021, 1, 9)), 1);
        assert_eq!(sunday_week_of_year(date(2021, 1, 10)), 2);
    }

    #[test]
    fn sunday_week_when_year_starts_on_sunday() {
        // 2017-01-01 is a Sunday.
        assert_eq!(sunday_week_of_year(date(2017, 1, 1)), 1);
        assert_eq!(sunday_week_of_year(date(2017, 12, 31)), 53);
    }

    #[test]
    fn sunday_week_matches_strftime_u() {
        let mut d = date(2018, 1, 1);
        while d.year() == 2018 {
            let expected: u32 = d.format("%U").to_string().parse().expect("numeric");
            assert_eq!(sunday_week_of_year(d), expected, "{d}");
            d = d.succ_opt().expect("next day");
        }
    }

    #[test]
    fn labels_match_chart_axis_format() {
        assert_eq!(BucketKey::date_of(at(2021, 1, 1, 8)).to_string(), "2021-01-01");
        assert_eq!(BucketKey::month_of(at(2018, 7, 9, 0)).to_string(), "2018-07");
        assert_eq!(BucketKey::week_of(at(2021, 1, 1, 0)).to_string(), "00");
        assert_eq!(BucketKey::day_of_month_of(at(2021, 3, 5, 0)).to_string(), "5");
    }

    #[test]
    fn keys_order_naturally_within_a_granularity() {
        assert!(BucketKey::Month { year: 2020, month: 12 } < BucketKey::Month { year: 2021, month: 1 });
        assert!(BucketKey::Week(2) < BucketKey::Week(10));
        assert!(BucketKey::DayOfMonth(9) < BucketKey::DayOfMonth(10));
        assert!(BucketKey::Date(date(2021, 1, 31)) < BucketKey::Date(date(2021, 2, 1)));
    }

    #[test]
    fn bucket_keys_serialize_as_their_labels() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_value(BucketKey::Month { year: 2021, month: 1 })?,
            serde_json::json!("2021-01")
        );
        assert_eq!(serde_json::to_value(BucketKey::Week(5))?, serde_json::json!("05"));
        assert_eq!(
            serde_json::to_value(BucketKey::Date(date(2021, 3, 9)))?,
            serde_json::json!("2021-03-09")
        );
        Ok(())
    }
}
