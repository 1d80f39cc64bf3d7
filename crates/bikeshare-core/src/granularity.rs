//! Time resolution selector for the "Time Analysis" page.

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::Serialize;
use snafu::prelude::*;

use crate::bucket::BucketKey;

/// Errors produced when parsing a granularity name (e.g. `week`).
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ParseGranularityError {
    /// The input was empty or only whitespace.
    #[snafu(display("granularity is empty (expected date|month|week|day)"))]
    Empty,

    /// The input did not name a known granularity.
    #[snafu(display("unknown granularity '{input}' (expected date|month|week|day)"))]
    Unknown {
        /// The original input.
        input: String,
    },
}

/// How trip timestamps are grouped into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BucketGranularity {
    /// One bucket per calendar date.
    #[default]
    ByDate,
    /// One bucket per year-month.
    ByMonth,
    /// One bucket per Sunday-start week of year, merged across years.
    ByWeek,
    /// One bucket per day of month, merged across months and years.
    ByDayOfMonth,
}

impl BucketGranularity {
    /// Every granularity, in dropdown order.
    pub const ALL: [BucketGranularity; 4] = [
        BucketGranularity::ByDate,
        BucketGranularity::ByMonth,
        BucketGranularity::ByWeek,
        BucketGranularity::ByDayOfMonth,
    ];

    /// Label shown in the time-frame selector.
    pub fn label(&self) -> &'static str {
        match self {
            BucketGranularity::ByDate => "Per Date",
            BucketGranularity::ByMonth => "Per Month",
            BucketGranularity::ByWeek => "Per Week",
            BucketGranularity::ByDayOfMonth => "Per Day",
        }
    }

    /// Short machine name, accepted back by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            BucketGranularity::ByDate => "date",
            BucketGranularity::ByMonth => "month",
            BucketGranularity::ByWeek => "week",
            BucketGranularity::ByDayOfMonth => "day",
        }
    }

    /// Axis title for the bucket column.
    pub fn axis_title(&self) -> &'static str {
        match self {
            BucketGranularity::ByDate => "Date",
            BucketGranularity::ByMonth => "Month",
            BucketGranularity::ByWeek => "Week",
            BucketGranularity::ByDayOfMonth => "Day of Month",
        }
    }

    /// Map a timestamp to its bucket.
    pub fn bucket_key(&self, ts: NaiveDateTime) -> BucketKey {
        match self {
            BucketGranularity::ByDate => BucketKey::date_of(ts),
            BucketGranularity::ByMonth => BucketKey::month_of(ts),
            BucketGranularity::ByWeek => BucketKey::week_of(ts),
            BucketGranularity::ByDayOfMonth => BucketKey::day_of_month_of(ts),
        }
    }
}

impl fmt::Display for BucketGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BucketGranularity {
    type Err = ParseGranularityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseGranularityError::Empty);
        }

        let normalized: String = trimmed
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        let normalized = normalized
            .strip_prefix("per-")
            .or_else(|| normalized.strip_prefix("by-"))
            .unwrap_or(&normalized);

        match normalized {
            "date" | "d" => Ok(BucketGranularity::ByDate),
            "month" | "m" => Ok(BucketGranularity::ByMonth),
            "week" | "w" => Ok(BucketGranularity::ByWeek),
            "day" | "day-of-month" | "dom" => Ok(BucketGranularity::ByDayOfMonth),
            _ => Err(ParseGranularityError::Unknown {
                input: trimmed.to_string(),
            }),
        }
    }
}
