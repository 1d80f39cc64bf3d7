//! Rider demographic filters.
//!
//! Missing attributes are not dropped: they form their own
//! [`CategoryValue::Unknown`] category, which can be listed and selected
//! like any other value.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::Serialize;
use snafu::prelude::*;

use crate::trip::TripRecord;

/// Label used for missing categorical values.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Error returned when a demographic column name is not recognised.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display(
    "unknown demographic column '{input}' (expected subscriber_type|member_birth_year|member_gender)"
))]
pub struct ParseColumnError {
    input: String,
}

/// Demographic attribute a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DemographicColumn {
    /// `subscriber_type`.
    #[default]
    SubscriberType,
    /// `member_birth_year`.
    MemberBirthYear,
    /// `member_gender`.
    MemberGender,
}

impl DemographicColumn {
    /// Columns in selector order.
    pub const ALL: [DemographicColumn; 3] = [
        DemographicColumn::SubscriberType,
        DemographicColumn::MemberBirthYear,
        DemographicColumn::MemberGender,
    ];

    /// Human label shown in the column selector.
    pub fn label(&self) -> &'static str {
        match self {
            DemographicColumn::SubscriberType => "Subscriber Type",
            DemographicColumn::MemberBirthYear => "Member Birth Year",
            DemographicColumn::MemberGender => "Member Gender",
        }
    }

    /// Source column name.
    pub fn column_name(&self) -> &'static str {
        match self {
            DemographicColumn::SubscriberType => "subscriber_type",
            DemographicColumn::MemberBirthYear => "member_birth_year",
            DemographicColumn::MemberGender => "member_gender",
        }
    }

    /// This column's value for a record.
    pub fn value_of(&self, record: &TripRecord) -> CategoryValue {
        match self {
            DemographicColumn::SubscriberType => CategoryValue::from_text(&record.subscriber_type),
            DemographicColumn::MemberGender => CategoryValue::from_text(&record.member_gender),
            DemographicColumn::MemberBirthYear => record
                .member_birth_year
                .map(CategoryValue::Year)
                .unwrap_or(CategoryValue::Unknown),
        }
    }

    /// Parse a user-supplied filter value for this column.
    ///
    /// `Unknown` (any case) selects missing values; birth years must be
    /// integers, anything else is kept as text and simply matches nothing.
    pub fn parse_value(&self, raw: &str) -> CategoryValue {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(UNKNOWN_LABEL) || trimmed.is_empty() {
            return CategoryValue::Unknown;
        }
        match self {
            DemographicColumn::MemberBirthYear => trimmed
                .parse()
                .map(CategoryValue::Year)
                .unwrap_or_else(|_| CategoryValue::Text(trimmed.to_string())),
            _ => CategoryValue::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for DemographicColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DemographicColumn {
    type Err = ParseColumnError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let key: String = input
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "subscribertype" | "subscriber" => Ok(DemographicColumn::SubscriberType),
            "memberbirthyear" | "birthyear" | "birth" => Ok(DemographicColumn::MemberBirthYear),
            "membergender" | "gender" => Ok(DemographicColumn::MemberGender),
            _ => ParseColumnSnafu {
                input: input.trim(),
            }
            .fail(),
        }
    }
}

/// A value of a demographic column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryValue {
    /// A textual category such as `Subscriber` or `Female`.
    Text(String),
    /// A birth year.
    Year(i32),
    /// The attribute was missing or blank.
    Unknown,
}

impl CategoryValue {
    fn from_text(value: &Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => CategoryValue::Text(v.to_string()),
            _ => CategoryValue::Unknown,
        }
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Text(s) => f.write_str(s),
            CategoryValue::Year(y) => write!(f, "{y}"),
            CategoryValue::Unknown => f.write_str(UNKNOWN_LABEL),
        }
    }
}

/// Distinct values of `column`, used to populate the filter selector.
///
/// Values appear in first-seen order, except birth years which are sorted
/// ascending. `Unknown` is listed last whenever present.
pub fn filter_options(records: &[TripRecord], column: DemographicColumn) -> Vec<CategoryValue> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    let mut has_unknown = false;

    for record in records {
        let value = column.value_of(record);
        if value == CategoryValue::Unknown {
            has_unknown = true;
            continue;
        }
        if seen.insert(value.clone()) {
            values.push(value);
        }
    }

    if column == DemographicColumn::MemberBirthYear {
        values.sort_by_key(|v| match v {
            CategoryValue::Year(y) => *y,
            _ => i32::MAX,
        });
    }

    if has_unknown {
        values.push(CategoryValue::Unknown);
    }
    values
}

/// Records whose `column` equals `value`.
pub fn filter_by<'a>(
    records: &'a [TripRecord],
    column: DemographicColumn,
    value: &CategoryValue,
) -> Vec<&'a TripRecord> {
    records
        .iter()
        .filter(|r| column.value_of(r) == *value)
        .collect()
}
