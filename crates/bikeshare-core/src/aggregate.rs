//! Time-bucketed trip counts.
//!
//! [`aggregate`] is the only computation behind the "Time Analysis" page:
//! every trip's start timestamp is mapped through a [`BucketGranularity`]
//! to a [`BucketKey`], and trips are counted per key.
//!
//! Guarantees:
//!
//! - each input record lands in exactly one bucket, so
//!   `result.total() == records.len()`;
//! - buckets come out in strictly ascending key order;
//! - a record without a start timestamp fails the whole call with
//!   [`AggregateError::MalformedInput`]; nothing is dropped silently.

use std::collections::BTreeMap;

use serde::Serialize;
use snafu::prelude::*;

use crate::{bucket::BucketKey, granularity::BucketGranularity, trip::TripRecord};

/// Errors raised by [`aggregate`].
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum AggregateError {
    /// A record has no usable start timestamp.
    #[snafu(display(
        "trip record {index} has no start timestamp; cannot assign it to a {granularity} bucket"
    ))]
    MalformedInput {
        /// Position of the offending record in the input slice.
        index: usize,
        /// Granularity that was being computed.
        granularity: BucketGranularity,
    },
}

/// Number of trips in one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    /// Bucket key.
    pub key: BucketKey,
    /// Trips whose start timestamp maps to `key`.
    pub count: u64,
}

/// Ordered `(bucket, count)` pairs for one granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    granularity: BucketGranularity,
    buckets: Vec<BucketCount>,
}

impl AggregationResult {
    /// Granularity the result was computed with.
    pub fn granularity(&self) -> BucketGranularity {
        self.granularity
    }

    /// Buckets in ascending key order.
    pub fn buckets(&self) -> &[BucketCount] {
        &self.buckets
    }

    /// Iterate buckets in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &BucketCount> {
        self.buckets.iter()
    }

    /// Number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True when no trips were aggregated.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Count for a single key, or 0 when the key has no trips.
    pub fn count_for(&self, key: &BucketKey) -> u64 {
        self.buckets
            .binary_search_by(|b| b.key.cmp(key))
            .map(|i| self.buckets[i].count)
            .unwrap_or(0)
    }

    /// Chart-ready `(label, count)` pairs in bucket order.
    pub fn to_series(&self) -> Vec<(String, u64)> {
        self.buckets
            .iter()
            .map(|b| (b.key.to_string(), b.count))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AggregationResult {
    type Item = &'a BucketCount;
    type IntoIter = std::slice::Iter<'a, BucketCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Count trips per time bucket.
///
/// Pure and idempotent: the same records and granularity always yield the
/// same result. An empty slice yields an empty result.
pub fn aggregate(
    records: &[TripRecord],
    granularity: BucketGranularity,
) -> Result<AggregationResult, AggregateError> {
    let mut counts: BTreeMap<BucketKey, u64> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let ts = record
            .start_date
            .context(MalformedInputSnafu { index, granularity })?;
        *counts.entry(granularity.bucket_key(ts)).or_insert(0) += 1;
    }

    let buckets = counts
        .into_iter()
        .map(|(key, count)| BucketCount { key, count })
        .collect();

    Ok(AggregationResult {
        granularity,
        buckets,
    })
}
