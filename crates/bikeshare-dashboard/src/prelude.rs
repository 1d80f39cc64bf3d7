//! Wrapper prelude.
//!
//! The `bikeshare-dashboard` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::page;
pub use crate::{
    AggregateError, AggregationResult, BucketCount, BucketGranularity, BucketKey,
    DemographicColumn, Hour, PageControls, PageId, PageRegistry, PageSink,
    ParseGranularityError, Session, SessionError, TripRecord, aggregate, parse_timestamp,
};
