//! # bikeshare-dashboard
//!
//! Trip-count dashboard engine for bike-share warehouse exports.
//!
//! This crate is the supported public entry point and provides a small, stable surface
//! over `bikeshare-core`: loading trips into a [`Session`], the time-bucket aggregator,
//! and the page registry that renders dashboard pages into a [`PageSink`].
//!
//! ## Example
//!
//! ```rust
//! use bikeshare_dashboard::prelude::*;
//!
//! let records = vec![
//!     TripRecord::new(parse_timestamp("2018-01-06 17:05:00"), "Oakland City Hall"),
//!     TripRecord::new(parse_timestamp("2018-01-07 08:30:00"), "Oakland City Hall"),
//! ];
//! let weekly = aggregate(&records, BucketGranularity::ByWeek).unwrap();
//! assert_eq!(
//!     weekly.to_series(),
//!     vec![("00".to_string(), 1), ("01".to_string(), 1)]
//! );
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Page rendering namespace (wrapper-only).
pub mod page {
    pub use bikeshare_core::page::{
        Chart, ChartKind, ChartPoint, DEFAULT_MAX_ROWS, Element, MapPanel, OptionList,
        PageControls, PageError, PageId, PageRegistry, PageSink, ParsePageError, RecordingSink,
        RenderFn, TablePanel,
    };
}

/// Trip export loading (wrapper-only).
pub mod load {
    pub use bikeshare_core::load::{LoadError, SourceFormat, decode_trips, load_trips};
}

pub use bikeshare_core::demographics::{CategoryValue, DemographicColumn, ParseColumnError};
pub use bikeshare_core::hourly::{Hour, HourlyHistogram, ParseHourError};
pub use bikeshare_core::page::{PageControls, PageId, PageRegistry, PageSink};
pub use bikeshare_core::region::{MapView, Region};
pub use bikeshare_core::stations::StationCount;
pub use bikeshare_core::trip::parse_timestamp;
pub use bikeshare_core::{
    AggregateError, AggregationResult, BucketCount, BucketGranularity, BucketKey,
    ParseGranularityError, Session, SessionError, TripRecord, aggregate,
};
