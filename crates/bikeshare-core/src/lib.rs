//! Core engine for the bike-share trip dashboard.
//!
//! This crate provides everything behind the dashboard's pages, minus the
//! drawing:
//!
//! - Loading warehouse exports (Parquet or CSV) into typed
//!   [`TripRecord`](trip::TripRecord)s (`load` module).
//! - The time-bucket aggregator that counts trips per date, month, week or
//!   day of month (`aggregate`, `granularity`, `bucket` modules).
//! - Smaller views used by the other pages: rides per hour, region maps,
//!   station rankings and demographic filters.
//! - An explicitly scoped [`Session`](session::Session) that owns the
//!   loaded data, and a [`PageRegistry`](page::PageRegistry) that renders
//!   pages into any [`PageSink`](page::PageSink).
//!
//! Front ends (the `bikeshare` CLI, or a web layer) depend on this crate
//! and only decide how page elements are displayed.
#![deny(missing_docs)]
pub mod aggregate;
pub mod bucket;
pub mod demographics;
pub mod granularity;
pub mod hourly;
pub mod load;
pub mod page;
pub mod region;
pub mod session;
pub mod stations;
pub mod trip;

pub use aggregate::{AggregateError, AggregationResult, BucketCount, aggregate};
pub use bucket::BucketKey;
pub use granularity::{BucketGranularity, ParseGranularityError};
pub use session::{Session, SessionError};
pub use trip::TripRecord;
