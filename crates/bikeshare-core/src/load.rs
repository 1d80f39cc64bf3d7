//! Loading trip exports into [`TripRecord`]s.
//!
//! Trips arrive as a single file exported from the warehouse, either
//! Parquet or CSV with a header row. The file is read into memory, decoded
//! into Arrow `RecordBatch`es, and each batch is converted row by row:
//!
//! - `start_date` and `start_station_name` are required columns;
//! - `start_station_latitude`, `start_station_longitude`,
//!   `subscriber_type`, `member_birth_year` and `member_gender` are optional
//!   and read as missing when the column is absent;
//! - other columns are ignored.
//!
//! `start_date` may be any Arrow timestamp or date type, or text in one of
//! the shapes accepted by [`parse_timestamp`]. Null (or blank) timestamps
//! load as records with no start time; text that does not parse fails the
//! whole load with the offending row number.

use std::{io::Cursor, path::Path, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, AsArray, RecordBatch},
    compute::cast,
    datatypes::{
        DataType, Field, Float64Type, Int64Type, Schema, SchemaRef, TimeUnit,
        TimestampMillisecondType,
    },
    error::ArrowError,
};
use arrow_csv::reader::{Format, ReaderBuilder};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime};
use parquet::{arrow::arrow_reader::ParquetRecordBatchReaderBuilder, errors::ParquetError};
use snafu::prelude::*;

use crate::trip::{TripRecord, parse_timestamp};

/// Column holding the trip start time.
pub const START_DATE: &str = "start_date";
/// Column holding the start station name.
pub const START_STATION_NAME: &str = "start_station_name";
/// Column holding the start station latitude.
pub const START_STATION_LATITUDE: &str = "start_station_latitude";
/// Column holding the start station longitude.
pub const START_STATION_LONGITUDE: &str = "start_station_longitude";
/// Column holding the rider category.
pub const SUBSCRIBER_TYPE: &str = "subscriber_type";
/// Column holding the rider birth year.
pub const MEMBER_BIRTH_YEAR: &str = "member_birth_year";
/// Column holding the rider gender.
pub const MEMBER_GENDER: &str = "member_gender";

const CSV_INFER_MAX_RECORDS: usize = 1_000;

/// Errors raised while loading a trip export.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LoadError {
    /// The file could not be read.
    #[snafu(display("failed to read trip data at {path}: {source}"))]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file extension is not one of the supported formats.
    #[snafu(display("unsupported trip data format for {path} (expected .parquet or .csv)"))]
    UnsupportedFormat {
        /// Path whose extension was not recognised.
        path: String,
    },

    /// The Parquet file could not be decoded.
    #[snafu(display("Parquet read error: {source}"))]
    Parquet {
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// Arrow decoding or casting failed.
    #[snafu(display("Arrow error while decoding trips: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// A required column is absent.
    #[snafu(display("trip data is missing required column '{column}'"))]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A column has a type that cannot be interpreted.
    #[snafu(display("column '{column}' has unsupported type {data_type:?}"))]
    UnsupportedColumnType {
        /// Column name.
        column: String,
        /// Arrow type found in the file.
        data_type: DataType,
    },

    /// A `start_date` value could not be parsed.
    #[snafu(display("row {row}: cannot parse start_date '{value}'"))]
    MalformedTimestamp {
        /// Zero-based data row (header excluded).
        row: usize,
        /// The raw value.
        value: String,
    },
}

/// Supported on-disk formats for trip exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Apache Parquet.
    Parquet,
    /// Comma-separated values with a header row.
    Csv,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("parquet") | Some("pq") => Ok(SourceFormat::Parquet),
            Some("csv") => Ok(SourceFormat::Csv),
            _ => UnsupportedFormatSnafu {
                path: path.display().to_string(),
            }
            .fail(),
        }
    }
}

/// Read and decode all trips from `path`.
pub async fn load_trips(path: &Path) -> Result<Vec<TripRecord>, LoadError> {
    let format = SourceFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await.context(IoSnafu {
        path: path.display().to_string(),
    })?;

    let trips = decode_trips(Bytes::from(bytes), format)?;
    log::info!("loaded {} trips from {}", trips.len(), path.display());
    Ok(trips)
}

/// Decode trips from an in-memory export.
pub fn decode_trips(bytes: Bytes, format: SourceFormat) -> Result<Vec<TripRecord>, LoadError> {
    let (schema, batches) = match format {
        SourceFormat::Parquet => read_parquet_batches(bytes)?,
        SourceFormat::Csv => read_csv_batches(bytes)?,
    };
    check_required_columns(&schema)?;

    let mut trips = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    let mut row_offset = 0;
    for batch in &batches {
        trips.extend(trips_from_batch(batch, row_offset)?);
        row_offset += batch.num_rows();
    }

    let missing = trips.iter().filter(|t| t.start_date.is_none()).count();
    if missing > 0 {
        log::warn!("{missing} trips have no start_date; time aggregation will reject them");
    }
    Ok(trips)
}

type Batches = (SchemaRef, Vec<RecordBatch>);

fn read_parquet_batches(bytes: Bytes) -> Result<Batches, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).context(ParquetSnafu)?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.build().context(ParquetSnafu)?;

    let batches = reader
        .map(|batch| batch.context(ArrowSnafu))
        .collect::<Result<Vec<_>, LoadError>>()?;
    Ok((schema, batches))
}

fn read_csv_batches(bytes: Bytes) -> Result<Batches, LoadError> {
    let format = Format::default().with_header(true);
    let (inferred, _) = format
        .infer_schema(Cursor::new(bytes.clone()), Some(CSV_INFER_MAX_RECORDS))
        .context(ArrowSnafu)?;

    // Keep start_date as text.
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            if f.name() == START_DATE {
                Field::new(START_DATE, DataType::Utf8, true)
            } else {
                f.as_ref().clone()
            }
        })
        .collect();

    let schema = Arc::new(Schema::new(fields));
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .build(Cursor::new(bytes))
        .context(ArrowSnafu)?;

    let batches = reader
        .map(|batch| batch.context(ArrowSnafu))
        .collect::<Result<Vec<_>, LoadError>>()?;
    Ok((schema, batches))
}

/// Fails on a missing required column even when the export has no rows.
fn check_required_columns(schema: &Schema) -> Result<(), LoadError> {
    for column in [START_DATE, START_STATION_NAME] {
        ensure!(
            schema.column_with_name(column).is_some(),
            MissingColumnSnafu { column }
        );
    }
    Ok(())
}

fn required<'a>(batch: &'a RecordBatch, column: &str) -> Result<&'a ArrayRef, LoadError> {
    batch
        .column_by_name(column)
        .context(MissingColumnSnafu { column })
}

fn epoch_to_naive(unit: TimeUnit, value: i64) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Second => DateTime::from_timestamp(value, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(value),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(value)),
    };
    dt.map(|d| d.naive_utc())
}

fn start_dates(col: &ArrayRef, row_offset: usize) -> Result<Vec<Option<NaiveDateTime>>, LoadError> {
    match col.data_type() {
        DataType::Timestamp(unit, _) => {
            // Raw values are UTC epoch offsets (or wall-clock offsets when no
            // timezone is attached); either way the naive UTC reading is the
            // wall time we bucket on.
            let raw = cast(col, &DataType::Int64).context(ArrowSnafu)?;
            let arr = raw.as_primitive::<Int64Type>();
            let mut out = Vec::with_capacity(arr.len());
            for i in 0..arr.len() {
                if arr.is_null(i) {
                    out.push(None);
                    continue;
                }
                let v = arr.value(i);
                let ts = epoch_to_naive(*unit, v).context(MalformedTimestampSnafu {
                    row: row_offset + i,
                    value: v.to_string(),
                })?;
                out.push(Some(ts));
            }
            Ok(out)
        }
        DataType::Date32 | DataType::Date64 => {
            let millis = cast(col, &DataType::Timestamp(TimeUnit::Millisecond, None))
                .context(ArrowSnafu)?;
            let arr = millis.as_primitive::<TimestampMillisecondType>();
            Ok((0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        arr.value_as_datetime(i)
                    }
                })
                .collect())
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Null => {
            let text = cast(col, &DataType::Utf8).context(ArrowSnafu)?;
            let arr = text.as_string::<i32>();
            let mut out = Vec::with_capacity(arr.len());
            for i in 0..arr.len() {
                if arr.is_null(i) || arr.value(i).trim().is_empty() {
                    out.push(None);
                    continue;
                }
                let raw = arr.value(i);
                let ts = parse_timestamp(raw).context(MalformedTimestampSnafu {
                    row: row_offset + i,
                    value: raw,
                })?;
                out.push(Some(ts));
            }
            Ok(out)
        }
        other => UnsupportedColumnTypeSnafu {
            column: START_DATE,
            data_type: other.clone(),
        }
        .fail(),
    }
}

fn text_column(
    batch: &RecordBatch,
    column: &str,
) -> Result<Option<Vec<Option<String>>>, LoadError> {
    let Some(col) = batch.column_by_name(column) else {
        return Ok(None);
    };
    let text = cast(col, &DataType::Utf8).context(ArrowSnafu)?;
    let arr = text.as_string::<i32>();
    Ok(Some(
        (0..arr.len())
            .map(|i| (!arr.is_null(i)).then(|| arr.value(i).to_string()))
            .collect(),
    ))
}

fn float_column(batch: &RecordBatch, column: &str) -> Result<Option<Vec<Option<f64>>>, LoadError> {
    let Some(col) = batch.column_by_name(column) else {
        return Ok(None);
    };
    let floats = cast(col, &DataType::Float64).context(ArrowSnafu)?;
    let arr = floats.as_primitive::<Float64Type>();
    Ok(Some(
        (0..arr.len())
            .map(|i| (!arr.is_null(i)).then(|| arr.value(i)))
            .collect(),
    ))
}

fn year_column(batch: &RecordBatch, column: &str) -> Result<Option<Vec<Option<i32>>>, LoadError> {
    let Some(col) = batch.column_by_name(column) else {
        return Ok(None);
    };
    let ints = cast(col, &DataType::Int64).context(ArrowSnafu)?;
    let arr = ints.as_primitive::<Int64Type>();
    Ok(Some(
        (0..arr.len())
            .map(|i| {
                if arr.is_null(i) {
                    None
                } else {
                    i32::try_from(arr.value(i)).ok()
                }
            })
            .collect(),
    ))
}

fn take<T>(column: &mut Option<Vec<Option<T>>>, row: usize) -> Option<T> {
    column.as_mut().and_then(|values| values[row].take())
}

/// Convert one Arrow batch into trip records.
///
/// `row_offset` is the index of the batch's first row within the whole
/// file and is only used in error messages. A null station name loads as
/// the empty string.
pub fn trips_from_batch(batch: &RecordBatch, row_offset: usize) -> Result<Vec<TripRecord>, LoadError> {
    let starts = start_dates(required(batch, START_DATE)?, row_offset)?;
    required(batch, START_STATION_NAME)?;

    let mut stations = text_column(batch, START_STATION_NAME)?;
    let mut lats = float_column(batch, START_STATION_LATITUDE)?;
    let mut lons = float_column(batch, START_STATION_LONGITUDE)?;
    let mut subscriber = text_column(batch, SUBSCRIBER_TYPE)?;
    let mut birth_year = year_column(batch, MEMBER_BIRTH_YEAR)?;
    let mut gender = text_column(batch, MEMBER_GENDER)?;

    let trips = starts
        .into_iter()
        .enumerate()
        .map(|(row, start_date)| TripRecord {
            start_date,
            start_station_name: take(&mut stations, row).unwrap_or_default(),
            start_station_latitude: take(&mut lats, row),
            start_station_longitude: take(&mut lons, row),
            subscriber_type: take(&mut subscriber, row),
            member_birth_year: take(&mut birth_year, row),
            member_gender: take(&mut gender, row),
        })
        .collect();

    Ok(trips)
}
