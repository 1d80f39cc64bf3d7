use std::{path::Path, sync::Arc};

use arrow::array::{
    Float64Builder, Int64Builder, StringBuilder, TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub struct TripRow {
    pub start: Option<(u32, u32, u32, u32)>,
    pub station: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub subscriber: &'static str,
    pub birth_year: Option<i64>,
    pub gender: Option<&'static str>,
}

/// Five trips across three regions, January and February 2018.
pub fn sample_rows() -> Vec<TripRow> {
    vec![
        TripRow {
            start: Some((1, 1, 8, 15)),
            station: "San Francisco Ferry Building",
            lat: 37.795,
            lon: -122.394,
            subscriber: "Subscriber",
            birth_year: Some(1985),
            gender: Some("Male"),
        },
        TripRow {
            start: Some((1, 1, 8, 45)),
            station: "San Francisco Ferry Building",
            lat: 37.795,
            lon: -122.394,
            subscriber: "Customer",
            birth_year: None,
            gender: None,
        },
        TripRow {
            start: Some((1, 2, 17, 10)),
            station: "Oakland City Hall",
            lat: 37.805,
            lon: -122.271,
            subscriber: "Subscriber",
            birth_year: Some(1990),
            gender: Some("Female"),
        },
        TripRow {
            start: Some((2, 5, 12, 0)),
            station: "San Jose Diridon Station",
            lat: 37.329,
            lon: -121.902,
            subscriber: "Subscriber",
            birth_year: Some(1979),
            gender: Some("Male"),
        },
        TripRow {
            start: Some((2, 5, 23, 59)),
            station: "San Francisco Caltrain (Townsend St at 4th St)",
            lat: 37.776,
            lon: -122.395,
            subscriber: "Subscriber",
            birth_year: Some(1985),
            gender: Some("Other"),
        },
    ]
}

fn start_micros(start: (u32, u32, u32, u32)) -> TestResult<i64> {
    let (month, day, hour, minute) = start;
    let ts = NaiveDate::from_ymd_opt(2018, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or("invalid fixture timestamp")?;
    Ok(ts.and_utc().timestamp_micros())
}

/// Write rows as a warehouse-style Parquet export (UTC microsecond timestamps).
pub fn write_trips_parquet(path: &Path, rows: &[TripRow]) -> TestResult {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut start = TimestampMicrosecondBuilder::with_capacity(rows.len()).with_timezone("UTC");
    let mut station = StringBuilder::new();
    let mut lat = Float64Builder::with_capacity(rows.len());
    let mut lon = Float64Builder::with_capacity(rows.len());
    let mut subscriber = StringBuilder::new();
    let mut birth_year = Int64Builder::with_capacity(rows.len());
    let mut gender = StringBuilder::new();

    for row in rows {
        match row.start {
            Some(s) => start.append_value(start_micros(s)?),
            None => start.append_null(),
        }
        station.append_value(row.station);
        lat.append_value(row.lat);
        lon.append_value(row.lon);
        subscriber.append_value(row.subscriber);
        birth_year.append_option(row.birth_year);
        gender.append_option(row.gender);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "start_date",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            true,
        ),
        Field::new("start_station_name", DataType::Utf8, false),
        Field::new("start_station_latitude", DataType::Float64, false),
        Field::new("start_station_longitude", DataType::Float64, false),
        Field::new("subscriber_type", DataType::Utf8, false),
        Field::new("member_birth_year", DataType::Int64, true),
        Field::new("member_gender", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(start.finish()) as _,
            Arc::new(station.finish()),
            Arc::new(lat.finish()),
            Arc::new(lon.finish()),
            Arc::new(subscriber.finish()),
            Arc::new(birth_year.finish()),
            Arc::new(gender.finish()),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let props = parquet::file::properties::WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
