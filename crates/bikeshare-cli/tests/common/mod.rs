#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow::array::{Float64Builder, StringBuilder, TimestampMillisecondBuilder};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// `(start_date, station, latitude, longitude, subscriber_type, gender)`.
pub type Trip = (&'static str, &'static str, f64, f64, &'static str, &'static str);

pub const TRIPS: [Trip; 6] = [
    ("2018-01-01 08:15:00", "San Francisco Ferry Building", 37.795, -122.394, "Subscriber", "Male"),
    ("2018-01-01 08:40:00", "San Francisco Ferry Building", 37.795, -122.394, "Customer", ""),
    ("2018-01-06 17:05:00", "Oakland City Hall", 37.805, -122.271, "Subscriber", "Female"),
    ("2018-01-07 08:30:00", "San Jose Diridon Station", 37.329, -121.902, "Subscriber", "Male"),
    ("2018-02-03 12:00:00", "Oakland City Hall", 37.805, -122.271, "Customer", "Female"),
    ("2018-02-14 08:05:00", "San Francisco Ferry Building", 37.795, -122.394, "Subscriber", "Other"),
];

const CSV_HEADER: &str = "start_date,start_station_name,start_station_latitude,start_station_longitude,subscriber_type,member_gender";

pub fn data_path(tmp: &TempDir, name: &str) -> PathBuf {
    tmp.path().join(name)
}

pub fn trips_csv(trips: &[Trip]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for (start, station, lat, lon, subscriber, gender) in trips {
        out.push_str(&format!("{start},{station},{lat},{lon},{subscriber},{gender}\n"));
    }
    out
}

pub fn write_trips_csv(path: &Path, trips: &[Trip]) -> TestResult {
    std::fs::write(path, trips_csv(trips))?;
    Ok(())
}

/// Same rows as a Parquet export with naive millisecond timestamps.
pub fn write_trips_parquet(path: &Path, trips: &[Trip]) -> TestResult {
    let mut start = TimestampMillisecondBuilder::with_capacity(trips.len());
    let mut station = StringBuilder::new();
    let mut lat = Float64Builder::with_capacity(trips.len());
    let mut lon = Float64Builder::with_capacity(trips.len());
    let mut subscriber = StringBuilder::new();
    let mut gender = StringBuilder::new();

    for (ts, name, la, lo, sub, gen_) in trips {
        let ts = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")?;
        start.append_value(ts.and_utc().timestamp_millis());
        station.append_value(name);
        lat.append_value(*la);
        lon.append_value(*lo);
        subscriber.append_value(sub);
        if gen_.is_empty() {
            gender.append_null();
        } else {
            gender.append_value(gen_);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "start_date",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new("start_station_name", DataType::Utf8, false),
        Field::new("start_station_latitude", DataType::Float64, false),
        Field::new("start_station_longitude", DataType::Float64, false),
        Field::new("subscriber_type", DataType::Utf8, false),
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
            Arc::new(gender.finish()),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
