//! Geographic areas of the Bay Area system and the map views built for them.
//!
//! A region is selected by a substring match on the start station name,
//! which is how the stations are labelled in the source data
//! (e.g. "San Jose Diridon Caltrain Station"). The map view centers on the
//! mean start coordinate of the region, nudged by a fixed per-region offset
//! so the three maps frame their stations similarly.

use std::{fmt, str::FromStr};

use serde::Serialize;
use snafu::prelude::*;

use crate::{
    hourly::{Hour, trips_at_hour},
    trip::TripRecord,
};

/// Default map zoom level.
pub const MAP_ZOOM: u8 = 11;
/// Default map pitch in degrees.
pub const MAP_PITCH: u8 = 50;

/// Error returned when a region name is not recognised.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("unknown region '{input}' (expected sf|oakland|sj)"))]
pub struct ParseRegionError {
    input: String,
}

/// A service area shown as its own map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// San Francisco.
    SanFrancisco,
    /// Oakland.
    Oakland,
    /// San Jose.
    SanJose,
}

impl Region {
    /// Regions in map order (left to right).
    pub const ALL: [Region; 3] = [Region::SanFrancisco, Region::Oakland, Region::SanJose];

    /// Substring that identifies the region's stations.
    pub fn needle(&self) -> &'static str {
        match self {
            Region::SanFrancisco => "San Francisco",
            Region::Oakland => "Oakland",
            Region::SanJose => "San Jose",
        }
    }

    /// Map panel title.
    pub fn title(&self) -> &'static str {
        match self {
            Region::SanFrancisco => "San Francisco Area",
            Region::Oakland => "Oakland Area",
            Region::SanJose => "San Jose Area",
        }
    }

    /// `(latitude, longitude)` offset applied to the mean station position.
    pub fn view_offset(&self) -> (f64, f64) {
        match self {
            Region::SanFrancisco => (0.0, 0.0),
            Region::Oakland => (-0.05, 0.0),
            Region::SanJose => (-0.06, 0.1),
        }
    }

    /// Whether a trip started at one of this region's stations.
    pub fn contains(&self, record: &TripRecord) -> bool {
        record.start_station_name.contains(self.needle())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.needle())
    }
}

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let key: String = input
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "sf" | "sanfrancisco" => Ok(Region::SanFrancisco),
            "oak" | "oakland" => Ok(Region::Oakland),
            "sj" | "sanjose" => Ok(Region::SanJose),
            _ => ParseRegionSnafu {
                input: input.trim(),
            }
            .fail(),
        }
    }
}

/// Camera position for a region map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Zoom level.
    pub zoom: u8,
    /// Pitch in degrees.
    pub pitch: u8,
}

/// One trip start position plotted on a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    /// Latitude of the start station.
    pub latitude: f64,
    /// Longitude of the start station.
    pub longitude: f64,
}

/// Trips that started in `region`.
pub fn filter_region(records: &[TripRecord], region: Region) -> Vec<&TripRecord> {
    records.iter().filter(|r| region.contains(r)).collect()
}

/// Camera position for `region`, or `None` if none of its trips carry
/// coordinates.
pub fn map_view<'a>(
    records: impl IntoIterator<Item = &'a TripRecord>,
    region: Region,
) -> Option<MapView> {
    let (mut lat_sum, mut lon_sum, mut n) = (0.0f64, 0.0f64, 0usize);
    for (lat, lon) in records.into_iter().filter_map(TripRecord::coordinates) {
        lat_sum += lat;
        lon_sum += lon;
        n += 1;
    }

    if n == 0 {
        return None;
    }

    let (dlat, dlon) = region.view_offset();
    Some(MapView {
        latitude: lat_sum / n as f64 + dlat,
        longitude: lon_sum / n as f64 + dlon,
        zoom: MAP_ZOOM,
        pitch: MAP_PITCH,
    })
}

/// Start positions of the region's trips during `hour`.
///
/// Trips without coordinates are left out; these points feed the external
/// hexagon layer, which does its own binning.
pub fn points_at_hour(records: &[TripRecord], region: Region, hour: Hour) -> Vec<MapPoint> {
    trips_at_hour(records, hour)
        .filter(|r| region.contains(r))
        .filter_map(TripRecord::coordinates)
        .map(|(latitude, longitude)| MapPoint {
            latitude,
            longitude,
        })
        .collect()
}
