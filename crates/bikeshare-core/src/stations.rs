//! Start-station ranking.
//!
//! Counts follow frequency order: most trips first, ties broken by station
//! name so the ranking is stable across runs.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::trip::TripRecord;

/// Number of stations offered on the station comparison page.
pub const DEFAULT_TOP_N: usize = 15;

/// Trip count for one start station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationCount {
    /// Start station name.
    pub station: String,
    /// Trips started there.
    pub trip_count: u64,
}

fn ranked<'a>(records: impl Iterator<Item = &'a TripRecord>) -> Vec<StationCount> {
    let mut counts: HashMap<&'a str, u64> = HashMap::new();
    for r in records {
        *counts.entry(r.start_station_name.as_str()).or_insert(0) += 1;
    }

    let mut out: Vec<StationCount> = counts
        .into_iter()
        .map(|(station, trip_count)| StationCount {
            station: station.to_string(),
            trip_count,
        })
        .collect();
    out.sort_by(|a, b| {
        b.trip_count
            .cmp(&a.trip_count)
            .then_with(|| a.station.cmp(&b.station))
    });
    out
}

/// Trip counts for every start station, most frequent first.
pub fn station_counts(records: &[TripRecord]) -> Vec<StationCount> {
    ranked(records.iter())
}

/// Names of the `n` busiest start stations.
pub fn top_stations(records: &[TripRecord], n: usize) -> Vec<String> {
    station_counts(records)
        .into_iter()
        .take(n)
        .map(|c| c.station)
        .collect()
}

/// Trip counts restricted to `selected` stations, most frequent first.
///
/// Selected names with no trips do not appear; an empty selection yields an
/// empty ranking.
pub fn selected_station_counts(records: &[TripRecord], selected: &[String]) -> Vec<StationCount> {
    if selected.is_empty() {
        return Vec::new();
    }
    let wanted: HashSet<&str> = selected.iter().map(String::as_str).collect();
    ranked(
        records
            .iter()
            .filter(|r| wanted.contains(r.start_station_name.as_str())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trips(names: &[&str]) -> Vec<TripRecord> {
        names.iter().map(|n| TripRecord::new(None, *n)).collect()
    }

    #[test]
    fn station_counts_sorted_by_count_then_name() {
        let records = trips(&["B", "A", "C", "B", "C", "B"]);
        let counts = station_counts(&records);
        let flat: Vec<(&str, u64)> = counts
            .iter()
            .map(|c| (c.station.as_str(), c.trip_count))
            .collect();
        assert_eq!(flat, vec![("B", 3), ("C", 2), ("A", 1)]);
    }

    #[test]
    fn ties_break_alphabetically() {
        let records = trips(&["Zeta", "Alpha", "Mid"]);
        assert_eq!(top_stations(&records, 3), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn top_stations_truncates_to_n() {
        let records = trips(&["A", "A", "B", "C", "C", "C"]);
        assert_eq!(top_stations(&records, 2), vec!["C", "A"]);
        assert_eq!(top_stations(&records, 10).len(), 3);
        assert!(top_stations(&[], DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn selected_counts_only_include_selection() {
        let records = trips(&["A", "A", "B", "C", "C", "C"]);
        let selected = vec!["A".to_string(), "B".to_string(), "Missing".to_string()];
        let counts = selected_station_counts(&records, &selected);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].station, "A");
        assert_eq!(counts[0].trip_count, 2);
        assert_eq!(counts[1].station, "B");
        assert!(selected_station_counts(&records, &[]).is_empty());
    }
}
