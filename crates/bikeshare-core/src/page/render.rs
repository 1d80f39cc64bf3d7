//! The four dashboard page renderers.

use snafu::prelude::*;

use crate::{
    aggregate::aggregate,
    demographics::{filter_by, filter_options},
    hourly::rides_per_hour,
    page::{
        AggregateSnafu, PageControls, PageError, SinkSnafu,
        sink::{Chart, ChartKind, Element, MapPanel, OptionList, PageSink, TablePanel},
    },
    region::{Region, filter_region, map_view, points_at_hour},
    session::Session,
    stations::{selected_station_counts, station_counts, top_stations},
    trip::TripRecord,
};

const RIDES: &str = "Number of Rides";
const TRIPS: &str = "Number of Trips";

const GEO_INTRO: &str = "Examining how bike share vary over time in Bay Area. \
    Pick an hour of the day to view different slices of time and explore \
    different rush hours.";

const PREVIEW_COLUMNS: [&str; 7] = [
    "start_date",
    "start_station_name",
    "start_station_latitude",
    "start_station_longitude",
    "subscriber_type",
    "member_birth_year",
    "member_gender",
];

fn emit(sink: &mut dyn PageSink, element: Element) -> Result<(), PageError> {
    sink.emit(element).context(SinkSnafu)
}

fn opt_to_string<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn preview_row(trip: &TripRecord) -> Vec<String> {
    vec![
        trip.start_date
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        trip.start_station_name.clone(),
        opt_to_string(&trip.start_station_latitude),
        opt_to_string(&trip.start_station_longitude),
        opt_to_string(&trip.subscriber_type),
        opt_to_string(&trip.member_birth_year),
        opt_to_string(&trip.member_gender),
    ]
}

/// Region maps at the selected hour, then the rides-per-hour distribution
/// over all trips.
pub(super) fn geographic(
    session: &Session,
    controls: &PageControls,
    sink: &mut dyn PageSink,
) -> Result<(), PageError> {
    let records = session.records();

    sink.title("Bay Area Bike Sharing Data").context(SinkSnafu)?;
    sink.text(GEO_INTRO).context(SinkSnafu)?;

    for region in Region::ALL {
        let view = map_view(filter_region(records, region), region);
        let points = points_at_hour(records, region, controls.hour);
        emit(
            sink,
            Element::Map(MapPanel {
                title: region.title().to_string(),
                hour: controls.hour,
                view,
                points,
            }),
        )?;
    }

    sink.header("Rides Per Hour Distribution").context(SinkSnafu)?;
    let hist = rides_per_hour(records);
    emit(
        sink,
        Element::Chart(Chart::from_series(
            ChartKind::StepArea,
            "Hour of the Day",
            RIDES,
            hist.to_series(),
        )),
    )
}

/// Trip counts per time bucket at the selected granularity.
pub(super) fn time(
    session: &Session,
    controls: &PageControls,
    sink: &mut dyn PageSink,
) -> Result<(), PageError> {
    let granularity = controls.granularity;
    let result = aggregate(session.records(), granularity).context(AggregateSnafu)?;

    sink.title("Time vs Rides Analysis").context(SinkSnafu)?;
    sink.text(&format!("Time frame: {}", granularity.label()))
        .context(SinkSnafu)?;
    emit(
        sink,
        Element::Chart(Chart::from_series(
            ChartKind::Bar,
            granularity.axis_title(),
            RIDES,
            result.to_series(),
        )),
    )
}

/// The busiest start stations, and a comparison of the selected ones.
pub(super) fn start_station(
    session: &Session,
    controls: &PageControls,
    sink: &mut dyn PageSink,
) -> Result<(), PageError> {
    let records = session.records();

    sink.title(&format!(
        "Top {} Start Station vs Rides Count Analysis",
        controls.top_n
    ))
    .context(SinkSnafu)?;

    emit(
        sink,
        Element::Options(OptionList {
            label: "Select two or more Start Stations".to_string(),
            values: top_stations(records, controls.top_n),
        }),
    )?;

    if controls.selected_stations.is_empty() {
        return sink
            .info("Select two or more start stations to visualize the number of rides.")
            .context(SinkSnafu);
    }

    let counts = selected_station_counts(records, &controls.selected_stations);
    emit(
        sink,
        Element::Chart(Chart::from_series(
            ChartKind::Area,
            "Start Station Name",
            TRIPS,
            counts.into_iter().map(|c| (c.station, c.trip_count)),
        )),
    )
}

/// Demographic filter with a preview of matching trips, then trip counts
/// for every start station.
pub(super) fn demographics(
    session: &Session,
    controls: &PageControls,
    sink: &mut dyn PageSink,
) -> Result<(), PageError> {
    let records = session.records();
    let column = controls.demographic_column;

    sink.title("User Demographics Analysis").context(SinkSnafu)?;

    let options = filter_options(records, column);
    emit(
        sink,
        Element::Options(OptionList::from_categories(
            format!("Select {}", column.label()),
            &options,
        )),
    )?;

    let selected = match &controls.demographic_value {
        Some(raw) => Some(column.parse_value(raw)),
        None => options.first().cloned(),
    };

    if let Some(value) = selected {
        let matching = filter_by(records, column, &value);
        sink.text(&format!("Filtered Data for {}: {value}", column.label()))
            .context(SinkSnafu)?;
        emit(
            sink,
            Element::Table(TablePanel {
                columns: PREVIEW_COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows: matching
                    .iter()
                    .take(controls.max_rows)
                    .map(|t| preview_row(t))
                    .collect(),
                total_rows: matching.len(),
            }),
        )?;
    }

    sink.header("Data Visualization").context(SinkSnafu)?;
    emit(
        sink,
        Element::Chart(Chart::from_series(
            ChartKind::HorizontalBar,
            "start_station_name",
            "trip_count",
            station_counts(records)
                .into_iter()
                .map(|c| (c.station, c.trip_count)),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        demographics::DemographicColumn, granularity::BucketGranularity, hourly::Hour,
        page::sink::RecordingSink,
    };
    use chrono::NaiveDate;

    fn trip(day: u32, hour: u32, station: &str) -> TripRecord {
        let ts = NaiveDate::from_ymd_opt(2018, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 30, 0))
            .expect("valid timestamp");
        TripRecord::new(Some(ts), station)
    }

    fn session() -> Session {
        Session::from_records(vec![
            trip(1, 8, "San Francisco Ferry Building")
                .with_location(37.795, -122.394)
                .with_subscriber_type("Subscriber")
                .with_gender("Male"),
            trip(1, 8, "San Francisco Ferry Building")
                .with_location(37.795, -122.394)
                .with_subscriber_type("Customer"),
            trip(2, 17, "Oakland City Hall")
                .with_location(37.805, -122.271)
                .with_subscriber_type("Subscriber")
                .with_birth_year(1980),
            trip(5, 12, "San Jose Diridon Station")
                .with_location(37.329, -121.902)
                .with_subscriber_type("Subscriber"),
        ])
    }

    #[test]
    fn geographic_emits_three_maps_and_hour_chart() -> Result<(), PageError> {
        let controls = PageControls {
            hour: Hour::new(8).expect("hour"),
            ..PageControls::default()
        };
        let mut sink = RecordingSink::new();
        geographic(&session(), &controls, &mut sink)?;

        let maps: Vec<&MapPanel> = sink
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::Map(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(maps.len(), 3);
        assert_eq!(maps[0].title, "San Francisco Area");
        assert_eq!(maps[0].points.len(), 2);
        assert!(maps[1].points.is_empty());
        assert!(maps[1].view.is_some());

        let chart = sink.charts().next().expect("hour chart");
        assert_eq!(chart.kind, ChartKind::StepArea);
        assert_eq!(chart.points.len(), 24);
        assert_eq!(chart.points[8].value, 2);
        Ok(())
    }

    #[test]
    fn time_page_charts_aggregation() -> Result<(), PageError> {
        let controls = PageControls {
            granularity: BucketGranularity::ByDate,
            ..PageControls::default()
        };
        let mut sink = RecordingSink::new();
        time(&session(), &controls, &mut sink)?;

        let chart = sink.charts().next().expect("time chart");
        assert_eq!(chart.kind, ChartKind::Bar);
        let labels: Vec<&str> = chart.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2018-01-01", "2018-01-02", "2018-01-05"]);
        assert_eq!(chart.points[0].value, 2);
        Ok(())
    }

    #[test]
    fn time_page_surfaces_missing_timestamps() {
        let session = Session::from_records(vec![TripRecord::new(None, "A")]);
        let mut sink = RecordingSink::new();
        let err = time(&session, &PageControls::default(), &mut sink).expect_err("must fail");
        assert!(matches!(err, PageError::Aggregate { .. }));
        assert!(sink.elements().is_empty());
    }

    #[test]
    fn station_page_without_selection_shows_info() -> Result<(), PageError> {
        let mut sink = RecordingSink::new();
        start_station(&session(), &PageControls::default(), &mut sink)?;

        assert!(matches!(sink.elements().last(), Some(Element::Info(_))));
        match &sink.elements()[1] {
            Element::Options(opts) => {
                assert_eq!(opts.values[0], "San Francisco Ferry Building");
                assert_eq!(opts.values.len(), 3);
            }
            other => panic!("expected options, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn station_page_charts_selection() -> Result<(), PageError> {
        let controls = PageControls {
            selected_stations: vec![
                "Oakland City Hall".to_string(),
                "San Francisco Ferry Building".to_string(),
            ],
            ..PageControls::default()
        };
        let mut sink = RecordingSink::new();
        start_station(&session(), &controls, &mut sink)?;

        let chart = sink.charts().next().expect("station chart");
        assert_eq!(chart.kind, ChartKind::Area);
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].label, "San Francisco Ferry Building");
        assert_eq!(chart.points[0].value, 2);
        Ok(())
    }

    #[test]
    fn demographics_defaults_to_first_option() -> Result<(), PageError> {
        let mut sink = RecordingSink::new();
        demographics(&session(), &PageControls::default(), &mut sink)?;

        assert!(sink.elements().contains(&Element::Text(
            "Filtered Data for Subscriber Type: Subscriber".to_string()
        )));
        let table = sink
            .elements()
            .iter()
            .find_map(|e| match e {
                Element::Table(t) => Some(t),
                _ => None,
            })
            .expect("table preview");
        assert_eq!(table.total_rows, 3);
        assert_eq!(table.columns.len(), PREVIEW_COLUMNS.len());
        Ok(())
    }

    #[test]
    fn demographics_filters_unknown_and_limits_rows() -> Result<(), PageError> {
        let controls = PageControls {
            demographic_column: DemographicColumn::MemberGender,
            demographic_value: Some("unknown".to_string()),
            max_rows: 1,
            ..PageControls::default()
        };
        let mut sink = RecordingSink::new();
        demographics(&session(), &controls, &mut sink)?;

        let table = sink
            .elements()
            .iter()
            .find_map(|e| match e {
                Element::Table(t) => Some(t),
                _ => None,
            })
            .expect("table preview");
        assert_eq!(table.total_rows, 3);
        assert_eq!(table.rows.len(), 1);

        let chart = sink.charts().last().expect("station totals");
        assert_eq!(chart.kind, ChartKind::HorizontalBar);
        assert_eq!(chart.points[0].value, 2);
        Ok(())
    }
}
