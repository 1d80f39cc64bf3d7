use bikeshare_dashboard::prelude::*;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[test]
fn prelude_renders_pages_from_in_memory_session() -> TestResult {
    let records = vec![
        TripRecord::new(
            parse_timestamp("2018-02-14 08:05:00"),
            "San Francisco Ferry Building",
        )
        .with_location(37.795, -122.394),
        TripRecord::new(parse_timestamp("2018-03-01T12:00:00Z"), "Oakland City Hall")
            .with_location(37.805, -122.271),
    ];
    let session = Session::from_records(records);
    let registry = PageRegistry::standard();
    let controls = PageControls {
        granularity: BucketGranularity::ByMonth,
        ..PageControls::default()
    };

    let mut sink = page::RecordingSink::new();
    registry.render(PageId::Time, &session, &controls, &mut sink)?;
    let chart = sink.charts().next().ok_or("time chart")?;
    let labels: Vec<&str> = chart.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["2018-02", "2018-03"]);

    let by_day = aggregate(session.records(), BucketGranularity::ByDayOfMonth)?;
    assert_eq!(by_day.count_for(&BucketKey::DayOfMonth(14)), 1);
    Ok(())
}
