use divvy_stats::dataset::Dataset;
use divvy_stats::error::{FileKind, LoadError, RowError};
use divvy_stats::report::Summary;
use divvy_stats::trip::{Gender, Rider};
use std::collections::BTreeSet;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_fixtures() -> Dataset {
    Dataset::load(&fixture("stations.csv"), &fixture("trips.csv")).expect("Failed to load fixtures")
}

#[test]
fn test_load_counts() {
    let data = load_fixtures();

    assert_eq!(data.number_stations(), 4);
    assert_eq!(data.number_trips(), 5);
    assert_eq!(data.total_duration(), 1788);
    assert_eq!(data.bike_ids(), &BTreeSet::from([77, 480]));
}

#[test]
fn test_trips_keep_file_order_and_rider_details() {
    let data = load_fixtures();
    let ids: Vec<u64> = data.trips().iter().map(|t| t.trip_id).collect();
    assert_eq!(ids, vec![4118, 4275, 4291, 4316, 4342]);

    assert_eq!(data.trips()[0].rider, Rider::Customer);
    assert_eq!(data.trips()[2].gender(), Some(Gender::Male));
    assert_eq!(data.trips()[2].birth_year(), Some(1983));
    assert_eq!(data.trips()[3].gender(), Some(Gender::Female));
    assert_eq!(data.trips()[3].birth_year(), None);
    assert_eq!(data.trips()[4].gender(), None);
    assert_eq!(data.trips()[4].birth_year(), Some(1990));
}

#[test]
fn test_trips_share_station_handles() {
    let data = load_fixtures();
    let station = data.station(5).unwrap();

    assert!(std::sync::Arc::ptr_eq(&data.trips()[0].from_station, station));
}

#[test]
fn test_bike_times_sum_to_total_duration() {
    let data = load_fixtures();
    let times = data.get_bike_times();

    assert_eq!(times[&77], 64 + 433 + 123);
    assert_eq!(times[&480], 316 + 852);
    assert_eq!(times.values().sum::<u64>(), data.total_duration());
}

#[test]
fn test_bike_movements() {
    let data = load_fixtures();
    let movements = data.get_bike_movements();

    let keys: BTreeSet<u32> = movements.keys().copied().collect();
    assert_eq!(&keys, data.bike_ids());

    let route: Vec<(u32, u32, i64)> = movements[&77]
        .iter()
        .map(|m| (m.from.station_id, m.to.station_id, m.capacity_delta))
        .collect();
    assert_eq!(route, vec![(14, 15, 0), (15, 5, 4), (5, 14, -4)]);
    assert_eq!(movements[&480].len(), 2);
}

#[test]
fn test_total_distance_skips_nothing() {
    let data = load_fixtures();
    let by_trip: f64 = data.trips().iter().map(|t| t.get_distance()).sum();

    assert!(data.total_distance() > 0.0);
    assert_eq!(data.total_distance(), by_trip);
    assert_eq!(data.trips()[4].get_distance(), 0.0);
}

#[test]
fn test_summary_report() {
    let data = load_fixtures();
    let summary = Summary::from_dataset(&data);

    assert_eq!(summary.most_used_bike, Some(480));
    assert_eq!(summary.most_used_bike_usage, Some(1168));
    assert_eq!(summary.average_movements, 2.5);
    assert_eq!(summary.capacity_delta_mean, 0.0);
    assert!((summary.capacity_delta_stddev - 6.4f64.sqrt()).abs() < 1e-9);

    let text = summary.to_string();
    assert!(text.contains("# of stations: 4"));
    assert!(text.contains("# of trips: 5"));
    assert!(text.contains("The aggregate total duration of all Divvy trips was 0h 29m 48s"));
    assert!(text.contains("The average duration of a Divvy trip was 0h 5m 57s"));
    assert!(text.contains("The most used bike is 480, used a total of 0h 19m 28s"));
    assert!(text.contains("The average number of times a bike was moved was 2.50"));
    assert!(text.contains("a bike is moved to a station with the same number of docks"));
    assert!(text.contains("(Standard deviation: 2.53)"));
}

#[test]
fn test_unknown_station_aborts_load() {
    let err = Dataset::load(
        &fixture("stations.csv"),
        &fixture("trips_unknown_station.csv"),
    )
    .unwrap_err();

    match err {
        LoadError::Row { file, line, kind, .. } => {
            assert_eq!(file, FileKind::Trips);
            assert_eq!(line, 3);
            assert_eq!(kind, RowError::UnknownStation(99));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_file_is_reported() {
    let err = Dataset::load(&fixture("no_such_stations.csv"), &fixture("trips.csv")).unwrap_err();

    assert!(matches!(err, LoadError::Open { .. }));
}
