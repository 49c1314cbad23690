use chrono::NaiveDate;
use std::collections::BTreeMap;
use streakbook_core::{
    aggregate_folder, aggregate_series, chart_activities, AggregateError, AttachmentKind,
    Granularity, MeasurementMethod, SeriesQuery, TimeScale, WorkspaceStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample() -> BTreeMap<NaiveDate, f64> {
    BTreeMap::from([(date(2024, 1, 1), 5.0), (date(2024, 1, 3), 3.0)])
}

#[test]
fn dense_day_range_without_suppression() {
    let query = SeriesQuery::new(date(2024, 1, 1), date(2024, 1, 3), Granularity::Day);
    let series = aggregate_series(&sample(), &query);

    assert_eq!(series.values(), vec![5.0, 0.0, 3.0]);
    assert_eq!(series.labels, vec!["01.01", "02.01", "03.01"]);
    let indices = series.points.iter().map(|p| p.index).collect::<Vec<_>>();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn suppression_drops_zero_buckets_and_reindexes() {
    let query = SeriesQuery::new(date(2024, 1, 1), date(2024, 1, 3), Granularity::Day)
        .ignoring_zeros(true);
    let series = aggregate_series(&sample(), &query);

    assert_eq!(series.values(), vec![5.0, 3.0]);
    let indices = series.points.iter().map(|p| p.index).collect::<Vec<_>>();
    assert_eq!(indices, vec![0, 1]);
    assert_eq!(series.labels, vec!["01.01", "03.01"]);
}

#[test]
fn aggregation_is_idempotent() {
    let query = SeriesQuery::new(date(2023, 11, 20), date(2024, 2, 3), Granularity::Week)
        .ignoring_zeros(true);
    let first = serde_json::to_vec(&aggregate_series(&sample(), &query)).unwrap();
    let second = serde_json::to_vec(&aggregate_series(&sample(), &query)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn year_buckets() {
    let measurements = BTreeMap::from([(date(2023, 6, 1), 2.0), (date(2024, 2, 1), 1.0)]);
    let query = SeriesQuery::new(date(2023, 3, 1), date(2024, 3, 1), Granularity::Year);
    let series = aggregate_series(&measurements, &query);
    assert_eq!(series.values(), vec![2.0, 1.0]);
    assert_eq!(series.labels, vec!["2023", "2024"]);
}

#[test]
fn folder_chart_from_store() {
    let mut store = WorkspaceStore::new();
    let music = store.create_folder("Music").unwrap();
    let piano = store
        .create_activity_in(music, "Piano", MeasurementMethod::Duration, "", AttachmentKind::None)
        .unwrap();
    let guitar = store
        .create_activity_in(music, "Guitar", MeasurementMethod::Duration, "", AttachmentKind::None)
        .unwrap();
    store
        .activity_mut(piano)
        .unwrap()
        .set_measurement(date(2024, 1, 1), 120.0)
        .unwrap();
    store
        .activity_mut(guitar)
        .unwrap()
        .set_measurement(date(2024, 1, 2), 60.0)
        .unwrap();

    let activities = chart_activities(&store, music).unwrap();
    let query = SeriesQuery::new(date(2024, 1, 1), date(2024, 1, 2), Granularity::Day);
    let folder = aggregate_folder(&activities, &query).unwrap();

    assert_eq!(folder.time_scale, Some(TimeScale::Minutes));
    // Ordered by name.
    assert_eq!(folder.series[0].name, "Guitar");
    assert_eq!(folder.series[0].series.values(), vec![0.0, 1.0]);
    assert_eq!(folder.series[1].series.values(), vec![2.0, 0.0]);
    let shares = folder.shares();
    assert_eq!(shares[1].percent, 66.67);
}

#[test]
fn folder_chart_rejects_mixed_units_and_empty_folder() {
    let mut store = WorkspaceStore::new();
    let sport = store.create_folder("Sport").unwrap();
    assert_eq!(
        chart_activities(&store, sport).unwrap_err(),
        AggregateError::EmptyFolder
    );

    store
        .create_activity_in(sport, "Run", MeasurementMethod::DecimalWithUnit, "km", AttachmentKind::None)
        .unwrap();
    store
        .create_activity_in(sport, "Swim", MeasurementMethod::DecimalWithUnit, "m", AttachmentKind::None)
        .unwrap();
    assert!(matches!(
        chart_activities(&store, sport),
        Err(AggregateError::MixedUnits { .. })
    ));
}
