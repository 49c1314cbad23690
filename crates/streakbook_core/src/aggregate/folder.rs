//! Multi-series aggregation over the activities of one folder.
//!
//! # Responsibility
//! - Aggregate several activities over one shared label sequence.
//! - Normalize duration series with a single shared time scale.
//! - Derive per-series totals and share percentages.
//!
//! # Invariants
//! - Every series in a `FolderSeries` has exactly `labels.len()` points.
//! - A bucket is suppressed only when it is zero in every series.
//! - One scale applies to all series; series are never scaled independently.

use crate::aggregate::series::{aggregate_series_cancellable, Series, SeriesQuery};
use crate::aggregate::{AggregateError, AggregateResult};
use crate::model::activity::{Activity, ActivityId, MeasurementMethod};
use crate::model::folder::FolderId;
use crate::service::workspace_store::WorkspaceStore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;

/// Display unit chosen for duration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeScale {
    Seconds,
    Minutes,
    Hours,
}

impl TimeScale {
    /// Picks the largest unit that keeps `max_seconds` at or above one.
    pub fn for_max(max_seconds: f64) -> Self {
        if max_seconds >= 3600.0 {
            Self::Hours
        } else if max_seconds >= 60.0 {
            Self::Minutes
        } else {
            Self::Seconds
        }
    }

    pub fn divisor(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
        }
    }
}

/// One activity's series inside a folder aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySeries {
    pub activity: ActivityId,
    pub name: String,
    pub series: Series,
}

/// Aligned series of every activity in a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderSeries {
    pub labels: Vec<String>,
    pub series: Vec<ActivitySeries>,
    pub measurement_method: MeasurementMethod,
    pub unit: String,
    /// Set for duration folders.
    pub time_scale: Option<TimeScale>,
}

/// Pie slice of one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesShare {
    pub activity: ActivityId,
    pub name: String,
    pub total: f64,
    pub percent: f64,
}

impl FolderSeries {
    /// Per-series totals and their share of the grand total, rounded to two
    /// decimals. Shares are zero when the grand total is zero.
    pub fn shares(&self) -> Vec<SeriesShare> {
        let totals = self
            .series
            .iter()
            .map(|entry| round2(entry.series.total()))
            .collect::<Vec<_>>();
        let grand_total: f64 = totals.iter().sum();
        self.series
            .iter()
            .zip(totals)
            .map(|(entry, total)| SeriesShare {
                activity: entry.activity,
                name: entry.name.clone(),
                total,
                percent: if grand_total == 0.0 {
                    0.0
                } else {
                    round2(total / grand_total * 100.0)
                },
            })
            .collect()
    }

    /// Stacked bucket values: one row per label, one column per series.
    pub fn stacks(&self) -> Vec<Vec<f64>> {
        (0..self.labels.len())
            .map(|position| {
                self.series
                    .iter()
                    .map(|entry| {
                        entry
                            .series
                            .points
                            .get(position)
                            .map_or(0.0, |point| point.value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Activities directly inside `folder`, checked for a shared method and unit.
pub fn chart_activities(
    store: &WorkspaceStore,
    folder: FolderId,
) -> AggregateResult<Vec<&Activity>> {
    let activities = store.activities_in(folder)?;
    ensure_uniform(&activities)?;
    Ok(activities)
}

/// Aggregates every activity with the same range and granularity.
pub fn aggregate_folder(
    activities: &[&Activity],
    query: &SeriesQuery,
) -> AggregateResult<FolderSeries> {
    aggregate_folder_cancellable(activities, query, &AtomicBool::new(false))
}

/// Cancellable form of [`aggregate_folder`].
///
/// # Panics
/// Panics when `query.start >= query.end`.
pub fn aggregate_folder_cancellable(
    activities: &[&Activity],
    query: &SeriesQuery,
    cancel: &AtomicBool,
) -> AggregateResult<FolderSeries> {
    let (method, unit) = ensure_uniform(activities)?;
    let dense = query.ignoring_zeros(false);

    let mut series = Vec::with_capacity(activities.len());
    for activity in activities {
        series.push(ActivitySeries {
            activity: activity.id(),
            name: activity.name().to_string(),
            series: aggregate_series_cancellable(activity.measurements(), &dense, cancel)?,
        });
    }

    if query.ignore_zeros {
        let width = series.first().map_or(0, |entry| entry.series.len());
        let keep = (0..width)
            .map(|position| {
                series.iter().any(|entry| {
                    entry
                        .series
                        .points
                        .get(position)
                        .is_some_and(|point| point.value != 0.0)
                })
            })
            .collect::<Vec<_>>();
        for entry in &mut series {
            entry.series.retain_indices(|position| keep[position]);
        }
    }

    let time_scale = (method == MeasurementMethod::Duration).then(|| {
        let mut plain = series
            .iter_mut()
            .map(|entry| &mut entry.series)
            .collect::<Vec<_>>();
        scale_duration_group(&mut plain)
    });

    let labels = series
        .first()
        .map(|entry| entry.series.labels.clone())
        .unwrap_or_default();
    Ok(FolderSeries {
        labels,
        series,
        measurement_method: method,
        unit,
        time_scale,
    })
}

/// Rescales one duration series (values in seconds) by its own maximum.
pub fn scale_duration_series(series: &mut Series) -> TimeScale {
    scale_duration_group(&mut [series])
}

fn scale_duration_group(group: &mut [&mut Series]) -> TimeScale {
    let max = group
        .iter()
        .map(|series| series.max_value())
        .fold(0.0, f64::max);
    let scale = TimeScale::for_max(max);
    if scale != TimeScale::Seconds {
        for series in group.iter_mut() {
            series.scale(scale.divisor());
        }
    }
    scale
}

fn ensure_uniform(activities: &[&Activity]) -> AggregateResult<(MeasurementMethod, String)> {
    let Some(first) = activities.first() else {
        return Err(AggregateError::EmptyFolder);
    };
    for activity in &activities[1..] {
        if activity.measurement_method() != first.measurement_method()
            || activity.unit() != first.unit()
        {
            return Err(AggregateError::MixedUnits {
                activity: activity.id(),
            });
        }
    }
    Ok((first.measurement_method(), first.unit().to_string()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
