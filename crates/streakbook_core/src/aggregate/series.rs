//! Single-activity bucketed series.
//!
//! # Responsibility
//! - Sum per-day measurements into day/week/month/year buckets.
//! - Drop zero buckets on request, reindexing what remains.
//!
//! # Invariants
//! - `points.len() == labels.len()` and `points[i].index == i`.
//! - Identical inputs produce identical output.
//! - `start < end` is a caller contract; violating it panics.

use crate::aggregate::granularity::Granularity;
use crate::aggregate::{AggregateError, AggregateResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Range, bucket size and suppression policy of one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesQuery {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub ignore_zeros: bool,
}

impl SeriesQuery {
    pub fn new(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Self {
        Self {
            start,
            end,
            granularity,
            ignore_zeros: false,
        }
    }

    pub fn ignoring_zeros(mut self, ignore_zeros: bool) -> Self {
        self.ignore_zeros = ignore_zeros;
        self
    }
}

/// One emitted bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub index: usize,
    pub value: f64,
}

/// Bucket values with parallel labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub points: Vec<SeriesPoint>,
    pub labels: Vec<String>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|point| point.value).sum()
    }

    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.value)
            .fold(0.0, f64::max)
    }

    /// Keeps the buckets whose position satisfies `keep`, renumbering from 0.
    pub(crate) fn retain_indices(&mut self, keep: impl Fn(usize) -> bool) {
        let points = std::mem::take(&mut self.points);
        let labels = std::mem::take(&mut self.labels);
        for (position, (point, label)) in points.into_iter().zip(labels).enumerate() {
            if keep(position) {
                self.points.push(SeriesPoint {
                    index: self.points.len(),
                    value: point.value,
                });
                self.labels.push(label);
            }
        }
    }

    pub(crate) fn scale(&mut self, divisor: f64) {
        for point in &mut self.points {
            point.value /= divisor;
        }
    }
}

/// Aggregates `measurements` over `query`.
///
/// # Panics
/// Panics when `query.start >= query.end`.
pub fn aggregate_series(measurements: &BTreeMap<NaiveDate, f64>, query: &SeriesQuery) -> Series {
    let never = AtomicBool::new(false);
    walk(measurements, query, &never).unwrap_or_default()
}

/// Same as [`aggregate_series`] but stops with `Cancelled` once `cancel` is set.
///
/// # Panics
/// Panics when `query.start >= query.end`.
pub fn aggregate_series_cancellable(
    measurements: &BTreeMap<NaiveDate, f64>,
    query: &SeriesQuery,
    cancel: &AtomicBool,
) -> AggregateResult<Series> {
    walk(measurements, query, cancel)
}

fn walk(
    measurements: &BTreeMap<NaiveDate, f64>,
    query: &SeriesQuery,
    cancel: &AtomicBool,
) -> AggregateResult<Series> {
    assert!(
        query.start < query.end,
        "aggregation range must satisfy start < end (got {} .. {})",
        query.start,
        query.end
    );
    let granularity = query.granularity;
    let (start, end) = granularity.snap(query.start, query.end);

    let mut series = Series::default();
    let mut current_key = granularity.bucket_key(start);
    let mut previous = start;
    let mut sum = 0.0;
    for day in start.iter_days().take_while(|day| *day <= end) {
        if cancel.load(Ordering::Relaxed) {
            return Err(AggregateError::Cancelled);
        }
        let key = granularity.bucket_key(day);
        if key != current_key {
            push_bucket(&mut series, sum, granularity.label(previous));
            current_key = key;
            sum = 0.0;
        }
        sum += measurements.get(&day).copied().unwrap_or(0.0);
        previous = day;
    }
    push_bucket(&mut series, sum, granularity.label(end));

    if query.ignore_zeros {
        let keep = series.values().iter().map(|value| *value != 0.0).collect::<Vec<_>>();
        series.retain_indices(|position| keep[position]);
    }
    Ok(series)
}

fn push_bucket(series: &mut Series, value: f64, label: String) {
    series.points.push(SeriesPoint {
        index: series.points.len(),
        value,
    });
    series.labels.push(label);
}
