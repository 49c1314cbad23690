//! Persisted chart options and data directory lookup.
//!
//! # Invariants
//! - Every option has a default, so partial or older files still load.

use crate::aggregate::granularity::Granularity;
use crate::aggregate::period::PeriodTemplate;
use crate::aggregate::summary::SummaryKind;
use crate::model::activity::ActivityId;
use crate::model::path::FolderPath;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the workspace directory.
pub const DATA_DIR_ENV: &str = "STREAKBOOK_DATA_DIR";

/// Chart style requested by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Single activity over time.
    #[default]
    Line,
    /// Stacked folder series.
    Bar,
    /// Folder totals as shares.
    Pie,
}

/// Last used chart configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub chart_kind: ChartKind,
    pub granularity: Granularity,
    pub ignore_zeros: bool,
    pub summary: SummaryKind,
    pub period: PeriodTemplate,
    pub custom_start: Option<NaiveDate>,
    pub custom_end: Option<NaiveDate>,
    pub activity: Option<ActivityId>,
    pub folder: Option<FolderPath>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            chart_kind: ChartKind::Line,
            granularity: Granularity::Day,
            ignore_zeros: true,
            summary: SummaryKind::Sum,
            period: PeriodTemplate::Last7Days,
            custom_start: None,
            custom_end: None,
            activity: None,
            folder: None,
        }
    }
}

impl ChartOptions {
    /// Switches to a custom range.
    pub fn set_custom_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.period = PeriodTemplate::Custom;
        self.custom_start = Some(start);
        self.custom_end = Some(end);
    }

    /// Inclusive range to aggregate, or `None` when it is incomplete or
    /// does not satisfy `start < end`.
    pub fn resolve_range(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = match self.period {
            PeriodTemplate::Custom => (self.custom_start?, self.custom_end?),
            template => template.resolve(today)?,
        };
        (start < end).then_some((start, end))
    }
}

/// Workspace directory from `STREAKBOOK_DATA_DIR`, when set and non-blank.
pub fn data_dir_from_env() -> Option<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.to_string_lossy().trim().is_empty())
        .map(PathBuf::from)
}
