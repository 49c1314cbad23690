//! Time-series aggregation over activity measurements.
//!
//! # Responsibility
//! - Bucket per-day measurements by day, ISO week, month or year.
//! - Align several activities on one label sequence with a shared scale.
//! - Provide the range presets, summaries and value formatting charts use.
//!
//! # Invariants
//! - Aggregation reads activities only; it never touches the store's tree.
//! - `start < end` is a caller contract and panics when violated.

pub mod folder;
pub mod format;
pub mod granularity;
pub mod period;
pub mod series;
pub mod summary;

use crate::model::activity::ActivityId;
use crate::service::workspace_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AggregateResult<T> = Result<T, AggregateError>;

/// Recoverable aggregation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// Folder chart requested for a folder without activities.
    EmptyFolder,
    /// Activity does not share the folder's measurement method and unit.
    MixedUnits { activity: ActivityId },
    /// Cancel flag was raised during the walk.
    Cancelled,
    /// Folder or activity lookup failed.
    Store(StoreError),
}

impl Display for AggregateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFolder => write!(f, "folder has no activities to aggregate"),
            Self::MixedUnits { activity } => write!(
                f,
                "activity {activity} does not share the folder's measurement method and unit"
            ),
            Self::Cancelled => write!(f, "aggregation cancelled"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AggregateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AggregateError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
