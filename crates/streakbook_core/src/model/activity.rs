//! Activity domain model.
//!
//! # Responsibility
//! - Define the tracked-habit record with per-day measurements and comments.
//! - Track which of the three persisted record parts changed since last save.
//!
//! # Invariants
//! - `id` is assigned once and never changes across rename/move.
//! - An absent day and a zero measurement are equivalent; zero is not stored.
//! - `DecimalWithUnit` activities always carry a non-empty unit.
//!
//! # See also
//! - `repo::archive_repo` for the three-part record layout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an activity.
///
/// Also the only cross-reference used by persistence and media storage.
pub type ActivityId = Uuid;

/// Semantic type of the daily value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementMethod {
    /// Done or not done; values above one count repetitions.
    YesNo,
    /// Seconds spent.
    Duration,
    /// Free decimal quantity with a user-provided unit (km, kg, ...).
    DecimalWithUnit,
    /// Whole counts (push-ups, pages).
    IntegerCount,
}

/// Media kind captured alongside daily values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    #[default]
    None,
    Photo,
    Audio,
    Video,
}

impl AttachmentKind {
    /// File extension used by the media store, `None` for `AttachmentKind::None`.
    pub fn file_extension(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Photo => Some("jpg"),
            Self::Audio => Some("m4a"),
            Self::Video => Some("mov"),
        }
    }
}

/// Dirty markers for the independently persisted record parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyParts {
    pub metadata: bool,
    pub measurements: bool,
    pub comments: bool,
}

impl DirtyParts {
    /// All three parts need writing.
    pub fn all() -> Self {
        Self {
            metadata: true,
            measurements: true,
            comments: true,
        }
    }

    /// Returns whether any part needs writing.
    pub fn any(&self) -> bool {
        self.metadata || self.measurements || self.comments
    }
}

/// Validation errors for activity construction and edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityValidationError {
    /// `DecimalWithUnit` requires a unit label.
    MissingUnit,
    /// Measurement value is NaN or infinite.
    NonFiniteMeasurement(NaiveDate),
}

impl Display for ActivityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUnit => write!(f, "decimal activities require a unit"),
            Self::NonFiniteMeasurement(day) => {
                write!(f, "measurement for {day} must be a finite number")
            }
        }
    }
}

impl Error for ActivityValidationError {}

/// Metadata part of an activity record, persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMetadata {
    pub id: ActivityId,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub measurement_method: MeasurementMethod,
    #[serde(default)]
    pub attachment_kind: AttachmentKind,
}

/// Tracked habit or metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    id: ActivityId,
    name: String,
    unit: String,
    measurement_method: MeasurementMethod,
    attachment_kind: AttachmentKind,
    measurements: BTreeMap<NaiveDate, f64>,
    comments: BTreeMap<NaiveDate, String>,
    dirty: DirtyParts,
}

impl Activity {
    /// Creates a new activity with a generated id and empty day maps.
    ///
    /// The name is expected to be normalized by the caller (the store).
    /// All parts start dirty so the first save writes a complete record.
    pub fn new(
        name: impl Into<String>,
        measurement_method: MeasurementMethod,
        unit: impl Into<String>,
        attachment_kind: AttachmentKind,
    ) -> Result<Self, ActivityValidationError> {
        let unit = unit.into().trim().to_string();
        validate_unit(measurement_method, &unit)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            unit,
            measurement_method,
            attachment_kind,
            measurements: BTreeMap::new(),
            comments: BTreeMap::new(),
            dirty: DirtyParts::all(),
        })
    }

    /// Rebuilds an activity from persisted parts. The result is clean.
    pub fn from_parts(
        metadata: ActivityMetadata,
        measurements: BTreeMap<NaiveDate, f64>,
        comments: BTreeMap<NaiveDate, String>,
    ) -> Self {
        Self {
            id: metadata.id,
            name: metadata.name,
            unit: metadata.unit,
            measurement_method: metadata.measurement_method,
            attachment_kind: metadata.attachment_kind,
            measurements: measurements
                .into_iter()
                .filter(|(_, value)| *value != 0.0)
                .collect(),
            comments: comments
                .into_iter()
                .filter(|(_, text)| !text.is_empty())
                .collect(),
            dirty: DirtyParts::default(),
        }
    }

    pub fn id(&self) -> ActivityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn measurement_method(&self) -> MeasurementMethod {
        self.measurement_method
    }

    pub fn attachment_kind(&self) -> AttachmentKind {
        self.attachment_kind
    }

    /// Snapshot of the metadata part.
    pub fn metadata(&self) -> ActivityMetadata {
        ActivityMetadata {
            id: self.id,
            name: self.name.clone(),
            unit: self.unit.clone(),
            measurement_method: self.measurement_method,
            attachment_kind: self.attachment_kind,
        }
    }

    /// Renames the activity. Only the store may call this, because the
    /// owning folder keys its children by name.
    pub(crate) fn set_name(&mut self, name: String) {
        if self.name != name {
            self.name = name;
            self.dirty.metadata = true;
        }
    }

    /// Changes the unit label.
    pub fn set_unit(&mut self, unit: impl Into<String>) -> Result<(), ActivityValidationError> {
        let unit = unit.into().trim().to_string();
        validate_unit(self.measurement_method, &unit)?;
        if self.unit != unit {
            self.unit = unit;
            self.dirty.metadata = true;
        }
        Ok(())
    }

    /// Value recorded for `day`, `0.0` when nothing was recorded.
    pub fn measurement(&self, day: NaiveDate) -> f64 {
        self.measurements.get(&day).copied().unwrap_or(0.0)
    }

    pub fn measurements(&self) -> &BTreeMap<NaiveDate, f64> {
        &self.measurements
    }

    /// Replaces the value for `day`. Zero clears the entry.
    pub fn set_measurement(
        &mut self,
        day: NaiveDate,
        value: f64,
    ) -> Result<(), ActivityValidationError> {
        if !value.is_finite() {
            return Err(ActivityValidationError::NonFiniteMeasurement(day));
        }
        let changed = if value == 0.0 {
            self.measurements.remove(&day).is_some()
        } else {
            self.measurements.insert(day, value) != Some(value)
        };
        if changed {
            self.dirty.measurements = true;
        }
        Ok(())
    }

    /// Adds `delta` to the value for `day` (stopwatch and counter flows).
    pub fn add_measurement(
        &mut self,
        day: NaiveDate,
        delta: f64,
    ) -> Result<(), ActivityValidationError> {
        self.set_measurement(day, self.measurement(day) + delta)
    }

    pub fn comment(&self, day: NaiveDate) -> Option<&str> {
        self.comments.get(&day).map(String::as_str)
    }

    pub fn comments(&self) -> &BTreeMap<NaiveDate, String> {
        &self.comments
    }

    /// Replaces the comment for `day`. Blank text clears the entry.
    pub fn set_comment(&mut self, day: NaiveDate, text: impl Into<String>) {
        let text = text.into();
        let changed = if text.trim().is_empty() {
            self.comments.remove(&day).is_some()
        } else if self.comments.get(&day) == Some(&text) {
            false
        } else {
            self.comments.insert(day, text);
            true
        };
        if changed {
            self.dirty.comments = true;
        }
    }

    pub fn dirty_parts(&self) -> DirtyParts {
        self.dirty
    }

    /// Clears the markers of parts that were written.
    pub fn mark_saved(&mut self, written: DirtyParts) {
        if written.metadata {
            self.dirty.metadata = false;
        }
        if written.measurements {
            self.dirty.measurements = false;
        }
        if written.comments {
            self.dirty.comments = false;
        }
    }
}

fn validate_unit(method: MeasurementMethod, unit: &str) -> Result<(), ActivityValidationError> {
    if method == MeasurementMethod::DecimalWithUnit && unit.is_empty() {
        return Err(ActivityValidationError::MissingUnit);
    }
    Ok(())
}
