//! Core domain logic for Streakbook.
//! Owns the activity tree, its persistence and the chart aggregation.

pub mod aggregate;
pub mod config;
pub mod context;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use aggregate::folder::{
    aggregate_folder, aggregate_folder_cancellable, chart_activities, scale_duration_series,
    FolderSeries, SeriesShare, TimeScale,
};
pub use aggregate::format::{format_duration, format_measurement};
pub use aggregate::granularity::Granularity;
pub use aggregate::period::PeriodTemplate;
pub use aggregate::series::{
    aggregate_series, aggregate_series_cancellable, Series, SeriesPoint, SeriesQuery,
};
pub use aggregate::summary::SummaryKind;
pub use aggregate::{AggregateError, AggregateResult};
pub use config::{ChartKind, ChartOptions, DATA_DIR_ENV};
pub use context::AppContext;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{
    Activity, ActivityId, ActivityMetadata, ActivityValidationError, AttachmentKind, DirtyParts,
    MeasurementMethod,
};
pub use model::folder::{Folder, FolderId};
pub use model::path::{is_proper_descendant_path, EntryKind, FolderPath, NameError};
pub use repo::archive_repo::{ArchiveError, ArchiveRepository, ArchiveResult, MediaLayout, SaveReport};
pub use repo::tree_codec::{CodecError, CodecResult};
pub use service::selection::{SelectionMode, SelectionState, SubtreeSelection};
pub use service::workspace_store::{
    RootOperation, StoreError, StoreResult, TreeEntry, WorkspaceStore,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
