//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose workspace and chart use cases to Dart via FRB.
//! - Translate typed core errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutating call opens the workspace, applies one use case and saves.
//! - Folder locations cross the boundary as absolute paths (`/a/b`),
//!   activities as uuid strings, days as `YYYY-MM-DD`.

use chrono::NaiveDate;
use log::{info, warn};
use std::path::PathBuf;
use streakbook_core::config::data_dir_from_env;
use streakbook_core::{
    aggregate_folder, aggregate_series, chart_activities, core_version as core_version_inner,
    format_measurement, init_logging as init_logging_inner, ping as ping_inner,
    scale_duration_series, AppContext, AttachmentKind, FolderPath, Granularity,
    MeasurementMethod, SeriesQuery, TreeEntry,
};
use uuid::Uuid;

const DEFAULT_DATA_DIR_NAME: &str = "streakbook";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// `level` is one of `trace|debug|info|warn|error`; `log_dir` must be
/// absolute. Returns an empty string on success and the error message on
/// failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result envelope for mutating workspace calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceActionResponse {
    pub ok: bool,
    /// Folder path or activity id of the affected entry.
    pub entry_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl WorkspaceActionResponse {
    fn success(message: impl Into<String>, entry_id: Option<String>) -> Self {
        Self {
            ok: true,
            entry_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            message: message.into(),
        }
    }
}

/// One row of the tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEntryItem {
    /// `folder` or `activity`.
    pub kind: String,
    pub name: String,
    /// Folder path for folders, owning folder path for activities.
    pub path: String,
    pub depth: u32,
    pub activity_id: Option<String>,
    /// Method of an activity in snake case.
    pub measurement_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceListResponse {
    pub ok: bool,
    pub items: Vec<WorkspaceEntryItem>,
    pub message: String,
}

/// One plotted line or stack layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeriesItem {
    pub name: String,
    pub values: Vec<f64>,
    /// Share of the grand total in percent (folder charts only).
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeriesResponse {
    pub ok: bool,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeriesItem>,
    /// Axis unit, e.g. `km` or `m` for minutes.
    pub unit: String,
    /// Formatted summary according to the saved summary kind.
    pub summary: String,
    pub message: String,
}

impl ChartSeriesResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            labels: Vec::new(),
            series: Vec::new(),
            unit: String::new(),
            summary: String::new(),
            message: message.into(),
        }
    }
}

/// Lists the whole tree in pre-order.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_list(data_dir: String) -> WorkspaceListResponse {
    let result = with_context(&data_dir, |context| {
        let store = context.store();
        let mut items = Vec::new();
        let mut failure = None;
        store.traverse(|entry| match entry {
            TreeEntry::Folder { id, folder, depth } => match store.folder_path(id) {
                Ok(path) => items.push(WorkspaceEntryItem {
                    kind: "folder".to_string(),
                    name: folder.name().to_string(),
                    path: path.to_string(),
                    depth: depth as u32,
                    activity_id: None,
                    measurement_method: None,
                }),
                Err(err) => failure = Some(err.to_string()),
            },
            TreeEntry::Activity {
                folder,
                activity,
                depth,
            } => match store.folder_path(folder) {
                Ok(path) => items.push(WorkspaceEntryItem {
                    kind: "activity".to_string(),
                    name: activity.name().to_string(),
                    path: path.to_string(),
                    depth: depth as u32,
                    activity_id: Some(activity.id().to_string()),
                    measurement_method: Some(
                        method_label(activity.measurement_method()).to_string(),
                    ),
                }),
                Err(err) => failure = Some(err.to_string()),
            },
        });
        match failure {
            Some(message) => Err(message),
            None => Ok(items),
        }
    });
    match result {
        Ok(items) => WorkspaceListResponse {
            ok: true,
            message: format!("Listed {} entr(y/ies).", items.len()),
            items,
        },
        Err(err) => WorkspaceListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("workspace_list failed: {err}"),
        },
    }
}

/// Creates folder `name` under `parent_path`.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_create_folder(
    data_dir: String,
    parent_path: String,
    name: String,
) -> WorkspaceActionResponse {
    let result = with_context(&data_dir, |context| {
        let parent = parse_folder_path(&parent_path)?;
        let store = context.store_mut();
        let parent_id = store.folder_at(&parent).map_err(|err| err.to_string())?;
        let id = store
            .create_folder_in(parent_id, &name)
            .map_err(|err| err.to_string())?;
        store
            .folder_path(id)
            .map(|path| path.to_string())
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(path) => WorkspaceActionResponse::success("Folder created.", Some(path)),
        Err(err) => {
            WorkspaceActionResponse::failure(format!("workspace_create_folder failed: {err}"))
        }
    }
}

/// Creates an activity inside `folder_path`.
///
/// `measurement_method`: `yes_no|duration|decimal_with_unit|integer_count`.
/// `attachment_kind`: `none|photo|audio|video` (empty means `none`).
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_create_activity(
    data_dir: String,
    folder_path: String,
    name: String,
    measurement_method: String,
    unit: String,
    attachment_kind: String,
) -> WorkspaceActionResponse {
    let result = with_context(&data_dir, |context| {
        let folder = parse_folder_path(&folder_path)?;
        let method = parse_method(&measurement_method)?;
        let attachment = parse_attachment(&attachment_kind)?;
        let store = context.store_mut();
        let folder_id = store.folder_at(&folder).map_err(|err| err.to_string())?;
        store
            .create_activity_in(folder_id, &name, method, &unit, attachment)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => WorkspaceActionResponse::success("Activity created.", Some(id.to_string())),
        Err(err) => {
            WorkspaceActionResponse::failure(format!("workspace_create_activity failed: {err}"))
        }
    }
}

/// Sets the value of `activity_id` on `day`. Zero clears the day.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_record_measurement(
    data_dir: String,
    activity_id: String,
    day: String,
    value: f64,
) -> WorkspaceActionResponse {
    let result = with_context(&data_dir, |context| {
        let id = parse_activity_id(&activity_id)?;
        let day = parse_day(&day)?;
        context
            .store_mut()
            .activity_mut(id)
            .map_err(|err| err.to_string())?
            .set_measurement(day, value)
            .map_err(|err| err.to_string())?;
        Ok(id)
    });
    match result {
        Ok(id) => WorkspaceActionResponse::success("Measurement recorded.", Some(id.to_string())),
        Err(err) => WorkspaceActionResponse::failure(format!(
            "workspace_record_measurement failed: {err}"
        )),
    }
}

/// Moves the folder at `folder_path` under `destination_path`.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_move_folder(
    data_dir: String,
    folder_path: String,
    destination_path: String,
) -> WorkspaceActionResponse {
    let result = with_context(&data_dir, |context| {
        let folder = parse_folder_path(&folder_path)?;
        let destination = parse_folder_path(&destination_path)?;
        let store = context.store_mut();
        let folder_id = store.folder_at(&folder).map_err(|err| err.to_string())?;
        let destination_id = store
            .folder_at(&destination)
            .map_err(|err| err.to_string())?;
        store
            .move_folder(folder_id, destination_id)
            .map_err(|err| err.to_string())?;
        store
            .folder_path(folder_id)
            .map(|path| path.to_string())
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(path) => WorkspaceActionResponse::success("Folder moved.", Some(path)),
        Err(err) => WorkspaceActionResponse::failure(format!("workspace_move_folder failed: {err}")),
    }
}

/// Deletes the folder at `folder_path`, merging its contents into the parent.
#[flutter_rust_bridge::frb(sync)]
pub fn workspace_delete_folder(data_dir: String, folder_path: String) -> WorkspaceActionResponse {
    let result = with_context(&data_dir, |context| {
        let folder = parse_folder_path(&folder_path)?;
        let store = context.store_mut();
        let folder_id = store.folder_at(&folder).map_err(|err| err.to_string())?;
        store.delete_folder(folder_id).map_err(|err| err.to_string())
    });
    match result {
        Ok(()) => WorkspaceActionResponse::success("Folder deleted.", None),
        Err(err) => {
            WorkspaceActionResponse::failure(format!("workspace_delete_folder failed: {err}"))
        }
    }
}

/// Aggregates one activity (`activity_id`) or one folder (`folder_path`).
///
/// Exactly one target must be given. The choice, granularity and
/// suppression flag are remembered in the chart options.
///
/// # FFI contract
/// - Rejects `start >= end` with an error envelope instead of panicking.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_series(
    data_dir: String,
    activity_id: Option<String>,
    folder_path: Option<String>,
    start: String,
    end: String,
    granularity: String,
    ignore_zeros: bool,
) -> ChartSeriesResponse {
    let result = with_context(&data_dir, |context| {
        let start = parse_day(&start)?;
        let end = parse_day(&end)?;
        if start >= end {
            return Err(format!("start {start} must be before end {end}"));
        }
        let granularity = parse_granularity(&granularity)?;
        let query = SeriesQuery::new(start, end, granularity).ignoring_zeros(ignore_zeros);

        let response = match (activity_id.as_deref(), folder_path.as_deref()) {
            (Some(raw_id), None) => {
                let id = parse_activity_id(raw_id)?;
                let chart = activity_chart(context, id, &query)?;
                context.options_mut().activity = Some(id);
                chart
            }
            (None, Some(raw_path)) => {
                let path = parse_folder_path(raw_path)?;
                let chart = folder_chart(context, &path, &query)?;
                context.options_mut().folder = Some(path);
                chart
            }
            _ => return Err("exactly one of activity_id or folder_path is required".to_string()),
        };
        let options = context.options_mut();
        options.granularity = granularity;
        options.ignore_zeros = ignore_zeros;
        Ok(response)
    });
    result.unwrap_or_else(|err| ChartSeriesResponse::failure(format!("chart_series failed: {err}")))
}

fn activity_chart(
    context: &AppContext,
    id: Uuid,
    query: &SeriesQuery,
) -> Result<ChartSeriesResponse, String> {
    let activity = context.store().activity(id).map_err(|err| err.to_string())?;
    let method = activity.measurement_method();
    let mut series = aggregate_series(activity.measurements(), query);
    let summary = context
        .options()
        .summary
        .apply(&series.values())
        .map(|value| format_measurement(method, activity.unit(), value))
        .unwrap_or_default();
    let unit = if method == MeasurementMethod::Duration {
        scale_duration_series(&mut series).suffix().to_string()
    } else {
        activity.unit().to_string()
    };
    Ok(ChartSeriesResponse {
        ok: true,
        message: format!("Aggregated {} bucket(s).", series.len()),
        series: vec![ChartSeriesItem {
            name: activity.name().to_string(),
            values: series.values(),
            percent: None,
        }],
        labels: series.labels,
        unit,
        summary,
    })
}

fn folder_chart(
    context: &AppContext,
    path: &FolderPath,
    query: &SeriesQuery,
) -> Result<ChartSeriesResponse, String> {
    let store = context.store();
    let folder = store.folder_at(path).map_err(|err| err.to_string())?;
    let activities = chart_activities(store, folder).map_err(|err| err.to_string())?;
    let aggregated = aggregate_folder(&activities, query).map_err(|err| err.to_string())?;

    let divisor = aggregated.time_scale.map_or(1.0, |scale| scale.divisor());
    let bucket_totals = aggregated
        .stacks()
        .iter()
        .map(|stack| stack.iter().sum::<f64>() * divisor)
        .collect::<Vec<_>>();
    let summary = context
        .options()
        .summary
        .apply(&bucket_totals)
        .map(|value| format_measurement(aggregated.measurement_method, &aggregated.unit, value))
        .unwrap_or_default();
    let unit = match aggregated.time_scale {
        Some(scale) => scale.suffix().to_string(),
        None => aggregated.unit.clone(),
    };
    let shares = aggregated.shares();
    let series = aggregated
        .series
        .iter()
        .zip(shares)
        .map(|(entry, share)| ChartSeriesItem {
            name: entry.name.clone(),
            values: entry.series.values(),
            percent: Some(share.percent),
        })
        .collect::<Vec<_>>();
    Ok(ChartSeriesResponse {
        ok: true,
        message: format!(
            "Aggregated {} series over {} bucket(s).",
            series.len(),
            aggregated.labels.len()
        ),
        labels: aggregated.labels,
        series,
        unit,
        summary,
    })
}

/// Workspace directory: explicit argument, then `STREAKBOOK_DATA_DIR`, then
/// a directory under the system temp dir.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    let trimmed = data_dir.trim();
    if !trimmed.is_empty() {
        return PathBuf::from(trimmed);
    }
    data_dir_from_env().unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME))
}

fn with_context<T>(
    data_dir: &str,
    f: impl FnOnce(&mut AppContext) -> Result<T, String>,
) -> Result<T, String> {
    let dir = resolve_data_dir(data_dir);
    let mut context =
        AppContext::open(&dir).map_err(|err| format!("workspace open failed: {err}"))?;
    let value = f(&mut context)?;
    let report = context
        .save_all()
        .map_err(|err| format!("workspace save failed: {err}"))?;
    if !report.is_noop() {
        info!(
            "event=ffi_save module=ffi status=ok index={} released={}",
            report.index_written, report.released_removed
        );
    }
    Ok(value)
}

fn parse_folder_path(raw: &str) -> Result<FolderPath, String> {
    FolderPath::parse(raw.trim()).ok_or_else(|| format!("invalid folder path `{raw}`"))
}

fn parse_activity_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        warn!("event=ffi_parse module=ffi status=error field=activity_id");
        format!("invalid activity id `{raw}`")
    })
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid day `{raw}`; expected YYYY-MM-DD"))
}

fn parse_method(raw: &str) -> Result<MeasurementMethod, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes_no" => Ok(MeasurementMethod::YesNo),
        "duration" => Ok(MeasurementMethod::Duration),
        "decimal_with_unit" => Ok(MeasurementMethod::DecimalWithUnit),
        "integer_count" => Ok(MeasurementMethod::IntegerCount),
        other => Err(format!(
            "unsupported measurement method `{other}`; expected yes_no|duration|decimal_with_unit|integer_count"
        )),
    }
}

fn method_label(method: MeasurementMethod) -> &'static str {
    match method {
        MeasurementMethod::YesNo => "yes_no",
        MeasurementMethod::Duration => "duration",
        MeasurementMethod::DecimalWithUnit => "decimal_with_unit",
        MeasurementMethod::IntegerCount => "integer_count",
    }
}

fn parse_attachment(raw: &str) -> Result<AttachmentKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(AttachmentKind::None),
        "photo" => Ok(AttachmentKind::Photo),
        "audio" => Ok(AttachmentKind::Audio),
        "video" => Ok(AttachmentKind::Video),
        other => Err(format!(
            "unsupported attachment kind `{other}`; expected none|photo|audio|video"
        )),
    }
}

fn parse_granularity(raw: &str) -> Result<Granularity, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "day" => Ok(Granularity::Day),
        "week" => Ok(Granularity::Week),
        "month" => Ok(Granularity::Month),
        "year" => Ok(Granularity::Year),
        other => Err(format!(
            "unsupported granularity `{other}`; expected day|week|month|year"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        chart_series, core_version, init_logging, ping, workspace_create_activity,
        workspace_create_folder, workspace_delete_folder, workspace_list, workspace_move_folder,
        workspace_record_measurement,
    };

    fn data_dir() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().to_str().expect("utf-8 temp dir").to_string();
        (dir, path)
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn created_entries_are_listed_in_preorder() {
        let (_guard, dir) = data_dir();
        let folder = workspace_create_folder(dir.clone(), "/".to_string(), "Music".to_string());
        assert!(folder.ok, "{}", folder.message);
        assert_eq!(folder.entry_id.as_deref(), Some("/Music"));

        let activity = workspace_create_activity(
            dir.clone(),
            "/Music".to_string(),
            "Piano".to_string(),
            "duration".to_string(),
            String::new(),
            "audio".to_string(),
        );
        assert!(activity.ok, "{}", activity.message);

        let listing = workspace_list(dir);
        assert!(listing.ok, "{}", listing.message);
        let rows = listing
            .items
            .iter()
            .map(|item| format!("{}:{}:{}", item.depth, item.kind, item.name))
            .collect::<Vec<_>>();
        assert_eq!(rows, vec!["0:folder:", "1:folder:Music", "2:activity:Piano"]);
        assert_eq!(listing.items[2].activity_id, activity.entry_id);
    }

    #[test]
    fn move_and_delete_report_store_errors() {
        let (_guard, dir) = data_dir();
        workspace_create_folder(dir.clone(), "/".to_string(), "A".to_string());
        workspace_create_folder(dir.clone(), "/A".to_string(), "B".to_string());

        let cycle = workspace_move_folder(dir.clone(), "/A".to_string(), "/A/B".to_string());
        assert!(!cycle.ok);
        assert!(cycle.message.contains("own ancestor"));

        let root = workspace_delete_folder(dir.clone(), "/".to_string());
        assert!(!root.ok);

        let deleted = workspace_delete_folder(dir.clone(), "/A".to_string());
        assert!(deleted.ok, "{}", deleted.message);
        let listing = workspace_list(dir);
        assert!(listing.items.iter().any(|item| item.path == "/B"));
    }

    #[test]
    fn chart_series_aggregates_recorded_values() {
        let (_guard, dir) = data_dir();
        let created = workspace_create_activity(
            dir.clone(),
            "/".to_string(),
            "Push-ups".to_string(),
            "integer_count".to_string(),
            String::new(),
            String::new(),
        );
        let id = created.entry_id.expect("activity id");
        for (day, value) in [("2024-01-01", 5.0), ("2024-01-03", 3.0)] {
            let recorded =
                workspace_record_measurement(dir.clone(), id.clone(), day.to_string(), value);
            assert!(recorded.ok, "{}", recorded.message);
        }

        let chart = chart_series(
            dir,
            Some(id),
            None,
            "2024-01-01".to_string(),
            "2024-01-03".to_string(),
            "day".to_string(),
            true,
        );
        assert!(chart.ok, "{}", chart.message);
        assert_eq!(chart.labels, vec!["01.01", "03.01"]);
        assert_eq!(chart.series[0].values, vec![5.0, 3.0]);
        assert_eq!(chart.summary, "8");
    }

    #[test]
    fn chart_series_rejects_reversed_range() {
        let (_guard, dir) = data_dir();
        let chart = chart_series(
            dir,
            None,
            Some("/".to_string()),
            "2024-01-03".to_string(),
            "2024-01-01".to_string(),
            "day".to_string(),
            false,
        );
        assert!(!chart.ok);
        assert!(chart.message.contains("before"));
    }
}
