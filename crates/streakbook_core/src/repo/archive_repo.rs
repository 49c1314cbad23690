//! Directory-backed JSON archive for workspaces.
//!
//! # Responsibility
//! - Load activity records and the flat tree index into a `WorkspaceStore`.
//! - Write back only what changed: the index when the tree is dirty and the
//!   dirty parts of each activity record.
//! - Remove stored files of released activities.
//! - Derive attachment locations for the media collaborator.
//!
//! # Invariants
//! - Every file write goes through a temp file followed by rename.
//! - A record's `id` must equal the uuid in its file name.
//! - Missing measurement/comment parts read as empty maps.
//!
//! # See also
//! - `repo::tree_codec` for the index format.

use crate::model::activity::{Activity, ActivityId, ActivityMetadata, AttachmentKind, DirtyParts};
use crate::repo::tree_codec::{self, CodecError};
use crate::service::workspace_store::WorkspaceStore;
use chrono::NaiveDate;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

const STRUCTURE_FILE: &str = "structure.json";
const OPTIONS_FILE: &str = "options.json";
const ACTIVITIES_DIR: &str = "activities";
const META_SUFFIX: &str = ".meta.json";
const MEASUREMENTS_SUFFIX: &str = ".measurements.json";
const COMMENTS_SUFFIX: &str = ".comments.json";
const MEDIA_DIR_SUFFIX: &str = "_data";
const TEMP_SUFFIX: &str = ".tmp";

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors from archive reads and writes.
#[derive(Debug)]
pub enum ArchiveError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    CorruptState(String),
    Codec(CodecError),
}

impl ArchiveError {
    /// Returns whether stored data (rather than the file system) is at fault.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::Json { .. } | Self::CorruptState(_) | Self::Codec(_)
        )
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid json in `{}`: {source}", path.display())
            }
            Self::CorruptState(message) => write!(f, "corrupt archive: {message}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::CorruptState(_) => None,
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<CodecError> for ArchiveError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// What one `save_workspace` call wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub index_written: bool,
    pub metadata_written: usize,
    pub measurements_written: usize,
    pub comments_written: usize,
    pub released_removed: usize,
}

impl SaveReport {
    /// Returns whether the save touched nothing on disk.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Attachment locations under the activities directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLayout {
    activities_dir: PathBuf,
}

impl MediaLayout {
    pub fn new(activities_dir: impl Into<PathBuf>) -> Self {
        Self {
            activities_dir: activities_dir.into(),
        }
    }

    /// Directory holding every attachment of `activity`.
    pub fn media_dir(&self, activity: ActivityId) -> PathBuf {
        self.activities_dir
            .join(format!("{activity}{MEDIA_DIR_SUFFIX}"))
    }

    /// Attachment file for one day; `None` when the kind stores no media.
    pub fn media_file(
        &self,
        activity: ActivityId,
        day: NaiveDate,
        kind: AttachmentKind,
    ) -> Option<PathBuf> {
        let extension = kind.file_extension()?;
        Some(
            self.media_dir(activity)
                .join(format!("{}.{extension}", day.format("%Y-%m-%d"))),
        )
    }
}

/// Workspace archive rooted at one directory.
#[derive(Debug, Clone)]
pub struct ArchiveRepository {
    root: PathBuf,
    media: MediaLayout,
}

impl ArchiveRepository {
    /// Opens (and creates when missing) an archive directory.
    pub fn open(root: impl AsRef<Path>) -> ArchiveResult<Self> {
        let root = root.as_ref().to_path_buf();
        let activities_dir = root.join(ACTIVITIES_DIR);
        std::fs::create_dir_all(&activities_dir)
            .map_err(|err| ArchiveError::io(&activities_dir, err))?;
        Ok(Self {
            root,
            media: MediaLayout::new(activities_dir),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn media(&self) -> &MediaLayout {
        &self.media
    }

    pub fn options_path(&self) -> PathBuf {
        self.root.join(OPTIONS_FILE)
    }

    /// Creates the attachment directory of `activity` and returns it.
    pub fn prepare_media_dir(&self, activity: ActivityId) -> ArchiveResult<PathBuf> {
        let dir = self.media.media_dir(activity);
        std::fs::create_dir_all(&dir).map_err(|err| ArchiveError::io(&dir, err))?;
        Ok(dir)
    }

    /// Loads every activity record and rebuilds the tree from the index.
    pub fn load_workspace(&self) -> ArchiveResult<WorkspaceStore> {
        let started_at = Instant::now();
        let result = self.load_records().and_then(|activities| {
            let paths: Vec<String> = self.read_json_or_default(&self.structure_path())?;
            Ok(tree_codec::decode(paths, activities)?)
        });
        match &result {
            Ok(store) => info!(
                "event=workspace_load module=archive status=ok duration_ms={} activities={}",
                started_at.elapsed().as_millis(),
                store.activity_count()
            ),
            Err(err) => error!(
                "event=workspace_load module=archive status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    /// Persists dirty state of `store` and clears the flags it wrote.
    pub fn save_workspace(&self, store: &mut WorkspaceStore) -> ArchiveResult<SaveReport> {
        let started_at = Instant::now();
        let mut report = SaveReport::default();

        for activity in store.activities_mut() {
            let dirty = activity.dirty_parts();
            if !dirty.any() {
                continue;
            }
            self.write_record(activity, dirty)?;
            activity.mark_saved(dirty);
            report.metadata_written += usize::from(dirty.metadata);
            report.measurements_written += usize::from(dirty.measurements);
            report.comments_written += usize::from(dirty.comments);
        }

        if store.is_structure_dirty() {
            self.write_json(&self.structure_path(), &tree_codec::encode(store))?;
            store.mark_structure_saved();
            report.index_written = true;
        }

        // Ids that fail stay queued so a later save retries them.
        let mut retained = Vec::new();
        let mut first_error = None;
        for released in store.take_released_activities() {
            match self.remove_record(released) {
                Ok(()) => report.released_removed += 1,
                Err(err) => {
                    warn!(
                        "event=record_remove module=archive status=error activity={released} error={err}"
                    );
                    retained.push(released);
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            store.requeue_released(retained);
            return Err(err);
        }

        info!(
            "event=workspace_save module=archive status=ok duration_ms={} index={} metadata={} measurements={} comments={} released={}",
            started_at.elapsed().as_millis(),
            report.index_written,
            report.metadata_written,
            report.measurements_written,
            report.comments_written,
            report.released_removed
        );
        Ok(report)
    }

    /// Reads a JSON document, falling back to `T::default()` when absent.
    pub fn read_json_or_default<T>(&self, path: &Path) -> ArchiveResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => return Err(ArchiveError::io(path, err)),
        };
        serde_json::from_slice(&bytes).map_err(|err| ArchiveError::json(path, err))
    }

    /// Writes `value` as pretty JSON through a temp file and rename.
    pub fn write_json<T>(&self, path: &Path, value: &T) -> ArchiveResult<()>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value).map_err(|err| ArchiveError::json(path, err))?;
        let mut temp_name = path.as_os_str().to_os_string();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);
        std::fs::write(&temp_path, bytes).map_err(|err| ArchiveError::io(&temp_path, err))?;
        std::fs::rename(&temp_path, path).map_err(|err| ArchiveError::io(path, err))
    }

    fn structure_path(&self) -> PathBuf {
        self.root.join(STRUCTURE_FILE)
    }

    fn activities_dir(&self) -> PathBuf {
        self.root.join(ACTIVITIES_DIR)
    }

    fn record_path(&self, activity: ActivityId, suffix: &str) -> PathBuf {
        self.activities_dir().join(format!("{activity}{suffix}"))
    }

    fn load_records(&self) -> ArchiveResult<Vec<Activity>> {
        let dir = self.activities_dir();
        let entries = std::fs::read_dir(&dir).map_err(|err| ArchiveError::io(&dir, err))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| ArchiveError::io(&dir, err))?;
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(META_SUFFIX))
            else {
                continue;
            };
            match Uuid::parse_str(stem) {
                Ok(id) => ids.push(id),
                Err(_) => warn!(
                    "event=workspace_load module=archive status=skipped reason=foreign_file"
                ),
            }
        }
        ids.sort();

        ids.into_iter().map(|id| self.read_record(id)).collect()
    }

    fn read_record(&self, id: ActivityId) -> ArchiveResult<Activity> {
        let meta_path = self.record_path(id, META_SUFFIX);
        let bytes = std::fs::read(&meta_path).map_err(|err| ArchiveError::io(&meta_path, err))?;
        let metadata: ActivityMetadata =
            serde_json::from_slice(&bytes).map_err(|err| ArchiveError::json(&meta_path, err))?;
        if metadata.id != id {
            return Err(ArchiveError::CorruptState(format!(
                "record `{}` carries id {}",
                meta_path.display(),
                metadata.id
            )));
        }
        let measurements: BTreeMap<NaiveDate, f64> =
            self.read_json_or_default(&self.record_path(id, MEASUREMENTS_SUFFIX))?;
        let comments: BTreeMap<NaiveDate, String> =
            self.read_json_or_default(&self.record_path(id, COMMENTS_SUFFIX))?;
        Ok(Activity::from_parts(metadata, measurements, comments))
    }

    fn write_record(&self, activity: &Activity, parts: DirtyParts) -> ArchiveResult<()> {
        let id = activity.id();
        if parts.metadata {
            self.write_json(&self.record_path(id, META_SUFFIX), &activity.metadata())?;
        }
        if parts.measurements {
            self.write_json(
                &self.record_path(id, MEASUREMENTS_SUFFIX),
                activity.measurements(),
            )?;
        }
        if parts.comments {
            self.write_json(&self.record_path(id, COMMENTS_SUFFIX), activity.comments())?;
        }
        Ok(())
    }

    fn remove_record(&self, id: ActivityId) -> ArchiveResult<()> {
        for suffix in [META_SUFFIX, MEASUREMENTS_SUFFIX, COMMENTS_SUFFIX] {
            let path = self.record_path(id, suffix);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(ArchiveError::io(&path, err)),
            }
        }
        let media_dir = self.media.media_dir(id);
        match std::fs::remove_dir_all(&media_dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ArchiveError::io(&media_dir, err)),
        }
    }
}
