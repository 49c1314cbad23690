//! Flat path codec for the activity tree.
//!
//! # Responsibility
//! - Flatten a `WorkspaceStore` into an ordered list of path strings.
//! - Rebuild a store from that list plus the loaded activity records.
//!
//! # Invariants
//! - Folder entries are absolute paths (`/a/b`); activity entries append the
//!   activity uuid to the owning folder path (`/a/b/<uuid>`, `/<uuid>`).
//! - `decode(encode(store), activities)` reproduces the same tree.
//! - Decoding never panics; malformed input is `CorruptState`.

use crate::model::activity::{Activity, ActivityId};
use crate::model::folder::FolderId;
use crate::model::path::FolderPath;
use crate::service::workspace_store::{TreeEntry, WorkspaceStore};
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while rebuilding a tree from flat paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    CorruptState(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptState(message) => write!(f, "corrupt tree index: {message}"),
        }
    }
}

impl Error for CodecError {}

/// Flattens `store` in pre-order (folder, its activities, its subfolders).
///
/// The root folder itself is implicit and never emitted.
pub fn encode(store: &WorkspaceStore) -> Vec<String> {
    let mut paths: BTreeMap<FolderId, FolderPath> = BTreeMap::new();
    let mut lines = Vec::new();
    store.traverse(|entry| match entry {
        TreeEntry::Folder { id, folder, .. } => {
            let path = match folder.parent() {
                None => FolderPath::root(),
                Some(parent) => paths
                    .get(&parent)
                    .cloned()
                    .unwrap_or_default()
                    .join(folder.name()),
            };
            if !path.is_root() {
                lines.push(path.to_string());
            }
            paths.insert(id, path);
        }
        TreeEntry::Activity {
            folder, activity, ..
        } => {
            let path = paths.get(&folder).cloned().unwrap_or_default();
            lines.push(path.join(activity.id().to_string()).to_string());
        }
    });
    lines
}

/// Rebuilds a store from flat `paths` and the loaded activity records.
///
/// Records that no path references are recovered into the root folder and
/// leave the returned store structurally dirty so the index gets rewritten.
pub fn decode<I, S>(paths: I, activities: Vec<Activity>) -> CodecResult<WorkspaceStore>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pending: BTreeMap<ActivityId, Activity> = BTreeMap::new();
    for activity in activities {
        let id = activity.id();
        if pending.insert(id, activity).is_some() {
            return Err(corrupt(format!("activity {id} loaded twice")));
        }
    }
    let mut placed: BTreeSet<ActivityId> = BTreeSet::new();
    let mut store = WorkspaceStore::new();

    for raw in paths {
        let raw = raw.as_ref();
        let path = FolderPath::parse(raw)
            .ok_or_else(|| corrupt(format!("malformed entry `{raw}`")))?;
        let activity_id = path.name().and_then(|name| Uuid::parse_str(name).ok());
        let target = match activity_id {
            Some(_) => path.parent().unwrap_or_default(),
            None => path,
        };

        while !target.starts_with(&store.cursor_path()) {
            store.close();
        }
        for segment in &target.segments()[store.cursor_path().depth()..] {
            if store.open(segment).is_err() {
                store
                    .create_folder(segment)
                    .map_err(|err| corrupt(format!("entry `{raw}`: {err}")))?;
                store
                    .open(segment)
                    .map_err(|err| corrupt(format!("entry `{raw}`: {err}")))?;
            }
        }

        if let Some(id) = activity_id {
            let Some(activity) = pending.remove(&id) else {
                let reason = if placed.contains(&id) {
                    "referenced twice"
                } else {
                    "has no record"
                };
                return Err(corrupt(format!("activity {id} {reason}")));
            };
            let cursor = store.cursor();
            store
                .insert_activity(cursor, activity)
                .map_err(|err| corrupt(format!("entry `{raw}`: {err}")))?;
            placed.insert(id);
        }
    }

    store.close_all();
    store.mark_structure_saved();
    let root = store.root();
    let orphans = pending.len();
    for (id, activity) in pending {
        warn!("event=tree_decode module=codec status=recovered activity={id} reason=unreferenced");
        store
            .insert_activity(root, activity)
            .map_err(|err| corrupt(format!("recovering activity {id}: {err}")))?;
    }

    info!(
        "event=tree_decode module=codec status=ok folders={} activities={} recovered={orphans}",
        store.folder_count(),
        store.activity_count()
    );
    Ok(store)
}

fn corrupt(message: String) -> CodecError {
    CodecError::CorruptState(message)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, CodecError};
    use crate::model::activity::{Activity, AttachmentKind, MeasurementMethod};
    use crate::service::workspace_store::WorkspaceStore;

    fn activity(name: &str) -> Activity {
        Activity::new(name, MeasurementMethod::YesNo, "", AttachmentKind::None).unwrap()
    }

    #[test]
    fn encode_emits_folder_then_activities_then_subfolders() {
        let mut store = WorkspaceStore::new();
        let music = store.create_folder("Music").unwrap();
        store.create_folder_in(music, "Piano").unwrap();
        let scales = store
            .create_activity_in(music, "Scales", MeasurementMethod::Duration, "", AttachmentKind::None)
            .unwrap();

        assert_eq!(
            encode(&store),
            vec![
                "/Music".to_string(),
                format!("/Music/{scales}"),
                "/Music/Piano".to_string(),
            ]
        );
    }

    #[test]
    fn decode_rejects_relative_entries() {
        let err = decode(["Music"], Vec::new()).unwrap_err();
        assert!(matches!(err, CodecError::CorruptState(_)));
    }

    #[test]
    fn decode_rejects_missing_and_duplicate_records() {
        let run = activity("Run");
        let id = run.id();

        let missing = decode([format!("/{id}")], Vec::new()).unwrap_err();
        assert!(missing.to_string().contains("has no record"));

        let twice = decode([format!("/{id}"), format!("/A/{id}")], vec![run]).unwrap_err();
        assert!(twice.to_string().contains("referenced twice"));
    }

    #[test]
    fn decode_recovers_unreferenced_records_into_root() {
        let run = activity("Run");
        let id = run.id();
        let store = decode(["/Sport"], vec![run]).unwrap();
        assert_eq!(store.owner_of(id).unwrap(), store.root());
        assert!(store.is_structure_dirty());
    }

    #[test]
    fn decode_of_clean_index_is_not_dirty() {
        let run = activity("Run");
        let id = run.id();
        let store = decode(["/Sport".to_string(), format!("/Sport/{id}")], vec![run]).unwrap();
        assert!(!store.is_structure_dirty());
        assert_eq!(store.activity_path(id).unwrap().to_string(), "/Sport");
    }
}
