//! Hierarchical activity store.
//!
//! # Responsibility
//! - Own the folder arena, the global activity registry and the cursor.
//! - Provide create/rename/move/delete for folders and activities.
//! - Provide deterministic pre-order traversal for listing and persistence.
//!
//! # Invariants
//! - The tree is acyclic and has exactly one root.
//! - Folder names are unique among sibling folders.
//! - Activity names are unique among the activities of one folder.
//! - Every registered activity is owned by exactly one folder.
//! - A failing operation leaves the tree exactly as it was (validate first,
//!   mutate after).

use crate::model::activity::{
    Activity, ActivityId, ActivityValidationError, AttachmentKind, MeasurementMethod,
};
use crate::model::folder::{Folder, FolderId};
use crate::model::path::{normalize_name, EntryKind, FolderPath, NameError};
use log::{debug, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Operations that are never allowed on the root folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOperation {
    Rename,
    Delete,
    Move,
}

impl Display for RootOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rename => write!(f, "rename"),
            Self::Delete => write!(f, "delete"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Name is blank, contains `/`, or is a uuid-shaped folder name.
    InvalidName(NameError),
    /// Activity fields failed validation.
    InvalidActivity(ActivityValidationError),
    /// Create/rename/move would duplicate a sibling name.
    NameCollision {
        kind: EntryKind,
        name: String,
        parent: FolderPath,
    },
    /// Folder move would make a folder its own ancestor.
    CycleWouldForm {
        folder: FolderPath,
        destination: FolderPath,
    },
    /// Rename/delete/move attempted on the root folder.
    RootOperationForbidden(RootOperation),
    /// Folder handle does not exist in this store.
    FolderNotFound(FolderId),
    /// Activity id is not registered.
    ActivityNotFound(ActivityId),
    /// No folder at the given path.
    PathNotFound(FolderPath),
    /// Activity exists but is not a child of the given folder.
    ActivityNotInFolder {
        activity: ActivityId,
        folder: FolderPath,
    },
}

impl StoreError {
    /// Returns whether this error is one of the lookup failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FolderNotFound(_)
                | Self::ActivityNotFound(_)
                | Self::PathNotFound(_)
                | Self::ActivityNotInFolder { .. }
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::InvalidActivity(err) => write!(f, "{err}"),
            Self::NameCollision { kind, name, parent } => {
                write!(f, "{parent} already contains a {kind} named `{name}`")
            }
            Self::CycleWouldForm {
                folder,
                destination,
            } => write!(
                f,
                "moving {folder} into {destination} would make it its own ancestor"
            ),
            Self::RootOperationForbidden(op) => write!(f, "the root folder cannot {op}"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::PathNotFound(path) => write!(f, "no folder at {path}"),
            Self::ActivityNotInFolder { activity, folder } => {
                write!(f, "activity {activity} is not in {folder}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::InvalidActivity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NameError> for StoreError {
    fn from(value: NameError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<ActivityValidationError> for StoreError {
    fn from(value: ActivityValidationError) -> Self {
        Self::InvalidActivity(value)
    }
}

/// One step of [`WorkspaceStore::traverse`].
#[derive(Debug, Clone, Copy)]
pub enum TreeEntry<'a> {
    Folder {
        id: FolderId,
        folder: &'a Folder,
        depth: usize,
    },
    Activity {
        folder: FolderId,
        activity: &'a Activity,
        depth: usize,
    },
}

impl TreeEntry<'_> {
    pub fn depth(&self) -> usize {
        match self {
            Self::Folder { depth, .. } | Self::Activity { depth, .. } => *depth,
        }
    }
}

/// In-memory activity tree with a current-location cursor.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    folders: BTreeMap<FolderId, Folder>,
    activities: BTreeMap<ActivityId, Activity>,
    owners: BTreeMap<ActivityId, FolderId>,
    root: FolderId,
    cursor: FolderId,
    next_folder_id: u64,
    structure_dirty: bool,
    released: Vec<ActivityId>,
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceStore {
    /// Creates an empty store with only the root folder.
    pub fn new() -> Self {
        let root = FolderId::new(0);
        let mut folders = BTreeMap::new();
        folders.insert(root, Folder::new(String::new(), None));
        Self {
            folders,
            activities: BTreeMap::new(),
            owners: BTreeMap::new(),
            root,
            cursor: root,
            next_folder_id: 1,
            structure_dirty: false,
            released: Vec::new(),
        }
    }

    pub fn root(&self) -> FolderId {
        self.root
    }

    pub fn cursor(&self) -> FolderId {
        self.cursor
    }

    pub fn cursor_path(&self) -> FolderPath {
        self.path_of(self.cursor)
    }

    pub fn folder(&self, id: FolderId) -> StoreResult<&Folder> {
        self.folders.get(&id).ok_or(StoreError::FolderNotFound(id))
    }

    pub fn activity(&self, id: ActivityId) -> StoreResult<&Activity> {
        self.activities
            .get(&id)
            .ok_or(StoreError::ActivityNotFound(id))
    }

    /// Mutable access for measurement, comment and unit edits.
    ///
    /// Names can only change through [`WorkspaceStore::rename_activity`].
    pub fn activity_mut(&mut self, id: ActivityId) -> StoreResult<&mut Activity> {
        self.activities
            .get_mut(&id)
            .ok_or(StoreError::ActivityNotFound(id))
    }

    /// All registered activities ordered by id.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    pub(crate) fn activities_mut(&mut self) -> impl Iterator<Item = &mut Activity> {
        self.activities.values_mut()
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Activities directly inside `folder`, ordered by name.
    pub fn activities_in(&self, folder: FolderId) -> StoreResult<Vec<&Activity>> {
        self.folder(folder)?
            .activities()
            .values()
            .map(|id| self.activity(*id))
            .collect()
    }

    pub fn find_activity_by_name(&self, folder: FolderId, name: &str) -> StoreResult<&Activity> {
        let id = self
            .folder(folder)?
            .child_activity(name.trim())
            .ok_or_else(|| StoreError::PathNotFound(self.path_of(folder).join(name.trim())))?;
        self.activity(id)
    }

    /// Folder currently owning `activity`.
    pub fn owner_of(&self, activity: ActivityId) -> StoreResult<FolderId> {
        self.owners
            .get(&activity)
            .copied()
            .ok_or(StoreError::ActivityNotFound(activity))
    }

    /// Path of the folder owning `activity`, used to locate it from outside.
    pub fn activity_path(&self, activity: ActivityId) -> StoreResult<FolderPath> {
        let owner = self.owner_of(activity)?;
        self.folder_path(owner)
    }

    pub fn folder_path(&self, id: FolderId) -> StoreResult<FolderPath> {
        self.folder(id)?;
        Ok(self.path_of(id))
    }

    /// Resolves a path to a folder handle.
    pub fn folder_at(&self, path: &FolderPath) -> StoreResult<FolderId> {
        let mut current = self.root;
        for segment in path.segments() {
            current = self
                .folder(current)?
                .child_folder(segment)
                .ok_or_else(|| StoreError::PathNotFound(path.clone()))?;
        }
        Ok(current)
    }

    /// Creates an empty folder under the cursor.
    pub fn create_folder(&mut self, name: &str) -> StoreResult<FolderId> {
        self.create_folder_in(self.cursor, name)
    }

    /// Creates an empty folder under `parent`.
    pub fn create_folder_in(&mut self, parent: FolderId, name: &str) -> StoreResult<FolderId> {
        let name = normalize_name(name, EntryKind::Folder)?;
        if self.folder(parent)?.child_folder(&name).is_some() {
            return Err(self.collision(EntryKind::Folder, name, parent));
        }

        let id = FolderId::new(self.next_folder_id);
        self.next_folder_id += 1;
        self.folders
            .insert(id, Folder::new(name.clone(), Some(parent)));
        self.folder_entry(parent).insert_folder(name, id);
        self.structure_dirty = true;
        debug!("event=folder_create module=store status=ok folder={id} parent={parent}");
        Ok(id)
    }

    pub fn rename_folder(&mut self, folder: FolderId, new_name: &str) -> StoreResult<()> {
        let new_name = normalize_name(new_name, EntryKind::Folder)?;
        let current = self.folder(folder)?;
        let parent = current
            .parent()
            .ok_or(StoreError::RootOperationForbidden(RootOperation::Rename))?;
        if current.name() == new_name {
            return Ok(());
        }
        let old_name = current.name().to_string();
        if let Some(existing) = self.folder(parent)?.child_folder(&new_name) {
            if existing != folder {
                return Err(self.collision(EntryKind::Folder, new_name, parent));
            }
        }

        let parent_entry = self.folder_entry(parent);
        parent_entry.remove_folder(&old_name);
        parent_entry.insert_folder(new_name.clone(), folder);
        self.folder_entry(folder).set_name(new_name);
        self.structure_dirty = true;
        debug!("event=folder_rename module=store status=ok folder={folder}");
        Ok(())
    }

    /// Deletes `folder` by merging its children into its parent.
    ///
    /// All-or-nothing: any name collision in the parent aborts before the
    /// first child moves.
    pub fn delete_folder(&mut self, folder: FolderId) -> StoreResult<()> {
        let target = self.folder(folder)?;
        let parent = target
            .parent()
            .ok_or(StoreError::RootOperationForbidden(RootOperation::Delete))?;
        let parent_folder = self.folder(parent)?;

        for name in target.folders().keys() {
            match parent_folder.child_folder(name) {
                Some(existing) if existing != folder => {
                    return Err(self.collision(EntryKind::Folder, name.clone(), parent));
                }
                _ => {}
            }
        }
        for name in target.activities().keys() {
            if parent_folder.child_activity(name).is_some() {
                return Err(self.collision(EntryKind::Activity, name.clone(), parent));
            }
        }

        let Some(removed) = self.folders.remove(&folder) else {
            return Err(StoreError::FolderNotFound(folder));
        };
        let parent_entry = self.folder_entry(parent);
        parent_entry.remove_folder(removed.name());
        for (name, child) in removed.folders() {
            parent_entry.insert_folder(name.clone(), *child);
        }
        for (name, activity) in removed.activities() {
            parent_entry.insert_activity(name.clone(), *activity);
        }
        for child in removed.folders().values() {
            self.folder_entry(*child).set_parent(parent);
        }
        for activity in removed.activities().values() {
            self.owners.insert(*activity, parent);
        }
        if self.cursor == folder {
            self.cursor = parent;
        }
        self.structure_dirty = true;
        info!(
            "event=folder_delete module=store status=ok folder={folder} merged_folders={} merged_activities={}",
            removed.folders().len(),
            removed.activities().len()
        );
        Ok(())
    }

    /// Moves `folder` (with its whole subtree) under `destination`.
    pub fn move_folder(&mut self, folder: FolderId, destination: FolderId) -> StoreResult<()> {
        let moving = self.folder(folder)?;
        let parent = moving
            .parent()
            .ok_or(StoreError::RootOperationForbidden(RootOperation::Move))?;
        self.folder(destination)?;

        let folder_path = self.path_of(folder);
        let destination_path = self.path_of(destination);
        if destination == folder || destination_path.is_proper_descendant_of(&folder_path) {
            return Err(StoreError::CycleWouldForm {
                folder: folder_path,
                destination: destination_path,
            });
        }
        if destination == parent {
            return Ok(());
        }
        let name = moving.name().to_string();
        if self.folder(destination)?.child_folder(&name).is_some() {
            return Err(self.collision(EntryKind::Folder, name, destination));
        }

        self.folder_entry(parent).remove_folder(&name);
        self.folder_entry(destination).insert_folder(name, folder);
        self.folder_entry(folder).set_parent(destination);
        self.structure_dirty = true;
        debug!(
            "event=folder_move module=store status=ok folder={folder} destination={destination}"
        );
        Ok(())
    }

    /// Creates an activity inside the cursor folder.
    pub fn create_activity(
        &mut self,
        name: &str,
        measurement_method: MeasurementMethod,
        unit: &str,
        attachment_kind: AttachmentKind,
    ) -> StoreResult<ActivityId> {
        self.create_activity_in(self.cursor, name, measurement_method, unit, attachment_kind)
    }

    /// Creates an activity inside `folder`.
    pub fn create_activity_in(
        &mut self,
        folder: FolderId,
        name: &str,
        measurement_method: MeasurementMethod,
        unit: &str,
        attachment_kind: AttachmentKind,
    ) -> StoreResult<ActivityId> {
        let name = normalize_name(name, EntryKind::Activity)?;
        if self.folder(folder)?.child_activity(&name).is_some() {
            return Err(self.collision(EntryKind::Activity, name, folder));
        }
        let activity = Activity::new(name, measurement_method, unit, attachment_kind)?;
        let id = activity.id();
        self.attach_activity(folder, activity);
        debug!("event=activity_create module=store status=ok activity={id} folder={folder}");
        Ok(id)
    }

    /// Places an already constructed activity (e.g. loaded from disk) into
    /// `folder` under its current name.
    pub(crate) fn insert_activity(
        &mut self,
        folder: FolderId,
        activity: Activity,
    ) -> StoreResult<ActivityId> {
        let name = activity.name().to_string();
        if self.folder(folder)?.child_activity(&name).is_some() {
            return Err(self.collision(EntryKind::Activity, name, folder));
        }
        let id = activity.id();
        if self.activities.contains_key(&id) {
            let owner = self.owner_of(id)?;
            return Err(self.collision(EntryKind::Activity, name, owner));
        }
        self.attach_activity(folder, activity);
        Ok(id)
    }

    pub fn rename_activity(&mut self, activity: ActivityId, new_name: &str) -> StoreResult<()> {
        let new_name = normalize_name(new_name, EntryKind::Activity)?;
        let owner = self.owner_of(activity)?;
        let old_name = self.activity(activity)?.name().to_string();
        if old_name == new_name {
            return Ok(());
        }
        if self.folder(owner)?.child_activity(&new_name).is_some() {
            return Err(self.collision(EntryKind::Activity, new_name, owner));
        }

        let owner_entry = self.folder_entry(owner);
        owner_entry.remove_activity(&old_name);
        owner_entry.insert_activity(new_name.clone(), activity);
        if let Some(entry) = self.activities.get_mut(&activity) {
            entry.set_name(new_name);
        }
        self.structure_dirty = true;
        debug!("event=activity_rename module=store status=ok activity={activity}");
        Ok(())
    }

    /// Removes an activity from its folder and the registry.
    ///
    /// The id is queued for record/attachment cleanup, see
    /// [`WorkspaceStore::take_released_activities`].
    pub fn delete_activity(&mut self, activity: ActivityId) -> StoreResult<Activity> {
        let owner = self.owner_of(activity)?;
        let Some(removed) = self.activities.remove(&activity) else {
            return Err(StoreError::ActivityNotFound(activity));
        };
        self.owners.remove(&activity);
        self.folder_entry(owner).remove_activity(removed.name());
        self.released.push(activity);
        self.structure_dirty = true;
        info!("event=activity_delete module=store status=ok activity={activity}");
        Ok(removed)
    }

    pub fn move_activity(
        &mut self,
        activity: ActivityId,
        from: FolderId,
        to: FolderId,
    ) -> StoreResult<()> {
        let name = self.activity(activity)?.name().to_string();
        if self.folder(from)?.child_activity(&name) != Some(activity) {
            return Err(StoreError::ActivityNotInFolder {
                activity,
                folder: self.path_of(from),
            });
        }
        self.folder(to)?;
        if from == to {
            return Ok(());
        }
        if self.folder(to)?.child_activity(&name).is_some() {
            return Err(self.collision(EntryKind::Activity, name, to));
        }

        self.folder_entry(from).remove_activity(&name);
        self.folder_entry(to).insert_activity(name, activity);
        self.owners.insert(activity, to);
        self.structure_dirty = true;
        debug!("event=activity_move module=store status=ok activity={activity} destination={to}");
        Ok(())
    }

    /// Moves the cursor into the child folder `name`.
    pub fn open(&mut self, name: &str) -> StoreResult<FolderId> {
        let name = name.trim();
        let child = self
            .folder(self.cursor)?
            .child_folder(name)
            .ok_or_else(|| StoreError::PathNotFound(self.cursor_path().join(name)))?;
        self.cursor = child;
        Ok(child)
    }

    /// Moves the cursor to the folder at `path`.
    pub fn open_path(&mut self, path: &FolderPath) -> StoreResult<FolderId> {
        let target = self.folder_at(path)?;
        self.cursor = target;
        Ok(target)
    }

    /// Moves the cursor to `folder`.
    pub fn open_folder(&mut self, folder: FolderId) -> StoreResult<()> {
        self.folder(folder)?;
        self.cursor = folder;
        Ok(())
    }

    /// Moves the cursor to its parent; no-op at the root.
    pub fn close(&mut self) {
        if let Some(parent) = self.folders.get(&self.cursor).and_then(Folder::parent) {
            self.cursor = parent;
        }
    }

    pub fn close_all(&mut self) {
        self.cursor = self.root;
    }

    /// Pre-order walk: each folder, then its activities, then its subfolders.
    ///
    /// Root is visited at depth 0; activities sit one level below their folder.
    pub fn traverse<'a>(&'a self, mut visit: impl FnMut(TreeEntry<'a>)) {
        self.walk(self.root, 0, &mut visit);
    }

    /// Collects [`WorkspaceStore::traverse`] into a vector.
    pub fn entries(&self) -> Vec<TreeEntry<'_>> {
        let mut entries = Vec::with_capacity(self.folders.len() + self.activities.len());
        self.traverse(|entry| entries.push(entry));
        entries
    }

    pub fn is_structure_dirty(&self) -> bool {
        self.structure_dirty
    }

    pub(crate) fn mark_structure_saved(&mut self) {
        self.structure_dirty = false;
    }

    /// Drains ids of deleted activities whose stored data must be removed.
    pub fn take_released_activities(&mut self) -> Vec<ActivityId> {
        std::mem::take(&mut self.released)
    }

    /// Puts ids back on the release queue after a failed cleanup.
    pub(crate) fn requeue_released(&mut self, ids: impl IntoIterator<Item = ActivityId>) {
        self.released.extend(ids);
    }

    fn walk<'a>(&'a self, id: FolderId, depth: usize, visit: &mut impl FnMut(TreeEntry<'a>)) {
        let Some(folder) = self.folders.get(&id) else {
            return;
        };
        visit(TreeEntry::Folder { id, folder, depth });
        for activity_id in folder.activities().values() {
            if let Some(activity) = self.activities.get(activity_id) {
                visit(TreeEntry::Activity {
                    folder: id,
                    activity,
                    depth: depth + 1,
                });
            }
        }
        for child in folder.folders().values() {
            self.walk(*child, depth + 1, visit);
        }
    }

    fn attach_activity(&mut self, folder: FolderId, activity: Activity) {
        let id = activity.id();
        self.folder_entry(folder)
            .insert_activity(activity.name().to_string(), id);
        self.owners.insert(id, folder);
        self.activities.insert(id, activity);
        self.structure_dirty = true;
    }

    /// Path by walking parent handles; unknown handles yield the root path.
    fn path_of(&self, id: FolderId) -> FolderPath {
        let mut names = Vec::new();
        let mut current = self.folders.get(&id);
        while let Some(folder) = current {
            let Some(parent) = folder.parent() else {
                break;
            };
            names.push(folder.name().to_string());
            if names.len() > self.folders.len() {
                break;
            }
            current = self.folders.get(&parent);
        }
        names.reverse();
        FolderPath::from_segments(names)
    }

    /// Mutable folder access for handles already validated by the caller.
    fn folder_entry(&mut self, id: FolderId) -> &mut Folder {
        self.folders
            .entry(id)
            .or_insert_with(|| Folder::new(String::new(), None))
    }

    fn collision(&self, kind: EntryKind, name: String, parent: FolderId) -> StoreError {
        StoreError::NameCollision {
            kind,
            name,
            parent: self.path_of(parent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RootOperation, StoreError, TreeEntry, WorkspaceStore};
    use crate::model::activity::{AttachmentKind, MeasurementMethod};
    use crate::model::path::FolderPath;

    fn add_activity(store: &mut WorkspaceStore, name: &str) -> uuid::Uuid {
        store
            .create_activity(name, MeasurementMethod::Duration, "", AttachmentKind::None)
            .expect("activity create should succeed")
    }

    #[test]
    fn new_store_has_root_cursor() {
        let store = WorkspaceStore::new();
        assert_eq!(store.cursor(), store.root());
        assert!(store.cursor_path().is_root());
        assert!(!store.is_structure_dirty());
    }

    #[test]
    fn root_operations_are_forbidden() {
        let mut store = WorkspaceStore::new();
        let root = store.root();
        let child = store.create_folder("Music").unwrap();

        assert_eq!(
            store.rename_folder(root, "Top").unwrap_err(),
            StoreError::RootOperationForbidden(RootOperation::Rename)
        );
        assert_eq!(
            store.delete_folder(root).unwrap_err(),
            StoreError::RootOperationForbidden(RootOperation::Delete)
        );
        assert_eq!(
            store.move_folder(root, child).unwrap_err(),
            StoreError::RootOperationForbidden(RootOperation::Move)
        );
    }

    #[test]
    fn rename_to_same_name_is_noop() {
        let mut store = WorkspaceStore::new();
        let music = store.create_folder("Music").unwrap();
        store.rename_folder(music, " Music ").unwrap();
        assert_eq!(store.folder(music).unwrap().name(), "Music");
    }

    #[test]
    fn delete_moves_cursor_to_parent() {
        let mut store = WorkspaceStore::new();
        let music = store.create_folder("Music").unwrap();
        store.open("Music").unwrap();
        assert_eq!(store.cursor(), music);

        store.delete_folder(music).unwrap();
        assert_eq!(store.cursor(), store.root());
        assert!(store.folder(music).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_allows_child_named_like_deleted_folder() {
        let mut store = WorkspaceStore::new();
        let outer = store.create_folder("Sport").unwrap();
        let inner = store.create_folder_in(outer, "Sport").unwrap();

        store.delete_folder(outer).unwrap();
        let root_children = store.folder(store.root()).unwrap().folders().clone();
        assert_eq!(root_children.get("Sport"), Some(&inner));
        assert_eq!(store.folder(inner).unwrap().parent(), Some(store.root()));
    }

    #[test]
    fn traverse_is_preorder_with_activities_before_subfolders() {
        let mut store = WorkspaceStore::new();
        add_activity(&mut store, "Zen");
        store.create_folder("B").unwrap();
        store.create_folder("A").unwrap();
        store.open("A").unwrap();
        add_activity(&mut store, "Piano");
        store.create_folder("Inner").unwrap();
        store.close_all();

        let listing = store
            .entries()
            .into_iter()
            .map(|entry| match entry {
                TreeEntry::Folder { folder, depth, .. } => format!("{depth}:F:{}", folder.name()),
                TreeEntry::Activity {
                    activity, depth, ..
                } => format!("{depth}:A:{}", activity.name()),
            })
            .collect::<Vec<_>>();

        assert_eq!(
            listing,
            vec![
                "0:F:", "1:A:Zen", "1:F:A", "2:A:Piano", "2:F:Inner", "1:F:B"
            ]
        );
    }

    #[test]
    fn close_at_root_is_noop_and_open_unknown_fails() {
        let mut store = WorkspaceStore::new();
        store.close();
        assert_eq!(store.cursor(), store.root());
        let err = store.open("Missing").unwrap_err();
        assert_eq!(
            err,
            StoreError::PathNotFound(FolderPath::from_segments(["Missing"]))
        );
    }

    #[test]
    fn delete_activity_queues_release() {
        let mut store = WorkspaceStore::new();
        let id = add_activity(&mut store, "Piano");
        let removed = store.delete_activity(id).unwrap();
        assert_eq!(removed.id(), id);
        assert_eq!(store.take_released_activities(), vec![id]);
        assert!(store.take_released_activities().is_empty());
        assert!(store.activity(id).is_err());
        assert!(store.folder(store.root()).unwrap().is_empty());
    }
}
