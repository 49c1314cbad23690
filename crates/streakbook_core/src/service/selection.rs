//! Tree selection for multi-step UI flows.
//!
//! # Responsibility
//! - Track which folders and activities are selected for one flow.
//! - Propagate folder selection to the whole subtree in create-folder mode.
//! - Regroup selected items into a new folder in one atomic step.
//!
//! # Invariants
//! - `Subitem` entries are never toggled directly.
//! - Single-target modes hold at most one selected entry.
//! - `create_folder_from_selection` validates everything before the first
//!   mutation.

use crate::model::activity::ActivityId;
use crate::model::folder::FolderId;
use crate::model::path::{normalize_name, EntryKind, FolderPath};
use crate::service::workspace_store::{
    RootOperation, StoreError, StoreResult, TreeEntry, WorkspaceStore,
};
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// What the user is choosing entries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Any number of folders and activities to regroup into a new folder.
    CreateFolder,
    /// One activity to chart.
    SingleActivity,
    /// One folder whose activities are charted together.
    FolderChart,
    /// Destination folder for moving `activity`.
    MoveActivityDestination { activity: ActivityId },
}

impl SelectionMode {
    fn accepts(self, kind: EntryKind) -> bool {
        match self {
            Self::CreateFolder => true,
            Self::SingleActivity => kind == EntryKind::Activity,
            Self::FolderChart | Self::MoveActivityDestination { .. } => kind == EntryKind::Folder,
        }
    }

    fn is_single_target(self) -> bool {
        !matches!(self, Self::CreateFolder)
    }
}

/// Selection mark of one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected,
    /// Below a selected folder; travels with it.
    Subitem,
}

/// Per-flow selection keyed by folder path and activity id.
#[derive(Debug, Clone)]
pub struct SubtreeSelection {
    mode: SelectionMode,
    folders: BTreeMap<FolderPath, SelectionState>,
    activities: BTreeMap<ActivityId, SelectionState>,
}

impl SubtreeSelection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            folders: BTreeMap::new(),
            activities: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn folder_state(&self, path: &FolderPath) -> SelectionState {
        self.folders.get(path).copied().unwrap_or_default()
    }

    pub fn activity_state(&self, activity: ActivityId) -> SelectionState {
        self.activities.get(&activity).copied().unwrap_or_default()
    }

    /// Selected folder paths (subitems excluded), ordered by path.
    pub fn selected_folders(&self) -> Vec<FolderPath> {
        self.folders
            .iter()
            .filter(|(_, state)| **state == SelectionState::Selected)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Selected activity ids (subitems excluded).
    pub fn selected_activities(&self) -> Vec<ActivityId> {
        self.activities
            .iter()
            .filter(|(_, state)| **state == SelectionState::Selected)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_folders().is_empty() && self.selected_activities().is_empty()
    }

    pub fn clear(&mut self) {
        self.folders.clear();
        self.activities.clear();
    }

    /// Toggles `folder` and returns its new state.
    ///
    /// Modes that do not select folders leave the selection unchanged.
    pub fn toggle_folder(
        &mut self,
        store: &WorkspaceStore,
        folder: FolderId,
    ) -> StoreResult<SelectionState> {
        let path = store.folder_path(folder)?;
        let current = self.folder_state(&path);
        if !self.mode.accepts(EntryKind::Folder) || current == SelectionState::Subitem {
            return Ok(current);
        }

        if current == SelectionState::Selected {
            self.folders.remove(&path);
            if !self.mode.is_single_target() {
                self.mark_subtree(store, &path, SelectionState::Unselected);
            }
            return Ok(SelectionState::Unselected);
        }

        if self.mode.is_single_target() {
            self.clear();
        } else {
            self.mark_subtree(store, &path, SelectionState::Subitem);
        }
        self.folders.insert(path, SelectionState::Selected);
        Ok(SelectionState::Selected)
    }

    /// Toggles `activity` and returns its new state.
    pub fn toggle_activity(
        &mut self,
        store: &WorkspaceStore,
        activity: ActivityId,
    ) -> StoreResult<SelectionState> {
        store.activity(activity)?;
        let current = self.activity_state(activity);
        if !self.mode.accepts(EntryKind::Activity) || current == SelectionState::Subitem {
            return Ok(current);
        }

        if current == SelectionState::Selected {
            self.activities.remove(&activity);
            return Ok(SelectionState::Unselected);
        }
        if self.mode.is_single_target() {
            self.clear();
        }
        self.activities.insert(activity, SelectionState::Selected);
        Ok(SelectionState::Selected)
    }

    /// The single chosen folder in single-target folder modes.
    pub fn target_folder(&self, store: &WorkspaceStore) -> StoreResult<Option<FolderId>> {
        self.selected_folders()
            .first()
            .map(|path| store.folder_at(path))
            .transpose()
    }

    /// The single chosen activity in `SingleActivity` mode.
    pub fn target_activity(&self) -> Option<ActivityId> {
        self.selected_activities().first().copied()
    }

    fn mark_subtree(&mut self, store: &WorkspaceStore, root: &FolderPath, state: SelectionState) {
        let mut folder_paths: BTreeMap<FolderId, FolderPath> = BTreeMap::new();
        store.traverse(|entry| match entry {
            TreeEntry::Folder { id, .. } => {
                if let Ok(path) = store.folder_path(id) {
                    if path.is_proper_descendant_of(root) {
                        self.set_folder(path.clone(), state);
                    }
                    folder_paths.insert(id, path);
                }
            }
            TreeEntry::Activity {
                folder, activity, ..
            } => {
                let inside = folder_paths
                    .get(&folder)
                    .is_some_and(|path| path.starts_with(root));
                if inside {
                    self.set_activity(activity.id(), state);
                }
            }
        });
    }

    fn set_folder(&mut self, path: FolderPath, state: SelectionState) {
        if state == SelectionState::Unselected {
            self.folders.remove(&path);
        } else {
            self.folders.insert(path, state);
        }
    }

    fn set_activity(&mut self, activity: ActivityId, state: SelectionState) {
        if state == SelectionState::Unselected {
            self.activities.remove(&activity);
        } else {
            self.activities.insert(activity, state);
        }
    }
}

impl WorkspaceStore {
    /// Creates folder `name` under the cursor and moves every selected entry
    /// into it.
    ///
    /// Fails without touching the tree when a selected folder is the cursor
    /// or one of its ancestors, or when selected names would collide.
    pub fn create_folder_from_selection(
        &mut self,
        name: &str,
        selection: &SubtreeSelection,
    ) -> StoreResult<FolderId> {
        let name = normalize_name(name, EntryKind::Folder)?;
        let cursor = self.cursor();
        let cursor_path = self.cursor_path();
        if self.folder(cursor)?.child_folder(&name).is_some() {
            return Err(StoreError::NameCollision {
                kind: EntryKind::Folder,
                name,
                parent: cursor_path,
            });
        }
        let destination_path = cursor_path.join(name.clone());

        let mut folders = Vec::new();
        let mut folder_names = BTreeSet::new();
        for path in selection.selected_folders() {
            let id = self.folder_at(&path)?;
            if path.is_root() {
                return Err(StoreError::RootOperationForbidden(RootOperation::Move));
            }
            if path == cursor_path || cursor_path.is_proper_descendant_of(&path) {
                return Err(StoreError::CycleWouldForm {
                    folder: path,
                    destination: destination_path,
                });
            }
            let folder_name = self.folder(id)?.name().to_string();
            if !folder_names.insert(folder_name.clone()) {
                return Err(StoreError::NameCollision {
                    kind: EntryKind::Folder,
                    name: folder_name,
                    parent: destination_path,
                });
            }
            folders.push(id);
        }

        let mut activities = Vec::new();
        let mut activity_names = BTreeSet::new();
        for id in selection.selected_activities() {
            let owner = self.owner_of(id)?;
            let activity_name = self.activity(id)?.name().to_string();
            if !activity_names.insert(activity_name.clone()) {
                return Err(StoreError::NameCollision {
                    kind: EntryKind::Activity,
                    name: activity_name,
                    parent: destination_path,
                });
            }
            activities.push((id, owner));
        }

        let created = self.create_folder_in(cursor, &name)?;
        for folder in &folders {
            self.move_folder(*folder, created)?;
        }
        for (activity, owner) in &activities {
            self.move_activity(*activity, *owner, created)?;
        }
        info!(
            "event=folder_from_selection module=selection status=ok folder={created} folders={} activities={}",
            folders.len(),
            activities.len()
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectionMode, SelectionState, SubtreeSelection};
    use crate::model::activity::{AttachmentKind, MeasurementMethod};
    use crate::model::path::FolderPath;
    use crate::service::workspace_store::WorkspaceStore;

    #[test]
    fn selecting_folder_marks_subtree_as_subitems() {
        let mut store = WorkspaceStore::new();
        let music = store.create_folder("Music").unwrap();
        let piano = store.create_folder_in(music, "Piano").unwrap();
        let scales = store
            .create_activity_in(piano, "Scales", MeasurementMethod::Duration, "", AttachmentKind::None)
            .unwrap();

        let mut selection = SubtreeSelection::new(SelectionMode::CreateFolder);
        assert_eq!(
            selection.toggle_folder(&store, music).unwrap(),
            SelectionState::Selected
        );
        let piano_path = FolderPath::from_segments(["Music", "Piano"]);
        assert_eq!(selection.folder_state(&piano_path), SelectionState::Subitem);
        assert_eq!(selection.activity_state(scales), SelectionState::Subitem);

        assert_eq!(
            selection.toggle_folder(&store, piano).unwrap(),
            SelectionState::Subitem
        );

        selection.toggle_folder(&store, music).unwrap();
        assert_eq!(selection.folder_state(&piano_path), SelectionState::Unselected);
        assert_eq!(selection.activity_state(scales), SelectionState::Unselected);
        assert!(selection.is_empty());
    }

    #[test]
    fn single_target_modes_replace_previous_choice() {
        let mut store = WorkspaceStore::new();
        let a = store.create_folder("A").unwrap();
        let b = store.create_folder("B").unwrap();

        let mut selection = SubtreeSelection::new(SelectionMode::FolderChart);
        selection.toggle_folder(&store, a).unwrap();
        selection.toggle_folder(&store, b).unwrap();
        assert_eq!(selection.selected_folders(), vec![FolderPath::from_segments(["B"])]);
        assert_eq!(selection.target_folder(&store).unwrap(), Some(b));
    }

    #[test]
    fn activity_mode_ignores_folders() {
        let mut store = WorkspaceStore::new();
        let a = store.create_folder("A").unwrap();
        let mut selection = SubtreeSelection::new(SelectionMode::SingleActivity);
        assert_eq!(
            selection.toggle_folder(&store, a).unwrap(),
            SelectionState::Unselected
        );
        assert!(selection.is_empty());
    }
}
