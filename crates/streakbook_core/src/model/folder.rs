//! Folder arena record.
//!
//! # Responsibility
//! - Hold one folder's name, parent handle and name-keyed child handles.
//!
//! # Invariants
//! - Children are referenced by handle, never owned by value.
//! - Child maps are ordered by name, so listing order is deterministic.
//! - Mutation goes through `WorkspaceStore`; the setters are crate-private.

use crate::model::activity::ActivityId;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Handle of a folder inside one workspace arena. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(u64);

impl FolderId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Display for FolderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "folder#{}", self.0)
    }
}

/// Named node owning child folders and child activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    name: String,
    parent: Option<FolderId>,
    folders: BTreeMap<String, FolderId>,
    activities: BTreeMap<String, ActivityId>,
}

impl Folder {
    pub(crate) fn new(name: String, parent: Option<FolderId>) -> Self {
        Self {
            name,
            parent,
            folders: BTreeMap::new(),
            activities: BTreeMap::new(),
        }
    }

    /// Folder name; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<FolderId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child folders ordered by name.
    pub fn folders(&self) -> &BTreeMap<String, FolderId> {
        &self.folders
    }

    /// Child activities ordered by name.
    pub fn activities(&self) -> &BTreeMap<String, ActivityId> {
        &self.activities
    }

    pub fn child_folder(&self, name: &str) -> Option<FolderId> {
        self.folders.get(name).copied()
    }

    pub fn child_activity(&self, name: &str) -> Option<ActivityId> {
        self.activities.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.activities.is_empty()
    }

    /// Number of direct children of both kinds.
    pub fn len(&self) -> usize {
        self.folders.len() + self.activities.len()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_parent(&mut self, parent: FolderId) {
        self.parent = Some(parent);
    }

    pub(crate) fn insert_folder(&mut self, name: String, id: FolderId) {
        self.folders.insert(name, id);
    }

    pub(crate) fn remove_folder(&mut self, name: &str) -> Option<FolderId> {
        self.folders.remove(name)
    }

    pub(crate) fn insert_activity(&mut self, name: String, id: ActivityId) {
        self.activities.insert(name, id);
    }

    pub(crate) fn remove_activity(&mut self, name: &str) -> Option<ActivityId> {
        self.activities.remove(name)
    }
}
