//! Folder paths, entry names and the path containment predicate.
//!
//! # Responsibility
//! - Represent absolute folder locations as name sequences.
//! - Normalize user-provided folder/activity names.
//! - Decide path containment for cycle checks and subtree selection.
//!
//! # Invariants
//! - Root path is the empty sequence and renders as `/`.
//! - A path never contains itself (`is_proper_descendant_path(p, p) == false`).
//! - Folder names never parse as UUIDs; the flat index format relies on it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Separator used by the flat path format.
pub const PATH_SEPARATOR: char = '/';

/// Kind of tree entry a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Folder,
    Activity,
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::Activity => write!(f, "activity"),
        }
    }
}

/// Name rejected by [`normalize_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is blank after trim.
    Blank(EntryKind),
    /// Name contains the path separator.
    ContainsSeparator { kind: EntryKind, name: String },
    /// Folder name would be read back as an activity id.
    LooksLikeId(String),
}

impl Display for NameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(kind) => write!(f, "{kind} name must not be blank"),
            Self::ContainsSeparator { kind, name } => {
                write!(f, "{kind} name must not contain `{PATH_SEPARATOR}`: `{name}`")
            }
            Self::LooksLikeId(name) => write!(f, "folder name must not be a uuid: `{name}`"),
        }
    }
}

impl Error for NameError {}

/// Trims and validates a folder or activity name.
pub fn normalize_name(value: &str, kind: EntryKind) -> Result<String, NameError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NameError::Blank(kind));
    }
    if trimmed.contains(PATH_SEPARATOR) {
        return Err(NameError::ContainsSeparator {
            kind,
            name: trimmed.to_string(),
        });
    }
    if kind == EntryKind::Folder && Uuid::parse_str(trimmed).is_ok() {
        return Err(NameError::LooksLikeId(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Absolute folder location, root first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderPath(Vec<String>);

impl FolderPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses `/a/b` (or `/` for root). Returns `None` for relative paths and
    /// empty segments.
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix(PATH_SEPARATOR)?;
        if rest.is_empty() {
            return Some(Self::root());
        }
        let segments = rest
            .split(PATH_SEPARATOR)
            .map(|segment| (!segment.is_empty()).then(|| segment.to_string()))
            .collect::<Option<Vec<_>>>()?;
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment, `None` for root.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Prefix test; every path starts with itself and with root.
    pub fn starts_with(&self, prefix: &FolderPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn is_proper_descendant_of(&self, ancestor: &FolderPath) -> bool {
        is_proper_descendant_path(self, ancestor)
    }
}

impl Display for FolderPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{PATH_SEPARATOR}");
        }
        for segment in &self.0 {
            write!(f, "{PATH_SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

/// Returns true iff `ancestor` is a strict prefix of `candidate`.
///
/// Moving folder `A` into `B` must be rejected when
/// `is_proper_descendant_path(B, A)` holds or `B == A`.
pub fn is_proper_descendant_path(candidate: &FolderPath, ancestor: &FolderPath) -> bool {
    candidate.depth() > ancestor.depth() && candidate.starts_with(ancestor)
}
