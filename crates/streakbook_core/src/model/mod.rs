//! Entity model for the activity tree.
//!
//! # Responsibility
//! - Define folder and activity records plus identity rules.
//! - Provide the path containment predicate used by move and selection logic.
//!
//! # Invariants
//! - Activities are identified by a stable `ActivityId` (UUID).
//! - Folders are identified by arena handles and located by `FolderPath`.

pub mod activity;
pub mod folder;
pub mod path;
