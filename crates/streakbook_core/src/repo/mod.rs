//! Persistence for workspaces.
//!
//! # Responsibility
//! - Flatten and rebuild the activity tree (`tree_codec`).
//! - Store records, the tree index and options in a directory (`archive_repo`).
//!
//! # Invariants
//! - Reads reject corrupt state instead of masking it; the only recovery is
//!   re-homing unreferenced records into the root folder.
//! - Writes are limited to dirty parts.

pub mod archive_repo;
pub mod tree_codec;
