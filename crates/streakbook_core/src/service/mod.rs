//! Tree services.
//!
//! # Responsibility
//! - Own the in-memory activity tree and its structural operations.
//! - Keep selection flows and FFI layers away from arena details.
//!
//! # See also
//! - `repo` for persistence of the tree built here.

pub mod selection;
pub mod workspace_store;
