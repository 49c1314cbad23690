//! Application context.
//!
//! # Responsibility
//! - Own the archive, the loaded store and the chart options for one
//!   workspace directory.
//! - Save everything that changed in one call.
//!
//! # Invariants
//! - One context per workspace directory; callers pass it by reference.

use crate::config::ChartOptions;
use crate::repo::archive_repo::{ArchiveError, ArchiveRepository, ArchiveResult, SaveReport};
use crate::service::workspace_store::WorkspaceStore;
use log::warn;
use std::path::Path;

pub struct AppContext {
    archive: ArchiveRepository,
    store: WorkspaceStore,
    options: ChartOptions,
    saved_options: ChartOptions,
}

impl AppContext {
    /// Opens the workspace at `root`, creating an empty one when missing.
    ///
    /// Unreadable options fall back to defaults; a corrupt tree is an error.
    pub fn open(root: impl AsRef<Path>) -> ArchiveResult<Self> {
        let archive = ArchiveRepository::open(root)?;
        let store = archive.load_workspace()?;
        let options = match archive.read_json_or_default::<ChartOptions>(&archive.options_path()) {
            Ok(options) => options,
            Err(err @ ArchiveError::Json { .. }) => {
                warn!("event=options_load module=context status=fallback error={err}");
                ChartOptions::default()
            }
            Err(err) => return Err(err),
        };
        Ok(Self {
            archive,
            store,
            saved_options: options.clone(),
            options,
        })
    }

    pub fn archive(&self) -> &ArchiveRepository {
        &self.archive
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorkspaceStore {
        &mut self.store
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ChartOptions {
        &mut self.options
    }

    /// Writes the dirty workspace parts and changed options.
    pub fn save_all(&mut self) -> ArchiveResult<SaveReport> {
        let report = self.archive.save_workspace(&mut self.store)?;
        if self.options != self.saved_options {
            self.archive
                .write_json(&self.archive.options_path(), &self.options)?;
            self.saved_options = self.options.clone();
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::AppContext;
    use crate::config::ChartKind;

    #[test]
    fn options_survive_reopen_and_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = AppContext::open(dir.path()).unwrap();
        context.options_mut().chart_kind = ChartKind::Bar;
        context.save_all().unwrap();

        let reopened = AppContext::open(dir.path()).unwrap();
        assert_eq!(reopened.options().chart_kind, ChartKind::Bar);

        std::fs::write(dir.path().join("options.json"), b"[").unwrap();
        let fallback = AppContext::open(dir.path()).unwrap();
        assert_eq!(fallback.options().chart_kind, ChartKind::Line);
    }
}
