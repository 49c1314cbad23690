//! CLI probe for `streakbook_core`.
//!
//! # Responsibility
//! - Verify core crate linkage without the Flutter runtime.
//! - Print the activity tree of a workspace directory, if one is given.
//!
//! Directory comes from the first argument or `STREAKBOOK_DATA_DIR`.

use std::path::PathBuf;
use std::process::ExitCode;
use streakbook_core::config::data_dir_from_env;
use streakbook_core::{AppContext, TreeEntry};

fn main() -> ExitCode {
    println!("streakbook_core ping={}", streakbook_core::ping());
    println!("streakbook_core version={}", streakbook_core::core_version());

    let Some(dir) = std::env::args()
        .nth(1)
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .or_else(data_dir_from_env)
    else {
        return ExitCode::SUCCESS;
    };

    let context = match AppContext::open(&dir) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("cannot open workspace `{}`: {err}", dir.display());
            return ExitCode::FAILURE;
        }
    };
    let store = context.store();
    println!(
        "workspace={} folders={} activities={}",
        dir.display(),
        store.folder_count(),
        store.activity_count()
    );
    store.traverse(|entry| match entry {
        TreeEntry::Folder { folder, depth, .. } => {
            if depth == 0 {
                println!("/");
            } else {
                println!("{}{}/", "  ".repeat(depth), folder.name());
            }
        }
        TreeEntry::Activity {
            activity, depth, ..
        } => {
            let filled = activity.measurements().len();
            println!("{}{} ({filled} day(s))", "  ".repeat(depth), activity.name());
        }
    });
    ExitCode::SUCCESS
}
