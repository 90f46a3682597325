use crate::{Context, Result};
use fpga_builder::console;
use fpga_builder::git::{self, CleanCheck};
use std::path::Path;

/// Reports whether the repository at `dir` is clean.
///
/// Returns `Ok(false)` for a dirty working tree after printing the pending
/// changes.
///
/// # Errors
///
/// Returns an error if `git` can not be run or `dir` is not a repository.
pub fn check_repo_clean(dir: &Path) -> Result<bool> {
    let status = git::repo_clean(dir, CleanCheck::default())
        .with_context(|| format!("Failed to query git status in {}", dir.display()))?;

    if status.clean {
        console::success("✓ Repository is clean");
    } else {
        console::critical_warning("✗ Repository has pending changes");
        console::warning(status.detail.trim_end());
    }

    Ok(status.clean)
}
