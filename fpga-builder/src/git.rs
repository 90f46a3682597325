//! Git working tree checks.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::console;
#[cfg(feature = "log")]
use crate::log::debug;
use crate::{Error, Result};

/// Status query whose porcelain output is empty for a clean working tree
pub const STATUS_COMMAND: &str = "git status --porcelain";

/// Source of `git status --porcelain` output.
///
/// Abstracting the query keeps the cleanliness rules testable without a real
/// repository.
pub trait StatusSource {
    /// Returns the porcelain status output for the repository at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query can not be run or fails.
    fn porcelain_status(&self, dir: &Path) -> Result<String>;
}

/// Runs the `git` executable found on `PATH`
#[derive(Debug, Default, Copy, Clone)]
pub struct LiveGit;

impl StatusSource for LiveGit {
    fn porcelain_status(&self, dir: &Path) -> Result<String> {
        let output = Command::new("git")
            .args(["status", "--porcelain"])
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Launch {
                command: STATUS_COMMAND.to_string(),
                split: STATUS_COMMAND.split(' ').map(String::from).collect(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            console::err(stderr.trim_end());
            return Err(Error::CommandFailed {
                command: STATUS_COMMAND.to_string(),
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Options for [`repo_clean`]
#[derive(Debug, Default, Copy, Clone)]
pub struct CleanCheck {
    /// Report a dirty tree as clean.
    ///
    /// Development aid only, keep it off any user-facing surface.
    pub allow_dirty: bool,
}

/// Result of a cleanliness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// `true` when there are no pending changes (or the check was bypassed)
    pub clean: bool,
    /// Empty when clean, otherwise the status command followed by its output
    pub detail: String,
}

/// Checks whether the git repository at `dir` has no pending changes.
///
/// # Errors
///
/// Returns an error if `git` can not be started or reports a failure, for
/// example when `dir` is not inside a repository.
pub fn repo_clean(dir: &Path, options: CleanCheck) -> Result<RepoStatus> {
    repo_clean_with(&LiveGit, dir, options)
}

/// [`repo_clean`] against an arbitrary [`StatusSource`]
///
/// # Errors
///
/// Propagates errors from `source`.
pub fn repo_clean_with<S>(source: &S, dir: &Path, options: CleanCheck) -> Result<RepoStatus>
where
    S: StatusSource + ?Sized,
{
    let output = source.porcelain_status(dir)?;

    #[cfg(feature = "log")]
    debug!("{} in {}: {} bytes", STATUS_COMMAND, dir.display(), output.len());

    Ok(evaluate(&output, options))
}

fn evaluate(output: &str, options: CleanCheck) -> RepoStatus {
    if output.is_empty() {
        return RepoStatus {
            clean: true,
            detail: String::new(),
        };
    }

    let detail = format!("{STATUS_COMMAND}\n{output}");

    if options.allow_dirty {
        console::warning("********************************************");
        console::warning("**** WARNING: Bypassing git clean check ****");
        console::warning("********************************************");
    }

    RepoStatus {
        clean: options.allow_dirty,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl StatusSource for Fixed {
        fn porcelain_status(&self, _dir: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl StatusSource for Broken {
        fn porcelain_status(&self, _dir: &Path) -> Result<String> {
            Err(Error::CommandFailed {
                command: STATUS_COMMAND.to_string(),
                code: Some(128),
            })
        }
    }

    #[test]
    fn test_empty_status_is_clean() {
        let status = repo_clean_with(&Fixed(""), Path::new("."), CleanCheck::default()).unwrap();

        assert_eq!(
            RepoStatus {
                clean: true,
                detail: String::new()
            },
            status
        );
    }

    #[test]
    fn test_pending_changes_are_dirty() {
        let output = " M hw/top.vhd\n?? build/\n";
        let status =
            repo_clean_with(&Fixed(output), Path::new("."), CleanCheck::default()).unwrap();

        assert!(!status.clean);
        assert_eq!(
            "git status --porcelain\n M hw/top.vhd\n?? build/\n",
            status.detail
        );
    }

    #[test]
    fn test_allow_dirty_bypasses_check() {
        let options = CleanCheck { allow_dirty: true };
        let status = repo_clean_with(&Fixed(" M a.v\n"), Path::new("."), options).unwrap();

        assert!(status.clean);
        assert!(status.detail.ends_with(" M a.v\n"));
    }

    #[test]
    fn test_allow_dirty_on_clean_tree() {
        let options = CleanCheck { allow_dirty: true };
        let status = repo_clean_with(&Fixed(""), Path::new("."), options).unwrap();

        assert!(status.clean);
        assert!(status.detail.is_empty());
    }

    #[test]
    fn test_source_errors_propagate() {
        let err = repo_clean_with(&Broken, Path::new("."), CleanCheck::default()).unwrap_err();

        assert_eq!(Some(128), err.exit_code());
    }

    #[cfg(unix)]
    mod live {
        use super::*;
        use std::fs;
        use std::path::PathBuf;

        fn scratch_dir(name: &str) -> PathBuf {
            let name = format!("fpga-builder-{name}-{}", std::process::id());
            let dir = std::env::temp_dir().join(name);
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            dir
        }

        #[test]
        fn test_outside_repository_is_an_error() {
            let dir = scratch_dir("no-repo");

            let result = repo_clean(&dir, CleanCheck::default());

            assert!(
                matches!(result, Err(Error::CommandFailed { code: Some(128), ref command })
                    if command == STATUS_COMMAND),
                "{result:?}"
            );
            fs::remove_dir_all(&dir).unwrap();
        }

        #[test]
        fn test_untracked_file_is_dirty() {
            let dir = scratch_dir("repo");
            let init = Command::new("git")
                .args(["init", "-q"])
                .current_dir(&dir)
                .status()
                .unwrap();
            assert!(init.success());

            let status = repo_clean(&dir, CleanCheck::default()).unwrap();
            assert!(status.clean);
            assert!(status.detail.is_empty());

            fs::write(dir.join("top.vhd"), "entity top is end;\n").unwrap();
            let status = repo_clean(&dir, CleanCheck::default()).unwrap();

            assert!(!status.clean);
            assert_eq!("git status --porcelain\n?? top.vhd\n", status.detail);
            fs::remove_dir_all(&dir).unwrap();
        }
    }
}
