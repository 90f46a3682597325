//! Resolution of paths relative to the build script that asked for them.
//!
//! [`caller_dir`] reports the directory of the source file it was called
//! from. Marking a helper `#[track_caller]` forwards the location, so a
//! library function that calls [`caller_dir`] on behalf of its own caller
//! resolves paths next to that caller's file, not next to the library.

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Directory of the calling source file.
///
/// Cargo records source paths relative to the directory the crate was
/// compiled from, which is the workspace root for workspace members. The
/// current directory and its ancestors are searched for the first one that
/// holds the calling file. This also covers a member's directory, which is
/// the current directory under `cargo test`. Use [`caller_dir_in`] when the
/// build root is known.
///
/// # Errors
///
/// Returns [`Error::SourceNotFound`] if no ancestor of the current directory
/// contains the calling file, and [`Error::NoParent`] if the source location
/// has no parent directory.
#[track_caller]
pub fn caller_dir() -> Result<PathBuf> {
    let file = Location::caller().file();

    locate(&env::current_dir()?, file)
}

/// Directory of the calling source file, with relative source paths
/// resolved against `base`.
///
/// `base` must be the directory the calling crate was compiled from, the
/// workspace root for workspace members. The result is not checked for
/// existence.
///
/// # Errors
///
/// Returns [`Error::NoParent`] if the source location has no parent
/// directory.
#[track_caller]
pub fn caller_dir_in(base: &Path) -> Result<PathBuf> {
    let file = Location::caller().file();

    Ok(resolve(base, source_parent(file)?))
}

fn source_parent(file: &str) -> Result<&Path> {
    Path::new(file)
        .parent()
        .ok_or_else(|| Error::NoParent(file.to_string()))
}

fn locate(start: &Path, file: &str) -> Result<PathBuf> {
    let parent = source_parent(file)?;

    if Path::new(file).is_absolute() {
        return Ok(parent.to_path_buf());
    }

    start
        .ancestors()
        .find(|root| root.join(file).is_file())
        .map(|root| resolve(root, parent))
        .ok_or_else(|| Error::SourceNotFound(file.to_string()))
}

/// Joins `path` onto `base` unless `path` is already absolute
pub fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
