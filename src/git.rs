//! Repository Discovery
//!
//! Locates the working tree root that hook paths are resolved against.

use std::{path::PathBuf, process::Command};

use crate::errors::{GitError, Result};

/// Finds the top-level directory of the current git working tree.
///
/// This runs `git rev-parse --show-toplevel`, so it works from any
/// subdirectory of the repository.
///
/// # Errors
///
/// Returns an error if:
/// - `git` cannot be executed
/// - The current directory is not inside a git repository
///
/// # Examples
///
/// ```no_run
/// use hookup::git::find_repository_root;
///
/// let root = find_repository_root()?;
/// println!("Repository root: {}", root.display());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn find_repository_root() -> Result<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .map_err(GitError::from)?;

    if !output.status.success() {
        return Err(GitError::RepositoryNotFound.into());
    }

    let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());

    if root.as_os_str().is_empty() || !root.is_dir() {
        return Err(GitError::RepositoryNotFound.into());
    }

    Ok(root)
}
