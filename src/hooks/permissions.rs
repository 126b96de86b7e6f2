//! Hook Permissions
//!
//! Marks everything below the hooks directory executable with
//! `chmod -R +x`, run from the repository root.

use std::{ffi::OsString, path::Path};

use tracing::{debug, info};

use crate::{
    errors::{HookError, Result},
    hooks::runner::{CommandRunner, display_command},
};

/// Program invoked to change permissions.
pub const CHMOD_PROGRAM: &str = "chmod";

/// Builds the `chmod` arguments for `hooks_dir`, keeping the path as raw OS text.
#[must_use]
pub fn chmod_args(hooks_dir: &Path) -> Vec<OsString> {
    vec!["-R".into(), "+x".into(), hooks_dir.as_os_str().to_owned()]
}

/// Adds the execute bit, recursively, to every entry under `hooks_dir`.
///
/// `hooks_dir` is passed to `chmod` as given, so a relative path is resolved
/// against `repo_root`.
///
/// # Errors
/// * If `chmod` cannot be started
/// * If `chmod` exits with a non-zero status
pub fn make_hooks_executable(
    runner: &dyn CommandRunner,
    repo_root: &Path,
    hooks_dir: &Path,
    dry_run: bool,
) -> Result<()> {
    let args = chmod_args(hooks_dir);
    let command = display_command(CHMOD_PROGRAM, &args);

    if dry_run {
        info!("Would run `{command}` in {}", repo_root.display());
        return Ok(());
    }

    debug!("Running `{command}` in {}", repo_root.display());

    let outcome = runner
        .run(CHMOD_PROGRAM, &args, repo_root)
        .map_err(|source| HookError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !outcome.success() {
        return Err(HookError::Chmod {
            command,
            code: outcome.code,
            stderr: outcome.stderr,
        }
        .into());
    }

    info!("Git hooks installed successfully.");

    Ok(())
}
