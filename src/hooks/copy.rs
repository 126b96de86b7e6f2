//! Hook Script Copying
//!
//! Selects every `*<suffix>` file below the scripts directory and copies it
//! into the hooks directory with the suffix removed, keeping sub-directories.

use std::{
    collections::BTreeSet,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use glob::{GlobError, MatchOptions, Pattern, glob_with};
use tracing::{debug, info, warn};

use crate::errors::{HookError, Result};

/// Source and destination of one installed hook script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of a copy pass, sorted by source path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub files: Vec<HookFile>,
    pub dry_run: bool,
}

impl CopyReport {
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Strips `suffix` from a hook script file name.
///
/// Returns `None` when the name does not carry the suffix or is nothing but
/// the suffix.
///
/// # Examples
///
/// ```
/// use hookup::hooks::copy::installed_name;
///
/// assert_eq!(installed_name("pre-commit.sh", ".sh"), Some("pre-commit"));
/// assert_eq!(installed_name("README.md", ".sh"), None);
/// ```
#[must_use]
pub fn installed_name<'a>(file_name: &'a str, suffix: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(suffix)
        .filter(|stripped| !stripped.is_empty())
}

/// Lists the hook scripts below `scripts_dir` and where each one is installed.
///
/// Scripts are selected with the glob `<scripts_dir>/**/*<suffix>`. File names
/// that are not valid UTF-8 cannot be matched and are skipped with a warning.
///
/// # Errors
/// * If `scripts_dir` is not valid UTF-8
/// * If `suffix` cannot be turned into a glob pattern
/// * If a directory below `scripts_dir` cannot be read
pub fn plan_copies(scripts_dir: &Path, hooks_dir: &Path, suffix: &str) -> Result<Vec<HookFile>> {
    if !scripts_dir.is_dir() {
        warn!(
            "Scripts directory {} not found, no hooks to copy",
            scripts_dir.display()
        );
        return Ok(Vec::new());
    }

    let root = scripts_dir
        .to_str()
        .ok_or_else(|| HookError::NonUtf8Path {
            path: scripts_dir.to_path_buf(),
        })?
        .trim_end_matches(std::path::is_separator);
    let root = Pattern::escape(root);
    let pattern = format!("{root}/**/*{}", Pattern::escape(suffix));
    debug!("Selecting hook scripts with {pattern}");

    let mut planned = Vec::new();

    for entry in glob_with(&pattern, MATCH_OPTIONS).map_err(HookError::from)? {
        let source = entry.map_err(unreadable)?;

        if !source.is_file() {
            continue;
        }

        let Ok(relative) = source.strip_prefix(scripts_dir) else {
            continue;
        };
        let Some(name) = relative
            .file_name()
            .and_then(OsStr::to_str)
            .and_then(|file_name| installed_name(file_name, suffix))
        else {
            continue;
        };

        planned.push(HookFile {
            destination: hooks_dir.join(relative.with_file_name(name)),
            source,
        });
    }

    warn_unmatchable_names(scripts_dir, &root, suffix)?;

    planned.sort_by(|a, b| a.source.cmp(&b.source));

    Ok(planned)
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn unreadable(error: GlobError) -> HookError {
    HookError::ReadDir {
        path: error.path().to_path_buf(),
        source: error.into_error(),
    }
}

/// Warns about scripts carrying `suffix` whose names glob cannot match.
fn warn_unmatchable_names(scripts_dir: &Path, root: &str, suffix: &str) -> Result<()> {
    let mut dirs = BTreeSet::from([scripts_dir.to_path_buf()]);

    for dir in glob_with(&format!("{root}/**"), MATCH_OPTIONS).map_err(HookError::from)? {
        dirs.insert(dir.map_err(unreadable)?);
    }

    for dir in dirs {
        let entries = fs::read_dir(&dir).map_err(|source| HookError::ReadDir {
            path: dir.clone(),
            source,
        })?;

        for entry in entries.flatten() {
            let file_name = entry.file_name();

            if file_name.to_str().is_none()
                && file_name.as_encoded_bytes().ends_with(suffix.as_bytes())
            {
                warn!(
                    "Skipping {}: the file name is not valid UTF-8",
                    entry.path().display()
                );
            }
        }
    }

    Ok(())
}

/// Copies hook scripts from `scripts_dir` into `hooks_dir`, stripping `suffix`.
///
/// Existing hooks with the same name are overwritten; other files in
/// `hooks_dir` are left alone. With `dry_run` nothing is written.
///
/// # Errors
/// * If the scripts directory cannot be walked
/// * If a destination directory cannot be created
/// * If a file cannot be copied
pub fn copy_hooks(
    scripts_dir: &Path,
    hooks_dir: &Path,
    suffix: &str,
    dry_run: bool,
) -> Result<CopyReport> {
    let files = plan_copies(scripts_dir, hooks_dir, suffix)?;

    if dry_run {
        for file in &files {
            info!(
                "Would copy {} to {}",
                file.source.display(),
                file.destination.display()
            );
        }

        return Ok(CopyReport {
            files,
            dry_run: true,
        });
    }

    for file in &files {
        if let Some(parent) = file.destination.parent() {
            fs::create_dir_all(parent).map_err(|source| HookError::Copy {
                from: file.source.clone(),
                to: file.destination.clone(),
                source,
            })?;
        }

        fs::copy(&file.source, &file.destination).map_err(|source| HookError::Copy {
            from: file.source.clone(),
            to: file.destination.clone(),
            source,
        })?;

        debug!(
            "Copied {} to {}",
            file.source.display(),
            file.destination.display()
        );
    }

    info!("Copied {} hook script(s) into {}", files.len(), hooks_dir.display());

    Ok(CopyReport {
        files,
        dry_run: false,
    })
}
