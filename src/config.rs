//! Configuration Management Module for Hookup
//!
//! Settings are layered, lowest priority first:
//! - built-in defaults
//! - the user file at `~/.config/hookup/config.toml`
//! - the project file `hookup.toml` at the repository root
//! - `HOOKUP_*` environment variables (e.g. `HOOKUP_OS_NAME`, `HOOKUP_JOBS`).
//!   `HOOKUP_LIFECYCLE_TASKS` takes a comma separated list.
//!
//! # Project file example
//!
//! ```toml
//! scripts_dir = "scripts"
//! hooks_dir = ".git/hooks"
//! suffix = ".sh"
//! attach_to_lifecycle = true
//! lifecycle_tasks = ["preBuild", "build", "clean"]
//!
//! [[commands]]
//! task = "build"
//! run = ["cargo", "build"]
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use config::{Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ConfigError, Result};

/// Name of the per-repository configuration file.
pub const PROJECT_FILE_NAME: &str = "hookup.toml";

/// Prefix of the environment variables that override settings.
pub const ENV_PREFIX: &str = "HOOKUP";

/// Lifecycle tasks that depend on hook installation unless configured otherwise.
pub const DEFAULT_LIFECYCLE_TASKS: [&str; 7] = [
    "preBuild",
    "build",
    "assembleDebug",
    "assembleRelease",
    "installDebug",
    "installRelease",
    "clean",
];

/// Command run by a lifecycle task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCommand {
    pub task: String,
    pub run: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder holding the hook scripts, relative to the repository root.
    pub scripts_dir: PathBuf,
    /// Folder git reads hooks from, relative to the repository root.
    pub hooks_dir: PathBuf,
    /// Suffix marking hook scripts; stripped on install.
    pub suffix: String,
    /// Whether lifecycle tasks depend on `installGitHooks`.
    pub attach_to_lifecycle: bool,
    pub lifecycle_tasks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Overrides the detected OS identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    pub commands: Vec<TaskCommand>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("scripts"),
            hooks_dir: PathBuf::from(".git").join("hooks"),
            suffix: ".sh".to_string(),
            attach_to_lifecycle: true,
            lifecycle_tasks: DEFAULT_LIFECYCLE_TASKS.iter().map(ToString::to_string).collect(),
            jobs: None,
            os_name: None,
            commands: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads the settings for the repository at `repo_root`, including the
    /// user file from the home directory.
    ///
    /// # Errors
    /// * If a configuration file exists but cannot be parsed
    pub fn load(repo_root: &Path) -> Result<Self> {
        Self::load_from(user_config_path().as_deref(), repo_root)
    }

    /// Loads the settings with an explicit user file (or none).
    ///
    /// # Errors
    /// * If a configuration file exists but cannot be parsed
    pub fn load_from(user_file: Option<&Path>, repo_root: &Path) -> Result<Self> {
        Self::load_with_env(user_file, repo_root, None)
    }

    /// Same as [`Settings::load_from`], reading `HOOKUP_*` variables from
    /// `env` instead of the process environment when it is given.
    fn load_with_env(
        user_file: Option<&Path>,
        repo_root: &Path,
        env: Option<Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(user_file) = user_file {
            debug!("Reading user configuration from {}", user_file.display());
            builder = builder.add_source(
                File::from(user_file)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let project_file = repo_root.join(PROJECT_FILE_NAME);
        debug!("Reading project configuration from {}", project_file.display());

        let settings = builder
            .add_source(
                File::from(project_file.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("lifecycle_tasks")
                    .source(env),
            )
            .build()
            .map_err(ConfigError::from)?
            .try_deserialize::<Self>()
            .map_err(ConfigError::from)?;

        Ok(settings)
    }

    /// Writes these settings to `hookup.toml` in `repo_root`.
    ///
    /// # Errors
    /// * `ConfigError::AlreadyExists` if the file exists and `force` is false
    /// * If the file cannot be written
    pub fn write_project_file(&self, repo_root: &Path, force: bool) -> Result<PathBuf> {
        let path = repo_root.join(PROJECT_FILE_NAME);

        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists { path }.into());
        }

        let content = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        fs::write(&path, content).map_err(ConfigError::from)?;

        Ok(path)
    }

    /// Command configured for `task`, if any.
    #[must_use]
    pub fn command_for(&self, task: &str) -> Option<&[String]> {
        self.commands
            .iter()
            .find(|command| command.task == task)
            .map(|command| command.run.as_slice())
            .filter(|run| !run.is_empty())
    }
}

/// Location of the user configuration file.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("hookup").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HookupError;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();

        let settings = Settings::load_from(None, temp_dir.path()).unwrap();

        assert_eq!(settings.scripts_dir, PathBuf::from("scripts"));
        assert_eq!(settings.hooks_dir, PathBuf::from(".git/hooks"));
        assert_eq!(settings.suffix, ".sh");
        assert!(settings.attach_to_lifecycle);
        assert_eq!(settings.lifecycle_tasks.len(), DEFAULT_LIFECYCLE_TASKS.len());
    }

    #[test]
    fn test_project_file_overrides_user_file() {
        let temp_dir = TempDir::new().unwrap();
        let user_file = temp_dir.path().join("user.toml");
        fs::write(&user_file, "suffix = \".bash\"\nscripts_dir = \"tools\"\n").unwrap();
        fs::write(
            temp_dir.path().join(PROJECT_FILE_NAME),
            "scripts_dir = \"githooks\"\nattach_to_lifecycle = false\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(user_file.as_path()), temp_dir.path()).unwrap();

        assert_eq!(settings.suffix, ".bash");
        assert_eq!(settings.scripts_dir, PathBuf::from("githooks"));
        assert!(!settings.attach_to_lifecycle);
    }

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_overrides_project_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(PROJECT_FILE_NAME),
            "lifecycle_tasks = [\"build\"]\nos_name = \"Linux\"\n",
        )
        .unwrap();

        let settings = Settings::load_with_env(
            None,
            temp_dir.path(),
            env(&[
                ("HOOKUP_LIFECYCLE_TASKS", "build,lint"),
                ("HOOKUP_OS_NAME", "Mac OS X"),
                ("HOOKUP_JOBS", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.lifecycle_tasks, vec!["build", "lint"]);
        assert_eq!(settings.os_name.as_deref(), Some("Mac OS X"));
        assert_eq!(settings.jobs, Some(3));
    }

    #[test]
    fn test_env_single_lifecycle_task() {
        let temp_dir = TempDir::new().unwrap();

        let settings = Settings::load_with_env(
            None,
            temp_dir.path(),
            env(&[("HOOKUP_LIFECYCLE_TASKS", "build")]),
        )
        .unwrap();

        assert_eq!(settings.lifecycle_tasks, vec!["build"]);
    }

    #[test]
    fn test_commands_keep_task_case() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(PROJECT_FILE_NAME),
            "[[commands]]\ntask = \"assembleDebug\"\nrun = [\"echo\", \"assembling\"]\n",
        )
        .unwrap();

        let settings = Settings::load_from(None, temp_dir.path()).unwrap();

        assert_eq!(
            settings.command_for("assembleDebug"),
            Some(&["echo".to_string(), "assembling".to_string()][..])
        );
        assert_eq!(settings.command_for("build"), None);
    }

    #[test]
    fn test_malformed_project_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE_NAME), "suffix = missing_quotes").unwrap();

        assert!(matches!(
            Settings::load_from(None, temp_dir.path()),
            Err(HookupError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_write_project_file() {
        let temp_dir = TempDir::new().unwrap();

        let path = Settings::default()
            .write_project_file(temp_dir.path(), false)
            .unwrap();
        assert!(path.exists());

        // The written file loads back to the defaults
        let settings = Settings::load_from(None, temp_dir.path()).unwrap();
        assert_eq!(settings.scripts_dir, Settings::default().scripts_dir);
        assert_eq!(settings.lifecycle_tasks, Settings::default().lifecycle_tasks);

        assert!(matches!(
            Settings::default().write_project_file(temp_dir.path(), false),
            Err(HookupError::Config(ConfigError::AlreadyExists { .. }))
        ));
        assert!(
            Settings::default()
                .write_project_file(temp_dir.path(), true)
                .is_ok()
        );
    }
}
