//! External Process Execution
//!
//! The permission step and lifecycle commands shell out through
//! [`CommandRunner`], so tests can swap the real process for a mock.

use std::{borrow::Cow, ffi::OsString, path::Path, process::Command};

/// What a finished external command reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Runs a program to completion in a given working directory.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` inside `cwd` and waits for it.
    ///
    /// # Errors
    /// * If the process cannot be spawned.
    fn run(&self, program: &str, args: &[OsString], cwd: &Path) -> std::io::Result<CommandOutcome>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString], cwd: &Path) -> std::io::Result<CommandOutcome> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;

        Ok(CommandOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Renders a program and its arguments the way a shell user would type them.
///
/// Only used for messages; arguments that are not valid UTF-8 are shown lossily.
#[must_use]
pub fn display_command(program: &str, args: &[OsString]) -> String {
    std::iter::once(Cow::Borrowed(program))
        .chain(args.iter().map(|arg| arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let args: Vec<OsString> = vec!["-R".into(), "+x".into(), ".git/hooks".into()];
        assert_eq!(display_command("chmod", &args), "chmod -R +x .git/hooks");
        assert_eq!(display_command("true", &[]), "true");
    }

    #[test]
    fn test_outcome_success() {
        let ok = CommandOutcome {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        let failed = CommandOutcome {
            code: Some(1),
            ..ok.clone()
        };
        let killed = CommandOutcome { code: None, ..ok.clone() };

        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = SystemRunner;

        let ok = runner.run("true", &[], dir.path()).unwrap();
        assert!(ok.success());

        let failed = runner.run("false", &[], dir.path()).unwrap();
        assert_eq!(failed.code, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_passes_raw_arguments() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::TempDir::new().unwrap();
        let name = std::ffi::OsStr::from_bytes(b"hook\xff");

        let outcome = SystemRunner
            .run("touch", &[name.to_owned()], dir.path())
            .unwrap();

        assert!(outcome.success());
        assert!(dir.path().join(name).is_file());
    }

    #[test]
    fn test_system_runner_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = SystemRunner.run("hookup-definitely-not-a-program", &[], dir.path());
        assert!(result.is_err());
    }
}
