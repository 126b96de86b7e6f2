use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the Hookup application
#[derive(Error, Debug)]
pub enum HookupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled by user")]
    UserCancelled,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration - please check your hookup.toml syntax: {0}")]
    Invalid(#[from] config::ConfigError),

    #[error("Could not serialize the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error while accessing config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration file already exists at {} - use `hookup init --force` to replace it", .path.display())]
    AlreadyExists { path: PathBuf },
}

/// Git-related errors
#[derive(Error, Debug)]
pub enum GitError {
    #[error("IO error during git operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Not in a git repository - run this command from within a git repository or pass --root")]
    RepositoryNotFound,
}

/// Errors raised while copying hook scripts or marking them executable
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read scripts directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scripts directory {} is not valid UTF-8 and cannot be searched", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("Invalid hook script pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Command `{command}` exited with {}\nOutput: {stderr}", exit_label(.code))]
    Chmod {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command `{command}` failed to start: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

/// Task graph and task execution errors
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task '{name}' not found in the task graph")]
    Unknown { name: String },

    #[error("Task '{name}' is already registered")]
    Duplicate { name: String },

    #[error("Making '{task}' depend on '{dependency}' would create a cycle")]
    Cycle { task: String, dependency: String },

    #[error("Task '{task}' failed: {reason}")]
    Failed { task: String, reason: String },

    #[error("Command for task '{task}' exited with {}", exit_label(.code))]
    CommandFailed { task: String, code: Option<i32> },
}

/// Type alias for Result using `HookupError`
pub type Result<T> = std::result::Result<T, HookupError>;

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
}
