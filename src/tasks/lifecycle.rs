//! Hook Task Wiring
//!
//! Builds the task graph used by the CLI:
//! `<lifecycle task> -> installGitHooks -> copyGitHooks`.
//! Both hook tasks are skipped on hosts that are not POSIX-like.

use std::{ffi::OsString, path::PathBuf, sync::Arc};

use tracing::{debug, info};

use crate::{
    config::Settings,
    errors::{HookupError, Result, TaskError},
    hooks::{
        copy::copy_hooks,
        permissions::make_hooks_executable,
        runner::{CommandRunner, display_command},
    },
    platform::HostPlatform,
    tasks::graph::{Task, TaskGraph},
};

pub const COPY_GIT_HOOKS: &str = "copyGitHooks";
pub const INSTALL_GIT_HOOKS: &str = "installGitHooks";
pub const HOOKS_GROUP: &str = "git hooks";
pub const LIFECYCLE_GROUP: &str = "build";

/// Everything the hook and lifecycle tasks need at run time.
#[derive(Clone)]
pub struct HookContext {
    pub repo_root: PathBuf,
    pub settings: Settings,
    pub platform: HostPlatform,
    pub runner: Arc<dyn CommandRunner>,
    pub dry_run: bool,
}

impl HookContext {
    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.repo_root.join(&self.settings.scripts_dir)
    }

    #[must_use]
    pub fn hooks_dir(&self) -> PathBuf {
        self.repo_root.join(&self.settings.hooks_dir)
    }
}

/// Registers the hook tasks and the lifecycle tasks on a fresh graph.
///
/// # Errors
/// * `TaskError::Duplicate` if a lifecycle task reuses a hook task name or
///   appears twice
pub fn build_task_graph(context: &HookContext) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new();
    let supported = context.platform.supports_hooks();

    let copy_context = context.clone();
    graph.register(
        Task::new(COPY_GIT_HOOKS)
            .description(format!(
                "Copies the git hooks from {} to the {} folder.",
                context.settings.scripts_dir.display(),
                context.settings.hooks_dir.display()
            ))
            .group(HOOKS_GROUP)
            .only_if(move || supported)
            .action(move || {
                copy_hooks(
                    &copy_context.scripts_dir(),
                    &copy_context.hooks_dir(),
                    &copy_context.settings.suffix,
                    copy_context.dry_run,
                )
                .map(|_| ())
            }),
    )?;

    let install_context = context.clone();
    graph.register(
        Task::new(INSTALL_GIT_HOOKS)
            .description("Installs the git hooks from the scripts directory.")
            .group(HOOKS_GROUP)
            .only_if(move || supported)
            .action(move || {
                make_hooks_executable(
                    install_context.runner.as_ref(),
                    &install_context.repo_root,
                    &install_context.settings.hooks_dir,
                    install_context.dry_run,
                )
            }),
    )?;
    graph.depends_on(INSTALL_GIT_HOOKS, COPY_GIT_HOOKS)?;

    for name in &context.settings.lifecycle_tasks {
        let task_context = context.clone();
        let task_name = name.clone();

        graph.register(
            Task::new(name.as_str())
                .description(format!("Lifecycle task '{name}'."))
                .group(LIFECYCLE_GROUP)
                .action(move || run_lifecycle_command(&task_context, &task_name)),
        )?;

        if context.settings.attach_to_lifecycle {
            graph.depends_on(name, INSTALL_GIT_HOOKS)?;
        }
    }

    Ok(graph)
}

/// Runs the command configured for a lifecycle task, if there is one.
fn run_lifecycle_command(context: &HookContext, task: &str) -> Result<()> {
    let Some((program, args)) = context
        .settings
        .command_for(task)
        .and_then(<[String]>::split_first)
    else {
        debug!("Task '{task}' has no command configured");
        return Ok(());
    };

    let args: Vec<OsString> = args.iter().map(OsString::from).collect();
    let command = display_command(program, &args);

    if context.dry_run {
        info!("Would run `{command}` for task '{task}'");
        return Ok(());
    }

    info!("Running `{command}` for task '{task}'");

    let outcome = context
        .runner
        .run(program, &args, &context.repo_root)
        .map_err(HookupError::from)?;

    if !outcome.stdout.is_empty() {
        debug!("{}", outcome.stdout);
    }

    if outcome.success() {
        Ok(())
    } else {
        Err(TaskError::CommandFailed {
            task: task.to_string(),
            code: outcome.code,
        }
        .into())
    }
}
