use std::{collections::BTreeMap, io, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use console::style;
use inquire::Confirm;
use tracing::debug;

use crate::{
    config::{PROJECT_FILE_NAME, Settings},
    errors::{HookupError, Result},
    git::find_repository_root,
    hooks::runner::SystemRunner,
    logging::init_logging,
    platform::{classify, current_os_identifier},
    tasks::{
        executor::{ExecutionReport, Executor, TaskOutcome},
        graph::TaskGraph,
        lifecycle::{COPY_GIT_HOOKS, HookContext, INSTALL_GIT_HOOKS, build_task_graph},
    },
    utils::{format_list, print_info, print_success, print_warning},
};

#[derive(Subcommand)]
enum Commands {
    /// Install subcommand
    /// Copy the hook scripts into the hooks folder and make them executable.
    #[command(short_flag = 'i')]
    Install,

    /// Copy subcommand
    /// Copy the hook scripts without touching their permissions.
    Copy,

    /// Run subcommand
    /// Run tasks (e.g. `build`, `clean`) after everything they depend on.
    #[command(short_flag = 'r')]
    Run {
        /// Names of the tasks to run
        #[arg(value_name = "TASKS", required = true)]
        tasks: Vec<String>,
    },

    /// List the tasks, their group and their dependencies.
    Tasks,

    /// Show how the host platform is classified.
    Platform,

    /// Create a `hookup.toml` with the default settings at the repository root.
    Init {
        /// Replace an existing file without asking
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
#[command(about = "Install git hooks from a scripts folder, before the tasks that need them.")]
#[command(author = "Tom Planche <tomplanche@proton.me>")]
#[command(version)]
#[command(help_template = "{about}\nMade by: {author}\n\nUSAGE:\n{usage}\n\n{all-args}\n")]
#[command(name = "hookup")]
pub struct Cli {
    /// Commands
    #[command(subcommand)]
    command: Commands,

    /// Repository root. Defaults to the top level of the current git repository.
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Verbose
    /// Print debug information about every step.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Show what would be done without copying or running anything.
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    /// Number of tasks run in parallel.
    #[arg(short, long, global = true, value_name = "N")]
    jobs: Option<usize>,
}

/// # `run`
/// Runs the program.
///
/// ## Errors
/// Returns an error if the command fails.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Commands::Completion { shell } = cli.command {
        generate(shell, &mut Cli::command(), "hookup", &mut io::stdout());
        return Ok(());
    }

    let repo_root = match &cli.root {
        Some(root) => root.clone(),
        None => find_repository_root()?,
    };
    debug!("Repository root: {}", repo_root.display());

    if let Commands::Init { force } = cli.command {
        return init(&repo_root, force);
    }

    let settings = Settings::load(&repo_root)?;
    let os_identifier = current_os_identifier(settings.os_name.as_deref());
    let platform = classify(&os_identifier);

    let executor = cli
        .jobs
        .or(settings.jobs)
        .map_or_else(Executor::default, Executor::new);

    let context = HookContext {
        repo_root,
        settings,
        platform,
        runner: Arc::new(SystemRunner),
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Install => execute(&context, executor, &[INSTALL_GIT_HOOKS]),
        Commands::Copy => execute(&context, executor, &[COPY_GIT_HOOKS]),
        Commands::Run { tasks } => {
            let targets: Vec<&str> = tasks.iter().map(String::as_str).collect();
            execute(&context, executor, &targets)
        }
        Commands::Tasks => {
            print_tasks(&build_task_graph(&context)?)?;
            Ok(())
        }
        Commands::Platform => {
            print_info(
                "Host platform",
                &format!(
                    "OS identifier: {os_identifier}\nClassification: {platform}\nHooks supported: {}",
                    platform.supports_hooks()
                ),
            );
            Ok(())
        }
        Commands::Init { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn execute(context: &HookContext, executor: Executor, targets: &[&str]) -> Result<()> {
    let graph = build_task_graph(context)?;
    debug!("Execution plan: {:?}", graph.execution_plan(targets)?);

    let report = executor.run(&graph, targets)?;
    print_report(&report);

    if !context.platform.supports_hooks() {
        print_warning(
            "Unsupported platform",
            "Git hooks are only installed on Linux and macOS; hook tasks were skipped.",
        );
    }

    let report = report.into_result()?;
    let executed = report
        .results()
        .iter()
        .filter(|result| result.outcome == TaskOutcome::Succeeded)
        .count();

    let title = if context.dry_run {
        "Dry run finished"
    } else {
        "Tasks finished"
    };

    print_success(
        title,
        &format!(
            "{executed} task(s) executed, finished at {}",
            chrono::Local::now().format("%H:%M:%S")
        ),
    );

    Ok(())
}

fn print_report(report: &ExecutionReport) {
    for result in report.results() {
        let outcome = match &result.outcome {
            TaskOutcome::Succeeded => style(result.outcome.to_string()).green(),
            TaskOutcome::Skipped => style(result.outcome.to_string()).dim(),
            TaskOutcome::Failed(_) => style(result.outcome.to_string()).red(),
            TaskOutcome::Blocked { .. } => style(result.outcome.to_string()).yellow(),
        };

        println!(
            "  {:<18} {outcome} ({} ms)",
            result.name,
            result.duration.as_millis()
        );
    }
}

fn print_tasks(graph: &TaskGraph) -> Result<()> {
    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for task in graph.tasks() {
        let dependencies = graph.dependencies_of(task.name())?;
        let mut line = task.name().to_string();

        if let Some(description) = task.description_text() {
            line.push_str(&format!(" - {description}"));
        }
        if !dependencies.is_empty() {
            line.push_str(&format!(" (depends on: {})", dependencies.join(", ")));
        }

        groups
            .entry(task.group_name().unwrap_or("other"))
            .or_default()
            .push(line);
    }

    for (group, lines) in groups {
        println!("{}\n{}", style(format!("{group} tasks")).bold(), format_list(&lines));
    }

    Ok(())
}

fn init(repo_root: &std::path::Path, force: bool) -> Result<()> {
    let path = repo_root.join(PROJECT_FILE_NAME);
    let mut force = force;

    if path.exists() && !force {
        match Confirm::new(&format!("{PROJECT_FILE_NAME} already exists. Overwrite it?"))
            .with_default(false)
            .prompt()
        {
            Ok(true) => force = true,
            Ok(false) => return Err(HookupError::UserCancelled),
            // Not interactive: fall through and report the existing file.
            Err(_) => {}
        }
    }

    let path = Settings::default().write_project_file(repo_root, force)?;
    print_success("Configuration created", &path.display().to_string());

    Ok(())
}

/// Suggestion printed under an error message.
#[must_use]
pub fn suggestion_for(error: &HookupError) -> &'static str {
    match error {
        HookupError::Git(_) => "Run hookup from inside a git repository, or pass --root <DIR>.",
        HookupError::Config(_) => "Check hookup.toml and ~/.config/hookup/config.toml.",
        HookupError::Hook(_) => "Check that the scripts and hooks folders exist and are writable.",
        HookupError::Task(_) => "Fix the failing task and run the command again.",
        HookupError::Io(_) | HookupError::UserCancelled => "Run the command again.",
    }
}
