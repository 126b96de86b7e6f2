//! Task Execution
//!
//! Runs an execution plan on a pool of scoped worker threads. A task is only
//! handed to a worker once every dependency has reached a final outcome, so
//! dependency edges hold no matter how many workers run in parallel.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, mpsc},
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    errors::{Result, TaskError},
    tasks::graph::{Task, TaskGraph},
};

/// Final state of a task in one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    /// The `only_if` predicate returned false. Dependents still run.
    Skipped,
    Failed(String),
    /// Never ran because the named dependency failed or was blocked itself.
    Blocked { by: String },
}

impl TaskOutcome {
    /// Whether dependents may run after this outcome.
    #[must_use]
    pub const fn unblocks_dependents(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped)
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "done"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Blocked { by } => write!(f, "not run ('{by}' did not complete)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub name: String,
    pub outcome: TaskOutcome,
    pub duration: Duration,
}

/// Outcomes of one run, in completion order.
#[derive(Debug, Default, Clone)]
pub struct ExecutionReport {
    results: Vec<TaskResult>,
}

impl ExecutionReport {
    #[must_use]
    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    #[must_use]
    pub fn outcome_of(&self, name: &str) -> Option<&TaskOutcome> {
        self.results
            .iter()
            .find(|result| result.name == name)
            .map(|result| &result.outcome)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results
            .iter()
            .all(|result| result.outcome.unblocks_dependents())
    }

    /// Tasks whose own action failed (blocked tasks are not included).
    #[must_use]
    pub fn failures(&self) -> Vec<&TaskResult> {
        self.results
            .iter()
            .filter(|result| matches!(result.outcome, TaskOutcome::Failed(_)))
            .collect()
    }

    /// Turns the first failure into an error.
    ///
    /// # Errors
    /// * `TaskError::Failed` for the first task that failed
    pub fn into_result(self) -> Result<Self> {
        if let Some(failure) = self.failures().first() {
            let reason = match &failure.outcome {
                TaskOutcome::Failed(reason) => reason.clone(),
                other => other.to_string(),
            };

            return Err(TaskError::Failed {
                task: failure.name.clone(),
                reason,
            }
            .into());
        }

        Ok(self)
    }
}

/// Runs task plans with a fixed number of worker threads.
#[derive(Debug, Clone, Copy)]
pub struct Executor {
    jobs: usize,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get))
    }
}

impl Executor {
    /// Creates an executor with `jobs` workers (at least one).
    #[must_use]
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Runs `targets` and everything they depend on.
    ///
    /// A failing task does not stop unrelated tasks; its dependents are
    /// reported as [`TaskOutcome::Blocked`]. Inspect the report (or call
    /// [`ExecutionReport::into_result`]) to decide whether the run failed.
    ///
    /// # Errors
    /// * `TaskError::Unknown` if a target is not registered
    pub fn run(&self, graph: &TaskGraph, targets: &[&str]) -> Result<ExecutionReport> {
        let plan = graph.plan_ids(targets)?;

        let mut pending: HashMap<usize, usize> = HashMap::with_capacity(plan.len());
        let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut blocked_by: HashMap<usize, usize> = HashMap::new();

        for &id in &plan {
            let dependencies = graph.dependency_ids(id);
            pending.insert(id, dependencies.len());
            for &dependency in dependencies {
                dependents.entry(dependency).or_default().push(id);
            }
        }

        let mut ready: VecDeque<usize> = plan
            .iter()
            .copied()
            .filter(|id| pending[id] == 0)
            .collect();

        let mut report = ExecutionReport::default();
        let workers = self.jobs.min(plan.len());

        thread::scope(|scope| {
            let (job_tx, job_rx) = mpsc::channel::<usize>();
            let job_rx = Arc::new(Mutex::new(job_rx));
            let (done_tx, done_rx) = mpsc::channel::<(usize, TaskOutcome, Duration)>();

            for _ in 0..workers {
                let job_rx = Arc::clone(&job_rx);
                let done_tx = done_tx.clone();

                scope.spawn(move || {
                    loop {
                        let next = match job_rx.lock() {
                            Ok(receiver) => receiver.recv(),
                            Err(_) => break,
                        };
                        let Ok(id) = next else { break };

                        let started = Instant::now();
                        let outcome = run_task(graph.task(id));

                        if done_tx.send((id, outcome, started.elapsed())).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            let mut in_flight = 0usize;

            while report.results.len() < plan.len() {
                while let Some(id) = ready.pop_front() {
                    if job_tx.send(id).is_err() {
                        break;
                    }
                    in_flight += 1;
                }

                if in_flight == 0 {
                    break;
                }

                let Ok((id, outcome, duration)) = done_rx.recv() else {
                    break;
                };
                in_flight -= 1;

                // Settle the finished task, then every dependent it releases
                // or blocks.
                let mut settled = vec![(id, outcome, duration)];

                while let Some((id, outcome, duration)) = settled.pop() {
                    let releases = outcome.unblocks_dependents();

                    report.results.push(TaskResult {
                        name: graph.task(id).name().to_string(),
                        outcome,
                        duration,
                    });

                    for &dependent in dependents.get(&id).map_or(&[][..], Vec::as_slice) {
                        if !releases {
                            blocked_by.entry(dependent).or_insert(id);
                        }

                        let Some(count) = pending.get_mut(&dependent) else {
                            continue;
                        };
                        *count -= 1;

                        if *count > 0 {
                            continue;
                        }

                        if let Some(&culprit) = blocked_by.get(&dependent) {
                            let by = graph.task(culprit).name().to_string();
                            warn!(
                                "Task '{}' not run: '{by}' did not complete",
                                graph.task(dependent).name()
                            );
                            settled.push((
                                dependent,
                                TaskOutcome::Blocked { by },
                                Duration::ZERO,
                            ));
                        } else {
                            ready.push_back(dependent);
                        }
                    }
                }
            }

            drop(job_tx);
        });

        Ok(report)
    }
}

fn run_task(task: &Task) -> TaskOutcome {
    if !task.should_run() {
        debug!("> Task :{} SKIPPED", task.name());
        return TaskOutcome::Skipped;
    }

    info!("> Task :{}", task.name());

    match catch_unwind(AssertUnwindSafe(|| task.execute())) {
        Ok(Ok(())) => TaskOutcome::Succeeded,
        Ok(Err(error)) => TaskOutcome::Failed(error.to_string()),
        Err(_) => TaskOutcome::Failed("task panicked".to_string()),
    }
}
