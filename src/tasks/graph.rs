//! Task Dependency Graph
//!
//! Named units of work with `depends_on` edges, optional skip predicates and
//! actions. Edges are checked on insertion so the graph is always acyclic.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use crate::errors::{Result, TaskError};

type Action = Box<dyn Fn() -> Result<()> + Send + Sync>;
type Predicate = Box<dyn Fn() -> bool + Send + Sync>;

/// A named unit of work.
pub struct Task {
    name: String,
    description: Option<String>,
    group: Option<String>,
    only_if: Option<Predicate>,
    action: Option<Action>,
}

impl Task {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            group: None,
            only_if: None,
            action: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Skips the task (without failing it) when `predicate` returns false.
    #[must_use]
    pub fn only_if(mut self, predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.only_if = Some(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Fn() -> Result<()> + Send + Sync + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Whether the skip predicate lets the task run.
    #[must_use]
    pub fn should_run(&self) -> bool {
        self.only_if.as_ref().is_none_or(|predicate| predicate())
    }

    /// Runs the action, if any.
    ///
    /// # Errors
    /// * Whatever the action returns
    pub fn execute(&self) -> Result<()> {
        self.action.as_ref().map_or(Ok(()), |action| action())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("group", &self.group)
            .field("only_if", &self.only_if.is_some())
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// Directed acyclic graph of tasks, in registration order.
#[derive(Debug, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    dependencies: Vec<Vec<usize>>,
}

impl TaskGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the graph.
    ///
    /// # Errors
    /// * `TaskError::Duplicate` if a task with the same name exists
    pub fn register(&mut self, task: Task) -> Result<()> {
        if self.index.contains_key(task.name()) {
            return Err(TaskError::Duplicate {
                name: task.name().to_string(),
            }
            .into());
        }

        self.index.insert(task.name().to_string(), self.tasks.len());
        self.tasks.push(task);
        self.dependencies.push(Vec::new());

        Ok(())
    }

    /// Declares that `task` must run after `dependency`.
    ///
    /// Adding an edge twice is a no-op.
    ///
    /// # Errors
    /// * `TaskError::Unknown` if either task is not registered
    /// * `TaskError::Cycle` if the edge would close a cycle
    pub fn depends_on(&mut self, task: &str, dependency: &str) -> Result<()> {
        let task_id = self.id(task)?;
        let dependency_id = self.id(dependency)?;

        if self.dependencies[task_id].contains(&dependency_id) {
            return Ok(());
        }

        if self.reaches(dependency_id, task_id) {
            return Err(TaskError::Cycle {
                task: task.to_string(),
                dependency: dependency.to_string(),
            }
            .into());
        }

        self.dependencies[task_id].push(dependency_id);

        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Direct dependencies of `name`, in declaration order.
    ///
    /// # Errors
    /// * `TaskError::Unknown` if the task is not registered
    pub fn dependencies_of(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.id(name)?;
        Ok(self.dependencies[id]
            .iter()
            .map(|&dep| self.tasks[dep].name())
            .collect())
    }

    /// Everything needed to run `targets`, dependencies first.
    ///
    /// Each task appears once. Ties are broken by registration order, so the
    /// plan is stable across runs.
    ///
    /// # Errors
    /// * `TaskError::Unknown` if a target is not registered
    pub fn execution_plan(&self, targets: &[&str]) -> Result<Vec<&str>> {
        Ok(self
            .plan_ids(targets)?
            .into_iter()
            .map(|id| self.tasks[id].name())
            .collect())
    }

    pub(crate) fn plan_ids(&self, targets: &[&str]) -> Result<Vec<usize>> {
        let mut selected = HashSet::new();
        let mut stack = targets
            .iter()
            .map(|name| self.id(name))
            .collect::<Result<Vec<_>>>()?;

        while let Some(id) = stack.pop() {
            if selected.insert(id) {
                stack.extend(&self.dependencies[id]);
            }
        }

        // Kahn's algorithm restricted to the selected tasks.
        let mut remaining: Vec<usize> = (0..self.tasks.len())
            .filter(|id| selected.contains(id))
            .collect();
        let mut placed = HashSet::new();
        let mut plan = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let position = remaining
                .iter()
                .position(|&id| self.dependencies[id].iter().all(|dep| placed.contains(dep)))
                .ok_or_else(|| TaskError::Failed {
                    task: self.tasks[remaining[0]].name().to_string(),
                    reason: "dependency cycle".to_string(),
                })?;

            let id = remaining.remove(position);
            placed.insert(id);
            plan.push(id);
        }

        Ok(plan)
    }

    pub(crate) fn task(&self, id: usize) -> &Task {
        &self.tasks[id]
    }

    pub(crate) fn dependency_ids(&self, id: usize) -> &[usize] {
        &self.dependencies[id]
    }

    fn id(&self, name: &str) -> Result<usize> {
        self.index.get(name).copied().ok_or_else(|| {
            TaskError::Unknown {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Whether `to` is reachable from `from` along dependency edges.
    fn reaches(&self, from: usize, to: usize) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if seen.insert(id) {
                stack.extend(&self.dependencies[id]);
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HookupError;

    fn graph(names: &[&str]) -> TaskGraph {
        let mut graph = TaskGraph::new();
        for name in names {
            graph.register(Task::new(*name)).unwrap();
        }
        graph
    }

    #[test]
    fn test_duplicate_task() {
        let mut graph = graph(&["build"]);
        assert!(matches!(
            graph.register(Task::new("build")),
            Err(HookupError::Task(TaskError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_unknown_dependency() {
        let mut graph = graph(&["build"]);
        assert!(matches!(
            graph.depends_on("build", "installGitHooks"),
            Err(HookupError::Task(TaskError::Unknown { name })) if name == "installGitHooks"
        ));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut graph = graph(&["a", "b", "c"]);
        graph.depends_on("b", "a").unwrap();
        graph.depends_on("c", "b").unwrap();

        assert!(matches!(
            graph.depends_on("a", "c"),
            Err(HookupError::Task(TaskError::Cycle { .. }))
        ));
        assert!(matches!(
            graph.depends_on("a", "a"),
            Err(HookupError::Task(TaskError::Cycle { .. }))
        ));
        assert!(graph.dependencies_of("a").unwrap().is_empty());
    }

    #[test]
    fn test_plan_puts_dependencies_first() {
        let mut graph = graph(&["build", "installGitHooks", "copyGitHooks", "clean"]);
        graph.depends_on("installGitHooks", "copyGitHooks").unwrap();
        graph.depends_on("build", "installGitHooks").unwrap();
        graph.depends_on("clean", "installGitHooks").unwrap();

        assert_eq!(
            graph.execution_plan(&["build"]).unwrap(),
            vec!["copyGitHooks", "installGitHooks", "build"]
        );
        assert_eq!(
            graph.execution_plan(&["clean", "build"]).unwrap(),
            vec!["copyGitHooks", "installGitHooks", "build", "clean"]
        );
    }

    #[test]
    fn test_plan_of_unknown_target() {
        let graph = graph(&["build"]);
        assert!(graph.execution_plan(&["deploy"]).is_err());
    }

    #[test]
    fn test_duplicate_edge_is_ignored() {
        let mut graph = graph(&["a", "b"]);
        graph.depends_on("b", "a").unwrap();
        graph.depends_on("b", "a").unwrap();
        assert_eq!(graph.dependencies_of("b").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_only_if_and_action() {
        let task = Task::new("skip-me").only_if(|| false).action(|| Ok(()));
        assert!(!task.should_run());
        assert!(task.execute().is_ok());

        let plain = Task::new("plain");
        assert!(plain.should_run());
        assert!(plain.execute().is_ok());
    }
}
