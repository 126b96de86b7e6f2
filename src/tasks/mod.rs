//! Task Graph
//!
//! Named tasks, their ordering constraints, and the executor that runs them.

pub mod executor;
pub mod graph;
pub mod lifecycle;

pub use executor::{ExecutionReport, Executor, TaskOutcome, TaskResult};
pub use graph::{Task, TaskGraph};
