//! Hook Installation
//!
//! The two steps behind `installGitHooks`: copying the scripts, then making
//! them executable.

pub mod copy;
pub mod permissions;
pub mod runner;

pub use copy::{CopyReport, HookFile, copy_hooks};
pub use permissions::make_hooks_executable;
pub use runner::{CommandOutcome, CommandRunner, SystemRunner};
