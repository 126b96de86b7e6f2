pub mod cli;
pub mod config;
pub mod errors;
pub mod git;
pub mod hooks;
pub mod logging;
pub mod platform;
pub mod tasks;
pub mod utils;
