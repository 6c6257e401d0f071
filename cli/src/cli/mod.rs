//! CLI module for flagctl.

pub mod args;
pub mod commands;

pub use args::{AuthCommands, Cli, Commands, EnvironmentClassArg, OperationArg, ShellType};
