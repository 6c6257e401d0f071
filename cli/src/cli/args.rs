//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::flags::{EnvironmentClass, Operation};

/// Feature flag rollout tool.
///
/// Flagctl injects or removes boolean feature flags in the per-environment
/// config files of a deployment repository, then packages each change as a
/// topic branch with a ready-to-review pull request.
#[derive(Parser, Debug)]
#[command(name = "flagctl")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Change a flag for one project and open the review pull request.
    ///
    /// Syncs the base branch, applies the change to every environment of the
    /// selected class, commits, pushes, and opens a pull request. The
    /// workspace (current branch, uncommitted changes) is restored afterwards.
    Apply {
        /// Whether to add or remove the flag.
        #[arg(value_enum)]
        operation: OperationArg,

        /// Flag name (identifier: letters, digits, '_' or '-').
        flag: String,

        /// Project directory in the deployment repository.
        project: String,

        /// Environment class to touch.
        #[arg(short, long, value_enum)]
        env: EnvironmentClassArg,

        /// Deployment repository root (defaults to config, then discovery).
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Base branch to fork from (defaults to config).
        #[arg(long)]
        base: Option<String>,

        /// Remote to push to (defaults to config).
        #[arg(long)]
        remote: Option<String>,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,

        /// Open the created pull request in the browser.
        #[arg(long)]
        open: bool,
    },

    /// Replay a flag change across many projects, one at a time.
    ///
    /// Projects are processed strictly sequentially over the shared checkout.
    /// A failing project is reported and does not stop the rest.
    Bulk {
        /// Whether to add or remove the flag.
        #[arg(value_enum)]
        operation: OperationArg,

        /// Flag name (identifier: letters, digits, '_' or '-').
        flag: String,

        /// Environment class to touch.
        #[arg(value_enum)]
        env: EnvironmentClassArg,

        /// Projects to roll the change out to, in order.
        #[arg(required = true)]
        projects: Vec<String>,

        /// Deployment repository root (defaults to config, then discovery).
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Base branch to fork from (defaults to config).
        #[arg(long)]
        base: Option<String>,

        /// Remote to push to (defaults to config).
        #[arg(long)]
        remote: Option<String>,
    },

    /// Manage the hosting API token.
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Check flagctl installation and diagnose issues.
    ///
    /// Verifies configuration, repository access, and hosting credentials.
    Doctor,

    /// Generate shell completion scripts.
    ///
    /// Outputs completion script for the specified shell.
    /// Follow shell-specific instructions to install.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: ShellType,
    },
}

/// Authentication subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store the hosting API token in the OS keyring.
    SetToken {
        /// The token value. Prompted for when omitted.
        token: Option<String>,
    },

    /// Show whether a hosting token is available and where from.
    Status,

    /// Remove the stored hosting token.
    Clear,
}

/// Operation argument for CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OperationArg {
    Add,
    Remove,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Add => Self::Add,
            OperationArg::Remove => Self::Remove,
        }
    }
}

/// Environment class argument for CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EnvironmentClassArg {
    Prod,
    NonProd,
}

impl From<EnvironmentClassArg> for EnvironmentClass {
    fn from(arg: EnvironmentClassArg) -> Self {
        match arg {
            EnvironmentClassArg::Prod => Self::Prod,
            EnvironmentClassArg::NonProd => Self::NonProd,
        }
    }
}

/// Supported shell types for the completions command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
}
