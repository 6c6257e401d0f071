//! Flagctl - Feature Flag Rollout Tool
//!
//! Flagctl injects or removes boolean feature flags in the per-environment
//! config files of a deployment repository and packages every change as a
//! topic branch with a ready-to-review pull request, restoring the operator's
//! workspace afterwards.

mod cli;
mod config;
mod error;
mod flags;
mod git;
mod hosting;
mod workflow;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AuthCommands, Cli, Commands};
use crate::config::settings::env::LOG_LEVEL;
use crate::error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_LEVEL).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run the command
    if let Err(e) = run(cli).await {
        // "Already in the desired state" reports as a no-op, not a failure.
        if e.is_no_op() {
            println!("{e}");
            return;
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Apply {
            operation,
            flag,
            project,
            env,
            repo,
            base,
            remote,
            yes,
            open,
        } => {
            cli::commands::handle_apply(
                operation, flag, project, env, repo, base, remote, yes, open,
            )
            .await
        }
        Commands::Bulk {
            operation,
            flag,
            env,
            projects,
            repo,
            base,
            remote,
        } => cli::commands::handle_bulk(operation, flag, env, projects, repo, base, remote).await,
        Commands::Auth { command } => match command {
            AuthCommands::SetToken { token } => cli::commands::handle_set_token(token),
            AuthCommands::Status => cli::commands::handle_status(),
            AuthCommands::Clear => cli::commands::handle_clear(),
        },
        Commands::Doctor => cli::commands::handle_doctor(),
        Commands::Completions { shell } => cli::commands::handle_completions(shell),
    }
}
