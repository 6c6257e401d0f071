//! Bulk command handler for the flagctl CLI.
//!
//! Implements `flagctl bulk`: the same flag change replayed across many
//! projects, one at a time, with a final per-project summary.

use std::path::PathBuf;

use crate::cli::args::{EnvironmentClassArg, OperationArg};
use crate::cli::commands::apply::RunContext;
use crate::error::{FlagctlError, Result};
use crate::flags::FeatureFlagRequest;
use crate::workflow::bulk::{self, ProjectOutcome};
use crate::workflow::BranchWorkflow;

/// Handles the `flagctl bulk` command.
///
/// Projects run strictly sequentially over the shared checkout. A failing
/// project is recorded in the summary and does not stop the remaining ones;
/// the exit code reflects argument validation only.
///
/// # Errors
///
/// Returns an error when the arguments or the environment (repository,
/// token) are invalid. Per-project workflow failures are absorbed into the
/// summary.
pub async fn handle_bulk(
    operation: OperationArg,
    flag: String,
    env: EnvironmentClassArg,
    projects: Vec<String>,
    repo: Option<PathBuf>,
    base: Option<String>,
    remote: Option<String>,
) -> Result<()> {
    let first = projects
        .first()
        .ok_or_else(|| FlagctlError::Validation("at least one project is required".to_string()))?;
    let template = FeatureFlagRequest::new(operation.into(), flag, first.clone(), env.into())?;

    let mut ctx = RunContext::resolve(repo, base, remote)?;

    println!(
        "Rolling out '{} {}' to {} project(s) across {} environments.\n",
        template.operation(),
        template.flag(),
        projects.len(),
        template.environment_class()
    );

    let mut workflow = BranchWorkflow::new(
        &mut ctx.git,
        &ctx.hosting,
        ctx.repo_root.clone(),
        ctx.base_branch.clone(),
        ctx.push_remote.clone(),
    );

    let summary = bulk::run(&template, &projects, &mut workflow).await;

    println!("\nBulk summary:\n");
    for result in &summary.results {
        match &result.outcome {
            ProjectOutcome::Completed(changeset) => {
                println!(
                    "  {}: ok ({})",
                    result.project, changeset.pull_request.html_url
                );
            }
            ProjectOutcome::NoChangeNeeded => {
                println!("  {}: no change needed", result.project);
            }
            ProjectOutcome::Failed(message) => {
                println!("  {}: FAILED - {message}", result.project);
            }
        }
    }

    println!(
        "\n{} succeeded, {} no-op(s), {} failed.",
        summary.succeeded(),
        summary.no_ops(),
        summary.failed()
    );

    Ok(())
}
