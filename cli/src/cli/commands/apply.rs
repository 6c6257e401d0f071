//! Single-project command handler for the flagctl CLI.
//!
//! Implements `flagctl apply`: prints the plan, asks for confirmation, and
//! drives one [`BranchWorkflow`] run end to end.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::args::{EnvironmentClassArg, OperationArg};
use crate::config::load_config;
use crate::error::Result;
use crate::flags::FeatureFlagRequest;
use crate::git::Git2Operations;
use crate::hosting::{GitHubClient, TokenStore};
use crate::workflow::{BranchWorkflow, ChangeSet};

/// Resolved invocation context shared by the apply and bulk commands.
pub(crate) struct RunContext {
    /// The deployment checkout.
    pub git: Git2Operations,
    /// Repository root on disk.
    pub repo_root: PathBuf,
    /// Base branch to fork from.
    pub base_branch: String,
    /// Remote to push to.
    pub push_remote: String,
    /// Hosting API client with a resolved token.
    pub hosting: GitHubClient,
}

impl RunContext {
    /// Resolves config, CLI overrides, the repository, and the hosting token.
    pub fn resolve(
        repo: Option<PathBuf>,
        base: Option<String>,
        remote: Option<String>,
    ) -> Result<Self> {
        let config = load_config()?;

        let git = match repo.or_else(|| config.repo.path.clone()) {
            Some(path) => Git2Operations::open(path)?,
            None => Git2Operations::discover(std::env::current_dir()?)?,
        };
        let repo_root = git.repo_path().to_path_buf();

        let token = TokenStore::new()?.resolve()?;
        let hosting = GitHubClient::new(&config.hosting, token)?;

        Ok(Self {
            git,
            repo_root,
            base_branch: base.unwrap_or(config.repo.base_branch),
            push_remote: remote.unwrap_or(config.repo.push_remote),
            hosting,
        })
    }
}

/// Handles the `flagctl apply` command.
///
/// # Arguments
///
/// * `operation` - Add or remove
/// * `flag` - The flag name
/// * `project` - The project directory in the deployment repository
/// * `env` - Environment class selector
/// * `repo`/`base`/`remote` - Optional overrides of the configured values
/// * `yes` - Skip the confirmation prompt
/// * `open_pr` - Open the created pull request in the browser
///
/// # Errors
///
/// Returns an error on invalid input or any fatal workflow step.
/// `NoChangeNeeded` is reported as a no-op and succeeds.
#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
pub async fn handle_apply(
    operation: OperationArg,
    flag: String,
    project: String,
    env: EnvironmentClassArg,
    repo: Option<PathBuf>,
    base: Option<String>,
    remote: Option<String>,
    yes: bool,
    open_pr: bool,
) -> Result<()> {
    let request = FeatureFlagRequest::new(operation.into(), flag, project, env.into())?;
    let mut ctx = RunContext::resolve(repo, base, remote)?;

    // Unknown projects warn but do not reject: the change may be
    // bootstrapping the project's first environment directory.
    let project_dir = ctx.repo_root.join(request.project());
    if !project_dir.is_dir() {
        println!(
            "Warning: project directory '{}' not found in {}.",
            request.project(),
            ctx.repo_root.display()
        );
    }

    print_plan(&request, &ctx);

    if !yes && !confirm()? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut workflow = BranchWorkflow::new(
        &mut ctx.git,
        &ctx.hosting,
        ctx.repo_root.clone(),
        ctx.base_branch.clone(),
        ctx.push_remote.clone(),
    );

    match workflow.run(&request).await {
        Ok(changeset) => {
            print_changeset(&changeset, &ctx.repo_root);
            if open_pr {
                if open::that(&changeset.pull_request.html_url).is_err() {
                    println!("Could not open the browser; use the URL above.");
                }
            }
            Ok(())
        }
        Err(e) if e.is_no_change_needed() => {
            println!("Nothing to do: every environment file is already in the desired state.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Prints what the workflow is about to do.
fn print_plan(request: &FeatureFlagRequest, ctx: &RunContext) {
    println!("Planned change:\n");
    println!("  Operation:    {} {}", request.operation(), request.flag());
    println!("  Project:      {}", request.project());
    println!(
        "  Environments: {} ({})",
        request.environment_class().environments().join(", "),
        request.environment_class()
    );
    println!("  Repository:   {}", ctx.repo_root.display());
    println!("  Base branch:  {}", ctx.base_branch);
    println!("  Push remote:  {}", ctx.push_remote);
    println!();
}

/// Asks `Proceed? [y/N]` on stdin.
fn confirm() -> Result<bool> {
    print!("Proceed? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Prints the result of a successful run.
fn print_changeset(changeset: &ChangeSet, repo_root: &std::path::Path) {
    println!("\nDone: {} file(s) changed.\n", changeset.applied_count());
    println!("  Branch: {}", changeset.branch);
    println!("  Commit: {}", &changeset.commit_sha[..7.min(changeset.commit_sha.len())]);

    for (target, outcome) in &changeset.outcomes {
        println!(
            "    {}: {}",
            target.relative_config_file(repo_root).display(),
            outcome
        );
    }

    println!(
        "\n  Pull request #{}: {}",
        changeset.pull_request.number, changeset.pull_request.html_url
    );
}
