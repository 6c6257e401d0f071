//! Single-project branch workflow.
//!
//! Runs the full change for one [`FeatureFlagRequest`] against the shared
//! deployment checkout:
//!
//! ```text
//! capture -> sync base -> topic branch -> mutate -> commit -> push -> PR -> restore
//! ```
//!
//! Every exit after capture, successful or not, goes through
//! [`WorkspaceGuard::restore`]; a restoration failure is logged as a warning
//! and never replaces the workflow's own outcome.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::flags::mutator::{self, MutationOutcome};
use crate::flags::request::{EnvironmentTarget, FeatureFlagRequest};
use crate::git::{GitOperations, SwitchOptions, WorkspaceGuard};
use crate::hosting::{HostingClient, NewPullRequest, PullRequest, RepoSlug};
use crate::workflow::error::WorkflowError;

/// Everything one successful workflow run produced.
#[derive(Debug)]
pub struct ChangeSet {
    /// The topic branch that was pushed.
    pub branch: String,

    /// SHA of the flag change commit.
    pub commit_sha: String,

    /// Per-environment mutation outcomes.
    pub outcomes: Vec<(EnvironmentTarget, MutationOutcome)>,

    /// The pull request opened for the change.
    pub pull_request: PullRequest,
}

impl ChangeSet {
    /// Number of environment files actually changed.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_applied()).count()
    }
}

/// Orchestrates one flag change from workspace capture to pull request.
pub struct BranchWorkflow<'a> {
    git: &'a mut dyn GitOperations,
    hosting: &'a dyn HostingClient,
    repo_root: PathBuf,
    base_branch: String,
    push_remote: String,
}

impl<'a> BranchWorkflow<'a> {
    /// Creates a workflow bound to one checkout and its remotes.
    pub fn new(
        git: &'a mut dyn GitOperations,
        hosting: &'a dyn HostingClient,
        repo_root: impl Into<PathBuf>,
        base_branch: impl Into<String>,
        push_remote: impl Into<String>,
    ) -> Self {
        Self {
            git,
            hosting,
            repo_root: repo_root.into(),
            base_branch: base_branch.into(),
            push_remote: push_remote.into(),
        }
    }

    /// Runs the workflow for one request.
    ///
    /// The original workspace state (branch, uncommitted changes) is restored
    /// before this returns, on success and failure alike.
    ///
    /// # Errors
    ///
    /// Returns a [`WorkflowError`] naming the failed step.
    /// [`WorkflowError::NoChangeNeeded`] is soft: every target was already in
    /// the desired state and no commit/push/PR was produced.
    pub async fn run(&mut self, request: &FeatureFlagRequest) -> Result<ChangeSet, WorkflowError> {
        let guard = WorkspaceGuard::capture(self.git).map_err(WorkflowError::Capture)?;

        let result = self.execute(request).await;

        if let Err(e) = guard.restore(self.git) {
            // The workflow's own outcome wins; restoration trouble is a warning.
            warn!(error = %e, "failed to restore original workspace state");
        }

        result
    }

    async fn execute(&mut self, request: &FeatureFlagRequest) -> Result<ChangeSet, WorkflowError> {
        self.sync_base()?;

        let branch = request.branch_name();
        self.git
            .switch_branch(
                &branch,
                SwitchOptions {
                    create: true,
                    force: false,
                },
            )
            .map_err(|source| WorkflowError::Branch {
                branch: branch.clone(),
                source,
            })?;
        info!(branch = %branch, "created topic branch");

        let outcomes = self.apply_mutations(request)?;
        let applied = outcomes.iter().filter(|(_, o)| o.is_applied()).count();
        if applied == 0 {
            info!(
                flag = request.flag(),
                project = request.project(),
                "all environment files already in the desired state"
            );
            return Err(WorkflowError::NoChangeNeeded);
        }

        let message = request.summary();
        let commit_sha = self
            .git
            .stage_all_and_commit(&message)
            .map_err(WorkflowError::Commit)?;
        info!(commit = %commit_sha, "committed flag change");

        // Resolve the hosting coordinates before pushing: a remote we cannot
        // open a PR against should fail before the branch leaves the machine.
        let remote_url = self
            .git
            .remote_url(&self.push_remote)
            .map_err(|source| WorkflowError::Push {
                branch: branch.clone(),
                remote: self.push_remote.clone(),
                source,
            })?;
        let slug = RepoSlug::from_remote_url(&remote_url)?;

        self.git
            .push(&self.push_remote, &branch)
            .map_err(|source| WorkflowError::Push {
                branch: branch.clone(),
                remote: self.push_remote.clone(),
                source,
            })?;
        info!(branch = %branch, remote = %self.push_remote, "pushed topic branch");

        let pull_request = self
            .hosting
            .create_pull_request(
                &slug,
                &NewPullRequest {
                    title: message,
                    body: self.pull_request_body(request, &outcomes),
                    head: branch.clone(),
                    base: self.base_branch.clone(),
                },
            )
            .await?;
        info!(url = %pull_request.html_url, "opened pull request");

        Ok(ChangeSet {
            branch,
            commit_sha,
            outcomes,
            pull_request,
        })
    }

    /// Fetch, check out, and fast-forward the base branch.
    fn sync_base(&mut self) -> Result<(), WorkflowError> {
        let base = self.base_branch.clone();
        let remote = self.push_remote.clone();
        let sync_err = |source| WorkflowError::Sync {
            branch: base.clone(),
            source,
        };

        self.git.fetch(&remote).map_err(sync_err)?;
        self.git
            .switch_branch(&base, SwitchOptions::default())
            .map_err(sync_err)?;
        self.git.pull_ff(&remote, &base).map_err(sync_err)?;
        debug!(branch = %base, "base branch synced");

        Ok(())
    }

    /// Applies the mutation to every environment target of the request.
    fn apply_mutations(
        &self,
        request: &FeatureFlagRequest,
    ) -> Result<Vec<(EnvironmentTarget, MutationOutcome)>, WorkflowError> {
        let mut outcomes = Vec::new();

        for target in request.targets(&self.repo_root) {
            let outcome = mutator::apply(&target.config_file, request.flag(), request.operation())
                .map_err(|source| WorkflowError::Mutation {
                    path: target.config_file.clone(),
                    source,
                })?;
            debug!(
                environment = %target.environment,
                outcome = %outcome,
                "mutated environment config"
            );
            outcomes.push((target, outcome));
        }

        Ok(outcomes)
    }

    /// Markdown body for the pull request, listing the touched files.
    fn pull_request_body(
        &self,
        request: &FeatureFlagRequest,
        outcomes: &[(EnvironmentTarget, MutationOutcome)],
    ) -> String {
        let mut body = format!(
            "Automated flag change: `{}` `{}` for `{}` ({}).\n\n",
            request.operation(),
            request.flag(),
            request.project(),
            request.environment_class()
        );

        for (target, outcome) in outcomes {
            body.push_str(&format!(
                "- `{}`: {}\n",
                target.relative_config_file(&self.repo_root).display(),
                outcome
            ));
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{EnvironmentClass, Operation};
    use crate::git::operations::MockGitOperations;
    use crate::git::types::RepoStatus;
    use crate::git::GitError;
    use crate::hosting::client::MockHostingClient;
    use crate::hosting::HostingError;
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::TempDir;

    fn non_prod_request() -> FeatureFlagRequest {
        FeatureFlagRequest::new(Operation::Add, "FEATURE_X", "svc-a", EnvironmentClass::NonProd)
            .unwrap()
    }

    fn clean_status() -> RepoStatus {
        RepoStatus {
            branch: Some("master".to_string()),
            commit_sha: "0".repeat(40),
            staged_count: 0,
            modified_count: 0,
            untracked_count: 0,
        }
    }

    fn dirty_status() -> RepoStatus {
        RepoStatus {
            modified_count: 2,
            ..clean_status()
        }
    }

    /// Git mock for a run that gets at least as far as the topic branch.
    fn git_through_branching() -> MockGitOperations {
        let mut git = MockGitOperations::new();
        git.expect_status().returning(|| Ok(clean_status()));
        git.expect_fetch().with(eq("origin")).returning(|_| Ok(()));
        git.expect_switch_branch()
            .withf(|branch, options| branch == "master" && !options.create)
            .returning(|_, _| Ok(()));
        git.expect_pull_ff()
            .with(eq("origin"), eq("master"))
            .returning(|_, _| Ok(()));
        git.expect_switch_branch()
            .withf(|branch, options| branch.starts_with("add-FEATURE_X-svc-a") && options.create)
            .returning(|_, _| Ok(()));
        // Restore: already back on master, no switch needed.
        git.expect_current_branch()
            .returning(|| Ok(Some("master".to_string())));
        git
    }

    fn hosting_returning(number: u64) -> MockHostingClient {
        let mut hosting = MockHostingClient::new();
        hosting
            .expect_create_pull_request()
            .times(1)
            .returning(move |_, pr| {
                assert_eq!(pr.base, "master");
                Ok(PullRequest {
                    number,
                    html_url: format!("https://github.com/acme/deploy-config/pull/{number}"),
                })
            });
        hosting
    }

    #[tokio::test]
    async fn happy_path_produces_a_changeset() {
        let repo_root = TempDir::new().unwrap();
        let mut git = git_through_branching();
        git.expect_stage_all_and_commit()
            .with(eq("Add feature flag FEATURE_X for svc-a (non-prod)"))
            .times(1)
            .returning(|_| Ok("a".repeat(40)));
        git.expect_remote_url()
            .with(eq("origin"))
            .returning(|_| Ok("git@github.com:acme/deploy-config.git".to_string()));
        git.expect_push()
            .withf(|remote, branch| remote == "origin" && branch.starts_with("add-FEATURE_X"))
            .times(1)
            .returning(|_, _| Ok(()));

        let hosting = hosting_returning(7);

        let mut workflow =
            BranchWorkflow::new(&mut git, &hosting, repo_root.path(), "master", "origin");
        let changeset = workflow.run(&non_prod_request()).await.unwrap();

        assert_eq!(changeset.outcomes.len(), 4);
        assert_eq!(changeset.applied_count(), 4);
        assert_eq!(changeset.pull_request.number, 7);
        assert!(changeset.branch.starts_with("add-FEATURE_X-svc-a-non-prod-"));

        // The files were really written.
        let stage = repo_root.path().join("svc-a/stage/values.yaml");
        assert!(fs::read_to_string(stage).unwrap().contains("FEATURE_X: true"));
    }

    #[tokio::test]
    async fn sync_failure_restores_stashed_changes() {
        let repo_root = TempDir::new().unwrap();
        let mut git = MockGitOperations::new();

        git.expect_status().returning(|| Ok(dirty_status()));
        git.expect_stash().times(1).returning(|_| Ok("stash-oid".to_string()));
        git.expect_fetch().times(1).returning(|_| {
            Err(GitError::CommandFailed {
                command: "git fetch origin".to_string(),
                stderr: "could not resolve host".to_string(),
            })
        });
        // Restoration path: back on master already, pop the stash.
        git.expect_current_branch()
            .returning(|| Ok(Some("master".to_string())));
        git.expect_stash_pop().times(1).returning(|| Ok(()));

        let hosting = MockHostingClient::new();

        let mut workflow =
            BranchWorkflow::new(&mut git, &hosting, repo_root.path(), "master", "origin");
        let err = workflow.run(&non_prod_request()).await.unwrap_err();

        assert!(matches!(err, WorkflowError::Sync { .. }));
    }

    #[tokio::test]
    async fn all_targets_in_desired_state_is_a_soft_failure() {
        let repo_root = TempDir::new().unwrap();
        for env in ["main", "ondemand", "stage", "preprod"] {
            let dir = repo_root.path().join("svc-a").join(env);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("values.yaml"), "FEATURE_X: true\n").unwrap();
        }

        let mut git = git_through_branching();
        git.expect_stage_all_and_commit().times(0);
        git.expect_push().times(0);

        let mut hosting = MockHostingClient::new();
        hosting.expect_create_pull_request().times(0);

        let mut workflow =
            BranchWorkflow::new(&mut git, &hosting, repo_root.path(), "master", "origin");
        let err = workflow.run(&non_prod_request()).await.unwrap_err();

        assert!(err.is_no_change_needed());
    }

    #[tokio::test]
    async fn push_failure_skips_pull_request_and_still_restores() {
        let repo_root = TempDir::new().unwrap();
        let mut git = MockGitOperations::new();

        git.expect_status().returning(|| Ok(dirty_status()));
        git.expect_stash().times(1).returning(|_| Ok("stash-oid".to_string()));
        git.expect_fetch().returning(|_| Ok(()));
        git.expect_switch_branch().returning(|_, _| Ok(()));
        git.expect_pull_ff().returning(|_, _| Ok(()));
        git.expect_stage_all_and_commit().returning(|_| Ok("b".repeat(40)));
        git.expect_remote_url()
            .returning(|_| Ok("https://github.com/acme/deploy-config.git".to_string()));
        git.expect_push().times(1).returning(|_, _| {
            Err(GitError::CommandFailed {
                command: "git push".to_string(),
                stderr: "permission denied".to_string(),
            })
        });
        git.expect_current_branch()
            .returning(|| Ok(Some("master".to_string())));
        git.expect_stash_pop().times(1).returning(|| Ok(()));

        let mut hosting = MockHostingClient::new();
        hosting.expect_create_pull_request().times(0);

        let mut workflow =
            BranchWorkflow::new(&mut git, &hosting, repo_root.path(), "master", "origin");
        let err = workflow.run(&non_prod_request()).await.unwrap_err();

        assert!(matches!(err, WorkflowError::Push { .. }));
    }

    #[tokio::test]
    async fn hosting_failure_surfaces_after_push() {
        let repo_root = TempDir::new().unwrap();
        let mut git = git_through_branching();
        git.expect_stage_all_and_commit().returning(|_| Ok("c".repeat(40)));
        git.expect_remote_url()
            .returning(|_| Ok("git@github.com:acme/deploy-config.git".to_string()));
        git.expect_push().times(1).returning(|_, _| Ok(()));

        let mut hosting = MockHostingClient::new();
        hosting.expect_create_pull_request().times(1).returning(|_, _| {
            Err(HostingError::Api {
                status: 500,
                message: "server error".to_string(),
            })
        });

        let mut workflow =
            BranchWorkflow::new(&mut git, &hosting, repo_root.path(), "master", "origin");
        let err = workflow.run(&non_prod_request()).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Hosting(HostingError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn unparseable_remote_fails_before_pushing() {
        let repo_root = TempDir::new().unwrap();
        let mut git = git_through_branching();
        git.expect_stage_all_and_commit().returning(|_| Ok("d".repeat(40)));
        git.expect_remote_url()
            .returning(|_| Ok("file:///srv/mirrors/deploy-config".to_string()));
        git.expect_push().times(0);

        let mut hosting = MockHostingClient::new();
        hosting.expect_create_pull_request().times(0);

        let mut workflow =
            BranchWorkflow::new(&mut git, &hosting, repo_root.path(), "master", "origin");
        let err = workflow.run(&non_prod_request()).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Hosting(HostingError::InvalidRemote(_))
        ));
    }
}
