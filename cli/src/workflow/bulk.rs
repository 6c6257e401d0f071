//! Bulk orchestration across many projects.
//!
//! Replays the branch workflow once per project, strictly sequentially —
//! every run mutates the same on-disk checkout, so two runs must never
//! overlap. One project failing is recorded and does not stop the rest.

use async_trait::async_trait;
use tracing::{error, info};

use crate::flags::request::FeatureFlagRequest;
use crate::workflow::branch::{BranchWorkflow, ChangeSet};
use crate::workflow::error::WorkflowError;

/// One full single-project run, driven by the bulk loop.
///
/// [`BranchWorkflow`] is the production implementation; tests substitute
/// their own.
#[async_trait]
pub trait ProjectRunner: Send {
    /// Runs the workflow for one project's request.
    ///
    /// # Errors
    ///
    /// Returns the workflow failure for this project; the bulk loop catches
    /// it at the project boundary.
    async fn run_project(&mut self, request: FeatureFlagRequest)
        -> Result<ChangeSet, WorkflowError>;
}

#[async_trait]
impl ProjectRunner for BranchWorkflow<'_> {
    async fn run_project(
        &mut self,
        request: FeatureFlagRequest,
    ) -> Result<ChangeSet, WorkflowError> {
        self.run(&request).await
    }
}

/// What happened to one project during a bulk run.
#[derive(Debug)]
pub enum ProjectOutcome {
    /// The workflow completed and opened a pull request.
    Completed(ChangeSet),

    /// Every environment file was already in the desired state.
    NoChangeNeeded,

    /// The workflow failed; message retained for the summary.
    Failed(String),
}

/// Per-project result of a bulk run.
#[derive(Debug)]
pub struct ProjectResult {
    /// The project name.
    pub project: String,

    /// What happened.
    pub outcome: ProjectOutcome,
}

/// Aggregated results of a bulk run, in input order.
#[derive(Debug, Default)]
pub struct BulkSummary {
    /// One entry per project.
    pub results: Vec<ProjectResult>,
}

impl BulkSummary {
    /// Projects that completed with a pull request.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, ProjectOutcome::Completed(_)))
    }

    /// Projects that needed no change.
    #[must_use]
    pub fn no_ops(&self) -> usize {
        self.count(|o| matches!(o, ProjectOutcome::NoChangeNeeded))
    }

    /// Projects that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ProjectOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ProjectOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs the workflow for every project, one at a time.
///
/// Each project gets a request derived from `template` with the project name
/// swapped in. Failures are caught at the project boundary; the loop always
/// visits every project.
pub async fn run(
    template: &FeatureFlagRequest,
    projects: &[String],
    runner: &mut dyn ProjectRunner,
) -> BulkSummary {
    let mut summary = BulkSummary::default();

    for project in projects {
        info!(project = %project, flag = template.flag(), "starting project rollout");
        let request = template.for_project(project.clone());

        let outcome = match runner.run_project(request).await {
            Ok(changeset) => {
                info!(
                    project = %project,
                    pull_request = %changeset.pull_request.html_url,
                    "project completed"
                );
                ProjectOutcome::Completed(changeset)
            }
            Err(e) if e.is_no_change_needed() => {
                info!(project = %project, "no change needed");
                ProjectOutcome::NoChangeNeeded
            }
            Err(e) => {
                error!(project = %project, error = %e, "project failed; continuing with the rest");
                ProjectOutcome::Failed(e.to_string())
            }
        };

        summary.results.push(ProjectResult {
            project: project.clone(),
            outcome,
        });
    }

    summary
}
