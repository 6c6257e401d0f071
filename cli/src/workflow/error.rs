//! Workflow-specific error types.
//!
//! Each variant maps to one step of the branch workflow, so failures carry
//! where in the sequence they happened and what (if anything) was left
//! behind for manual recovery.

use std::path::PathBuf;

use thiserror::Error;

use crate::flags::FlagError;
use crate::git::GitError;
use crate::hosting::HostingError;

/// Errors raised while running the branch workflow.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Capturing the pre-run workspace state failed; nothing was mutated.
    #[error("Failed to capture workspace state: {0}")]
    Capture(#[source] GitError),

    /// Fetch / checkout / pull of the base branch failed.
    #[error("Failed to sync base branch '{branch}': {source}")]
    Sync {
        /// The base branch being synced.
        branch: String,
        /// Underlying git failure.
        source: GitError,
    },

    /// Creating or checking out the topic branch failed.
    #[error("Failed to create topic branch '{branch}': {source}")]
    Branch {
        /// The topic branch name.
        branch: String,
        /// Underlying git failure.
        source: GitError,
    },

    /// A config file edit failed.
    #[error("Failed to update '{path}': {source}")]
    Mutation {
        /// The config file being edited.
        path: PathBuf,
        /// Underlying mutation failure.
        source: FlagError,
    },

    /// Every target is already in the desired state. Soft failure: no
    /// commit, push, or pull request is produced.
    #[error("Every environment file is already in the desired state; nothing to do.")]
    NoChangeNeeded,

    /// Staging or committing the flag change failed.
    #[error("Failed to commit flag change: {0}")]
    Commit(#[source] GitError),

    /// Pushing the topic branch failed. The local commit stays in place.
    #[error("Failed to push branch '{branch}' to '{remote}': {source}")]
    Push {
        /// The topic branch.
        branch: String,
        /// The push remote.
        remote: String,
        /// Underlying git failure.
        source: GitError,
    },

    /// Opening the pull request failed. The pushed branch stays in place so
    /// the operator can retry PR creation manually.
    #[error(transparent)]
    Hosting(#[from] HostingError),
}

impl WorkflowError {
    /// Whether this is the soft "already in the desired state" outcome.
    #[must_use]
    pub const fn is_no_change_needed(&self) -> bool {
        matches!(self, Self::NoChangeNeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_change_needed_is_classified_as_soft() {
        assert!(WorkflowError::NoChangeNeeded.is_no_change_needed());
        assert!(!WorkflowError::Capture(GitError::NotARepository).is_no_change_needed());
    }

    #[test]
    fn push_error_names_branch_and_remote() {
        let err = WorkflowError::Push {
            branch: "add-FEATURE_X-svc-a-prod-17".to_string(),
            remote: "origin".to_string(),
            source: GitError::CommandFailed {
                command: "git push".to_string(),
                stderr: "denied".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("add-FEATURE_X-svc-a-prod-17"));
        assert!(msg.contains("origin"));
    }
}
