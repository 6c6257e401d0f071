//! Git-specific error types.

use thiserror::Error;

/// Errors specific to git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Not in a git repository.
    #[error("Not a git repository. Pass --repo or run flagctl from inside the deployment repository.")]
    NotARepository,

    /// Branch not found.
    #[error("Branch '{0}' not found.")]
    BranchNotFound(String),

    /// Remote not found or has no URL.
    #[error("Remote '{0}' not found. Configure repo.push_remote or pass --remote.")]
    RemoteNotFound(String),

    /// Conflict during checkout, merge, or stash pop.
    #[error("Git operation failed due to conflicts: {0}")]
    Conflict(String),

    /// A git subprocess (fetch, pull, push) exited non-zero.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// General git2 library error.
    #[error("Git error: {0}")]
    Git2(String),

    /// Failed to determine repository state.
    #[error("Failed to get repository status: {0}")]
    StatusFailed(String),
}

impl GitError {
    /// Checks if this error is due to conflicts.
    #[allow(dead_code)] // Kept for future conflict-specific recovery hints
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type alias for git operations.
pub type Result<T> = std::result::Result<T, GitError>;
