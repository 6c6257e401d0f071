//! Git-related types for flagctl.
//!
//! This module defines data structures for git operations:
//! - [`RepoStatus`] - Current repository state (branch, changes)
//! - [`WorkspaceSnapshot`] - Pre-mutation state restored after a workflow run
//! - [`StashOptions`] / [`SwitchOptions`] - Operation options

use serde::{Deserialize, Serialize};

/// Status of a git repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// Current branch name; `None` on a detached HEAD.
    pub branch: Option<String>,

    /// Current commit SHA.
    pub commit_sha: String,

    /// Number of staged files.
    pub staged_count: usize,

    /// Number of modified (unstaged) files.
    pub modified_count: usize,

    /// Number of untracked files.
    pub untracked_count: usize,
}

impl RepoStatus {
    /// Returns true if there are any changes (staged, modified, or untracked).
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.staged_count > 0 || self.modified_count > 0 || self.untracked_count > 0
    }

    /// Returns the total count of changed files.
    #[allow(dead_code)] // Kept for status reporting parity with has_changes
    #[must_use]
    pub const fn total_changes(&self) -> usize {
        self.staged_count + self.modified_count + self.untracked_count
    }
}

/// Workspace state captured before a mutation attempt.
///
/// Consumed exactly once by [`crate::git::WorkspaceGuard::restore`]; never
/// persisted beyond one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    /// Branch checked out before the run; `None` on a detached HEAD.
    pub original_branch: Option<String>,

    /// Message of the stash holding pre-run uncommitted changes, if any.
    pub stash_name: Option<String>,
}

impl WorkspaceSnapshot {
    /// Whether uncommitted changes were stashed at capture time.
    #[must_use]
    pub const fn has_stash(&self) -> bool {
        self.stash_name.is_some()
    }
}

/// Options for stashing changes.
#[derive(Debug, Clone, Default)]
pub struct StashOptions {
    /// Message for the stash.
    pub message: Option<String>,

    /// Include untracked files in stash.
    pub include_untracked: bool,
}

/// Options for switching branches.
#[derive(Debug, Clone, Default)]
pub struct SwitchOptions {
    /// Create the branch if it doesn't exist.
    pub create: bool,

    /// Force switch (discard local changes).
    pub force: bool,
}
