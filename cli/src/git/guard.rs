//! Workspace snapshot/restore guard.
//!
//! The deployment checkout is shared, stateful, and frequently dirty: an
//! operator may have a branch checked out and uncommitted edits in flight
//! when a flag rollout runs. [`WorkspaceGuard`] captures that state before
//! the workflow touches anything and puts it back afterwards, on success and
//! failure alike.
//!
//! Restore is consume-once: the guard is moved into [`WorkspaceGuard::restore`],
//! so a snapshot cannot be replayed twice.

use tracing::{debug, warn};

use crate::git::error::Result;
use crate::git::operations::GitOperations;
use crate::git::types::{StashOptions, SwitchOptions, WorkspaceSnapshot};

/// Scoped capture of the pre-mutation workspace state.
#[derive(Debug)]
pub struct WorkspaceGuard {
    snapshot: WorkspaceSnapshot,
}

impl WorkspaceGuard {
    /// Captures the current branch and stashes any uncommitted changes
    /// (including untracked files) under a `flagctl:`-prefixed message.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository status cannot be read or the stash
    /// fails; nothing has been mutated in that case.
    pub fn capture(git: &mut dyn GitOperations) -> Result<Self> {
        let status = git.status()?;

        let stash_name = if status.has_changes() {
            let message = format!(
                "flagctl: pre-flight {}",
                chrono::Utc::now().timestamp_millis()
            );
            git.stash(StashOptions {
                message: Some(message.clone()),
                include_untracked: true,
            })?;
            Some(message)
        } else {
            None
        };

        let snapshot = WorkspaceSnapshot {
            original_branch: status.branch,
            stash_name,
        };
        debug!(
            branch = snapshot.original_branch.as_deref().unwrap_or("<detached>"),
            stashed = snapshot.has_stash(),
            "captured workspace state"
        );

        Ok(Self { snapshot })
    }

    /// The captured state.
    #[allow(dead_code)] // Exercised by tests; kept for workflow introspection
    #[must_use]
    pub const fn snapshot(&self) -> &WorkspaceSnapshot {
        &self.snapshot
    }

    /// Restores the captured state: checks out the original branch, then pops
    /// the pre-flight stash if one was recorded.
    ///
    /// A failed checkout does not abort restoration — the stash pop is still
    /// attempted so stashed work is never orphaned silently. The first
    /// failure is returned; callers report it as a warning rather than
    /// letting it mask the workflow's own error.
    ///
    /// # Errors
    ///
    /// Returns the first restoration failure (checkout or stash pop).
    pub fn restore(self, git: &mut dyn GitOperations) -> Result<()> {
        let mut first_failure = None;

        if let Some(branch) = &self.snapshot.original_branch {
            let already_there = matches!(
                git.current_branch(),
                Ok(Some(ref current)) if current == branch
            );

            if !already_there {
                if let Err(e) = git.switch_branch(branch, SwitchOptions::default()) {
                    warn!(branch = %branch, error = %e, "could not check out original branch");
                    first_failure = Some(e);
                }
            }
        }

        if self.snapshot.has_stash() {
            if let Err(e) = git.stash_pop() {
                warn!(error = %e, "could not pop pre-flight stash");
                first_failure.get_or_insert(e);
            }
        }

        match first_failure {
            None => {
                debug!("workspace state restored");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::error::GitError;
    use crate::git::operations::{Git2Operations, MockGitOperations};
    use crate::git::types::RepoStatus;
    use git2::{Repository, Signature};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::TempDir;

    fn init_test_repo() -> (TempDir, Git2Operations) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        {
            let sig = Signature::now("Test", "test@test.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .unwrap();
        }

        let ops = Git2Operations::open(temp_dir.path()).unwrap();
        (temp_dir, ops)
    }

    #[test]
    fn capture_clean_repo_records_no_stash() {
        let (_temp_dir, mut ops) = init_test_repo();

        let guard = WorkspaceGuard::capture(&mut ops).unwrap();

        assert!(!guard.snapshot().has_stash());
        assert!(guard.snapshot().original_branch.is_some());
    }

    #[test]
    fn capture_dirty_repo_stashes_changes() {
        let (temp_dir, mut ops) = init_test_repo();
        fs::write(temp_dir.path().join("wip.txt"), "work in progress").unwrap();

        let guard = WorkspaceGuard::capture(&mut ops).unwrap();

        assert!(guard.snapshot().has_stash());
        assert!(!ops.status().unwrap().has_changes());
    }

    #[test]
    fn restore_returns_to_original_branch_and_pops_stash() {
        let (temp_dir, mut ops) = init_test_repo();
        let original = ops.current_branch().unwrap().unwrap();
        fs::write(temp_dir.path().join("wip.txt"), "work in progress").unwrap();

        let guard = WorkspaceGuard::capture(&mut ops).unwrap();

        // Simulate the workflow wandering off to a topic branch.
        ops.switch_branch(
            "add-flag-svc-a-prod-1",
            SwitchOptions {
                create: true,
                force: false,
            },
        )
        .unwrap();

        guard.restore(&mut ops).unwrap();

        assert_eq!(ops.current_branch().unwrap().unwrap(), original);
        assert!(temp_dir.path().join("wip.txt").exists());
    }

    #[test]
    fn restore_on_original_branch_is_a_noop_switch() {
        let (_temp_dir, mut ops) = init_test_repo();

        let guard = WorkspaceGuard::capture(&mut ops).unwrap();
        guard.restore(&mut ops).unwrap();

        assert!(!ops.status().unwrap().has_changes());
    }

    #[test]
    fn failed_checkout_still_attempts_stash_pop() {
        let mut git = MockGitOperations::new();

        git.expect_current_branch()
            .returning(|| Ok(Some("add-flag-svc-a-prod-2".to_string())));
        git.expect_switch_branch()
            .with(eq("master"), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Err(GitError::Conflict("local changes".to_string())));
        git.expect_stash_pop().times(1).returning(|| Ok(()));

        let guard = WorkspaceGuard {
            snapshot: WorkspaceSnapshot {
                original_branch: Some("master".to_string()),
                stash_name: Some("flagctl: pre-flight 0".to_string()),
            },
        };

        let result = guard.restore(&mut git);
        assert!(matches!(result, Err(GitError::Conflict(_))));
    }

    #[test]
    fn detached_head_restore_only_pops_stash() {
        let mut git = MockGitOperations::new();

        git.expect_switch_branch().times(0);
        git.expect_stash_pop().times(1).returning(|| Ok(()));

        let guard = WorkspaceGuard {
            snapshot: WorkspaceSnapshot {
                original_branch: None,
                stash_name: Some("flagctl: pre-flight 0".to_string()),
            },
        };

        guard.restore(&mut git).unwrap();
    }

    #[test]
    fn capture_failure_leaves_nothing_behind() {
        let mut git = MockGitOperations::new();

        git.expect_status()
            .returning(|| Err(GitError::StatusFailed("index locked".to_string())));
        git.expect_stash().times(0);

        assert!(WorkspaceGuard::capture(&mut git).is_err());
    }

    #[test]
    fn dirty_status_without_stash_support_propagates_error() {
        let mut git = MockGitOperations::new();

        git.expect_status().returning(|| {
            Ok(RepoStatus {
                branch: Some("master".to_string()),
                commit_sha: "abc".to_string(),
                staged_count: 0,
                modified_count: 1,
                untracked_count: 0,
            })
        });
        git.expect_stash()
            .returning(|_| Err(GitError::Git2("stash failed".to_string())));

        assert!(WorkspaceGuard::capture(&mut git).is_err());
    }
}
