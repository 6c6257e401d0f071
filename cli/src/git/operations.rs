//! Git operations abstraction for flagctl.
//!
//! This module provides a trait-based abstraction over git operations:
//! - [`GitOperations`] - Trait defining the operations the workflow needs
//! - [`Git2Operations`] - Implementation backed by git2 (libgit2) for local
//!   state and the system `git` CLI for network transports, so the
//!   operator's existing credential helpers apply to fetch/pull/push.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Repository, Signature, StashFlags, StatusOptions};

use crate::git::error::{GitError, Result};
use crate::git::types::{RepoStatus, StashOptions, SwitchOptions};

/// Trait for git operations (enables mocking in tests).
#[cfg_attr(test, mockall::automock)]
pub trait GitOperations: Send {
    /// Gets the current branch name, or `None` on a detached HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if not in a git repository or HEAD is invalid.
    fn current_branch(&self) -> Result<Option<String>>;

    /// Gets the repository status.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be determined.
    fn status(&self) -> Result<RepoStatus>;

    /// Stashes changes with the given options. Returns the stash OID.
    ///
    /// # Errors
    ///
    /// Returns an error if the stash operation fails.
    fn stash(&mut self, options: StashOptions) -> Result<String>;

    /// Pops the most recent stash.
    ///
    /// # Errors
    ///
    /// Returns an error if the pop fails or there are conflicts.
    fn stash_pop(&mut self) -> Result<()>;

    /// Switches to a branch, optionally creating it from HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if the branch doesn't exist (and `create` is false)
    /// or if the checkout conflicts with local changes.
    fn switch_branch(&mut self, branch: &str, options: SwitchOptions) -> Result<()>;

    /// Stages every change in the working tree and commits it.
    ///
    /// Returns the new commit SHA.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails.
    fn stage_all_and_commit(&mut self, message: &str) -> Result<String>;

    /// Gets the configured URL of a remote.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RemoteNotFound`] if the remote is missing.
    fn remote_url(&self, remote: &str) -> Result<String>;

    /// Fetches from a remote.
    ///
    /// # Errors
    ///
    /// Returns an error on network or authentication failure.
    fn fetch(&mut self, remote: &str) -> Result<()>;

    /// Fast-forwards the current branch from `remote/branch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull fails or cannot fast-forward.
    fn pull_ff(&mut self, remote: &str, branch: &str) -> Result<()>;

    /// Pushes a branch to a remote.
    ///
    /// # Errors
    ///
    /// Returns an error on network or authentication failure.
    fn push(&mut self, remote: &str, branch: &str) -> Result<()>;
}

/// Git operations implementation over a repository checkout on disk.
pub struct Git2Operations {
    repo_path: PathBuf,
}

impl Git2Operations {
    /// Opens a repository at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a git repository.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Repository::open(path.as_ref()).map_err(|_| GitError::NotARepository)?;

        Ok(Self {
            repo_path: path.as_ref().to_path_buf(),
        })
    }

    /// Discovers the repository containing `start` by walking up.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is not inside a git repository.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let repo = Repository::discover(start.as_ref()).map_err(|_| GitError::NotARepository)?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::Git2("Bare repository not supported".to_string()))?;

        Ok(Self {
            repo_path: workdir.to_path_buf(),
        })
    }

    /// Root of the working tree.
    #[must_use]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Opens the repository (internal helper).
    fn repo(&self) -> Result<Repository> {
        Repository::open(&self.repo_path).map_err(|e| GitError::Git2(e.to_string()))
    }

    /// Signature for stash and commit operations, with a fallback identity
    /// when the repository has none configured.
    fn signature(&self) -> Result<Signature<'static>> {
        let repo = self.repo()?;
        repo.signature()
            .or_else(|_| Signature::now("flagctl", "flagctl@localhost"))
            .map_err(|e| GitError::Git2(format!("Cannot create signature: {e}")))
    }

    /// Runs a git subprocess against this checkout and maps failure to
    /// [`GitError::CommandFailed`].
    fn run_git(&self, args: &[&str]) -> Result<()> {
        let command = format!("git {}", args.join(" "));

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: command.clone(),
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(GitError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl GitOperations for Git2Operations {
    fn current_branch(&self) -> Result<Option<String>> {
        let repo = self.repo()?;
        let head = repo
            .head()
            .map_err(|e| GitError::Git2(format!("Cannot get HEAD: {e}")))?;

        if head.is_branch() {
            head.shorthand()
                .map(String::from)
                .map(Some)
                .ok_or_else(|| GitError::Git2("Invalid branch name".to_string()))
        } else {
            Ok(None)
        }
    }

    fn status(&self) -> Result<RepoStatus> {
        let repo = self.repo()?;

        let branch = self.current_branch()?;
        let commit_sha = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id().to_string())
            .map_err(|e| GitError::Git2(format!("Cannot get commit: {e}")))?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);

        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::StatusFailed(e.to_string()))?;

        let mut staged = 0;
        let mut modified = 0;
        let mut untracked = 0;

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
            {
                staged += 1;
            }
            if status.is_wt_modified() || status.is_wt_deleted() || status.is_wt_renamed() {
                modified += 1;
            }
            if status.is_wt_new() {
                untracked += 1;
            }
        }

        Ok(RepoStatus {
            branch,
            commit_sha,
            staged_count: staged,
            modified_count: modified,
            untracked_count: untracked,
        })
    }

    fn stash(&mut self, options: StashOptions) -> Result<String> {
        let signature = self.signature()?;
        let mut repo = self.repo()?;

        let mut flags = StashFlags::DEFAULT;
        if options.include_untracked {
            flags |= StashFlags::INCLUDE_UNTRACKED;
        }

        let stash_oid = repo
            .stash_save(
                &signature,
                options.message.as_deref().unwrap_or("flagctl stash"),
                Some(flags),
            )
            .map_err(|e| GitError::Git2(format!("Stash failed: {e}")))?;

        Ok(stash_oid.to_string())
    }

    fn stash_pop(&mut self) -> Result<()> {
        let mut repo = self.repo()?;

        repo.stash_pop(0, None).map_err(|e| {
            if e.message().contains("conflict") {
                GitError::Conflict(e.message().to_string())
            } else {
                GitError::Git2(format!("Stash pop failed: {e}"))
            }
        })?;

        Ok(())
    }

    fn switch_branch(&mut self, branch: &str, options: SwitchOptions) -> Result<()> {
        let repo = self.repo()?;

        let reference = if options.create {
            let commit = repo
                .head()
                .and_then(|h| h.peel_to_commit())
                .map_err(|e| GitError::Git2(format!("Cannot get HEAD commit: {e}")))?;

            repo.branch(branch, &commit, false)
                .map_err(|e| GitError::Git2(format!("Cannot create branch: {e}")))?
                .into_reference()
        } else {
            repo.find_branch(branch, git2::BranchType::Local)
                .map_err(|_| GitError::BranchNotFound(branch.to_string()))?
                .into_reference()
        };

        let tree = reference
            .peel_to_tree()
            .map_err(|e| GitError::Git2(format!("Cannot get tree: {e}")))?;

        let mut checkout_opts = git2::build::CheckoutBuilder::new();
        if options.force {
            checkout_opts.force();
        } else {
            checkout_opts.safe();
        }

        repo.checkout_tree(tree.as_object(), Some(&mut checkout_opts))
            .map_err(|e| {
                if e.message().contains("conflict") {
                    GitError::Conflict(e.message().to_string())
                } else {
                    GitError::Git2(format!("Checkout failed: {e}"))
                }
            })?;

        let ref_name = reference
            .name()
            .ok_or_else(|| GitError::Git2("Invalid reference name".to_string()))?;
        repo.set_head(ref_name)
            .map_err(|e| GitError::Git2(format!("Cannot update HEAD: {e}")))?;

        Ok(())
    }

    fn stage_all_and_commit(&mut self, message: &str) -> Result<String> {
        let signature = self.signature()?;
        let repo = self.repo()?;

        let mut index = repo
            .index()
            .map_err(|e| GitError::Git2(format!("Cannot get index: {e}")))?;
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .map_err(|e| GitError::Git2(format!("Cannot stage changes: {e}")))?;
        index
            .write()
            .map_err(|e| GitError::Git2(format!("Cannot write index: {e}")))?;

        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::Git2(format!("Cannot write tree: {e}")))?;
        let tree = repo
            .find_tree(tree_id)
            .map_err(|e| GitError::Git2(format!("Cannot find tree: {e}")))?;

        let parent = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| GitError::Git2(format!("Cannot get HEAD commit: {e}")))?;

        let oid = repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])
            .map_err(|e| GitError::Git2(format!("Commit failed: {e}")))?;

        Ok(oid.to_string())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        let repo = self.repo()?;

        let found = repo
            .find_remote(remote)
            .map_err(|_| GitError::RemoteNotFound(remote.to_string()))?;

        found
            .url()
            .map(String::from)
            .ok_or_else(|| GitError::RemoteNotFound(remote.to_string()))
    }

    fn fetch(&mut self, remote: &str) -> Result<()> {
        self.run_git(&["fetch", remote])
    }

    fn pull_ff(&mut self, remote: &str, branch: &str) -> Result<()> {
        self.run_git(&["pull", "--ff-only", remote, branch])
    }

    fn push(&mut self, remote: &str, branch: &str) -> Result<()> {
        self.run_git(&["push", "--set-upstream", remote, branch])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_test_repo() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        // Create initial commit
        {
            let sig = Signature::now("Test", "test@test.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .unwrap();
        }

        (temp_dir, repo)
    }

    #[test]
    fn open_valid_repository() {
        let (temp_dir, _repo) = init_test_repo();
        assert!(Git2Operations::open(temp_dir.path()).is_ok());
    }

    #[test]
    fn open_invalid_repository() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Git2Operations::open(temp_dir.path()).is_err());
    }

    #[test]
    fn discover_from_subdirectory() {
        let (temp_dir, _repo) = init_test_repo();
        let sub = temp_dir.path().join("svc-a").join("prod");
        fs::create_dir_all(&sub).unwrap();

        let ops = Git2Operations::discover(&sub).unwrap();
        assert_eq!(
            ops.repo_path().canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn current_branch_on_fresh_repo() {
        let (temp_dir, _repo) = init_test_repo();
        let ops = Git2Operations::open(temp_dir.path()).unwrap();

        // Default branch might be "master" or "main" depending on git config
        let branch = ops.current_branch().unwrap();
        assert!(branch.is_some());
    }

    #[test]
    fn current_branch_detached_head_is_none() {
        let (temp_dir, repo) = init_test_repo();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.set_head_detached(head.id()).unwrap();

        let ops = Git2Operations::open(temp_dir.path()).unwrap();
        assert!(ops.current_branch().unwrap().is_none());
    }

    #[test]
    fn status_clean_repo() {
        let (temp_dir, _repo) = init_test_repo();
        let ops = Git2Operations::open(temp_dir.path()).unwrap();

        let status = ops.status().unwrap();
        assert!(!status.has_changes());
        assert_eq!(status.commit_sha.len(), 40);
    }

    #[test]
    fn status_with_untracked_file() {
        let (temp_dir, _repo) = init_test_repo();
        let ops = Git2Operations::open(temp_dir.path()).unwrap();

        fs::write(temp_dir.path().join("untracked.txt"), "content").unwrap();

        let status = ops.status().unwrap();
        assert_eq!(status.untracked_count, 1);
    }

    #[test]
    fn switch_to_new_branch() {
        let (temp_dir, _repo) = init_test_repo();
        let mut ops = Git2Operations::open(temp_dir.path()).unwrap();

        let options = SwitchOptions {
            create: true,
            force: false,
        };
        ops.switch_branch("add-flag-svc-a-prod-0", options).unwrap();

        let branch = ops.current_branch().unwrap();
        assert_eq!(branch.as_deref(), Some("add-flag-svc-a-prod-0"));
    }

    #[test]
    fn switch_to_nonexistent_branch_fails() {
        let (temp_dir, _repo) = init_test_repo();
        let mut ops = Git2Operations::open(temp_dir.path()).unwrap();

        let result = ops.switch_branch("nonexistent", SwitchOptions::default());
        assert!(matches!(result, Err(GitError::BranchNotFound(_))));
    }

    #[test]
    fn stash_and_pop_roundtrip() {
        let (temp_dir, _repo) = init_test_repo();
        let mut ops = Git2Operations::open(temp_dir.path()).unwrap();

        fs::write(temp_dir.path().join("dirty.txt"), "dirty").unwrap();
        ops.stash(StashOptions {
            message: Some("flagctl: test".to_string()),
            include_untracked: true,
        })
        .unwrap();
        assert!(!ops.status().unwrap().has_changes());

        ops.stash_pop().unwrap();
        assert!(ops.status().unwrap().has_changes());
        assert!(temp_dir.path().join("dirty.txt").exists());
    }

    #[test]
    fn stage_all_and_commit_advances_head() {
        let (temp_dir, _repo) = init_test_repo();
        let mut ops = Git2Operations::open(temp_dir.path()).unwrap();

        let before = ops.status().unwrap().commit_sha;
        fs::write(temp_dir.path().join("flag.yaml"), "FEATURE_X: true\n").unwrap();

        let sha = ops
            .stage_all_and_commit("Add feature flag FEATURE_X for svc-a (prod)")
            .unwrap();

        assert_eq!(sha.len(), 40);
        assert_ne!(sha, before);
        assert!(!ops.status().unwrap().has_changes());
    }

    #[test]
    fn remote_url_for_missing_remote_fails() {
        let (temp_dir, _repo) = init_test_repo();
        let ops = Git2Operations::open(temp_dir.path()).unwrap();

        let result = ops.remote_url("origin");
        assert!(matches!(result, Err(GitError::RemoteNotFound(_))));
    }

    #[test]
    fn remote_url_returns_configured_url() {
        let (temp_dir, repo) = init_test_repo();
        repo.remote("origin", "git@github.com:acme/deploy-config.git")
            .unwrap();

        let ops = Git2Operations::open(temp_dir.path()).unwrap();
        assert_eq!(
            ops.remote_url("origin").unwrap(),
            "git@github.com:acme/deploy-config.git"
        );
    }
}
