//! Hosting API data types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hosting::error::HostingError;

/// An `owner/name` repository coordinate on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepoSlug {
    /// Derives the slug from a git remote URL.
    ///
    /// Understands the two shapes remotes come in:
    /// - `git@host:owner/repo.git` (scp-like SSH)
    /// - `https://host/owner/repo.git` (and `ssh://` URLs)
    ///
    /// # Errors
    ///
    /// Returns [`HostingError::InvalidRemote`] when no owner/repo pair can be
    /// extracted.
    pub fn from_remote_url(remote_url: &str) -> Result<Self, HostingError> {
        let invalid = || HostingError::InvalidRemote(remote_url.to_string());

        // scp-like: git@github.com:owner/repo.git
        let path = if let Some((_, path)) = remote_url
            .split_once(':')
            .filter(|(head, _)| head.contains('@') && !head.contains("//"))
        {
            path
        } else {
            // URL form: strip scheme://host
            let after_scheme = remote_url
                .split_once("://")
                .map_or(remote_url, |(_, rest)| rest);
            let (host, path) = after_scheme.split_once('/').ok_or_else(invalid)?;
            if host.is_empty() {
                // file:///... and friends have no host to open a PR against.
                return Err(invalid());
            }
            path
        };

        let path = path.trim_matches('/').trim_end_matches(".git");
        let (owner, name) = path.split_once('/').ok_or_else(invalid)?;

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Payload for opening a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    /// Pull request title.
    pub title: String,

    /// Pull request body (markdown).
    pub body: String,

    /// Topic branch being merged.
    pub head: String,

    /// Base branch to merge into.
    pub base: String,
}

/// A created pull request, as reported by the hosting API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,

    /// Browser URL of the pull request.
    pub html_url: String,
}
