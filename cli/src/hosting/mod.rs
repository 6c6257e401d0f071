//! Git hosting integration for flagctl.
//!
//! Covers everything that happens off the local checkout once a topic branch
//! is pushed: resolving the repository slug from the remote URL and opening
//! the pull request through the hosting REST API.

pub mod client;
pub mod error;
pub mod token;
pub mod types;

#[allow(unused_imports)]
pub use client::{GitHubClient, HostingClient};
#[allow(unused_imports)]
pub use error::HostingError;
#[allow(unused_imports)]
pub use token::TokenStore;
#[allow(unused_imports)]
pub use types::{NewPullRequest, PullRequest, RepoSlug};

#[cfg(test)]
#[allow(unused_imports)]
pub use client::MockHostingClient;
