//! Hosting API client implementation.
//!
//! - [`HostingClient`] - Trait for the one hosting call the workflow makes
//!   (opening a pull request), kept narrow so tests can mock it
//! - [`GitHubClient`] - Implementation against the GitHub-style REST API

use std::time::Duration;

use async_trait::async_trait;
use http::header;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use url::Url;

use crate::config::HostingConfig;
use crate::hosting::error::HostingError;
use crate::hosting::types::{NewPullRequest, PullRequest, RepoSlug};

/// Trait for hosting operations (enables mocking in tests).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Opens a pull request on the hosting service.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success API response.
    async fn create_pull_request(
        &self,
        repo: &RepoSlug,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError>;
}

/// Hosting client for the GitHub REST API (github.com or GitHub Enterprise).
pub struct GitHubClient {
    client: ClientWithMiddleware,
    base_url: Url,
    token: String,
}

impl GitHubClient {
    /// Creates a new hosting client.
    ///
    /// Transient failures (connection resets, 5xx) are retried with
    /// exponential backoff up to the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &HostingConfig, token: String) -> Result<Self, HostingError> {
        let inner_client = Client::builder()
            .user_agent(format!("flagctl/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.api_base.clone(),
            token,
        })
    }

    /// Get the base URL.
    #[allow(dead_code)]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl HostingClient for GitHubClient {
    async fn create_pull_request(
        &self,
        repo: &RepoSlug,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError> {
        // Plain string concat keeps enterprise path prefixes (e.g. /api/v3) intact.
        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.base_url.as_str().trim_end_matches('/'),
            repo.owner,
            repo.name
        );

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(pull_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HostingError::Api { status, message });
        }

        response
            .json::<PullRequest>()
            .await
            .map_err(|e| HostingError::Network(format!("Invalid API response: {e}")))
    }
}
