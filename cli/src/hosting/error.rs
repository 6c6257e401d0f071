//! Hosting-specific error types.

use thiserror::Error;

/// Errors from the hosting API layer (pull request creation, token storage).
#[derive(Error, Debug)]
pub enum HostingError {
    /// No API token available from env or keyring.
    #[error("No hosting API token found. Run 'flagctl auth set-token' or set FLAGCTL_TOKEN.")]
    MissingToken,

    /// The push remote URL could not be mapped to an owner/repository pair.
    #[error("Cannot derive owner/repository from remote URL '{0}'.")]
    InvalidRemote(String),

    /// The hosting API returned a non-success status code.
    #[error("Hosting API request failed ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Request timed out.
    #[error("Hosting API request timed out. The server may be slow or unreachable.")]
    Timeout,

    /// Network error during HTTP request.
    #[error("Network error: {0}. Check your internet connection.")]
    Network(String),

    /// Failed to access the OS keyring.
    #[error("Failed to access credential storage: {0}. Ensure your system keyring is unlocked.")]
    TokenStorage(String),

    /// A hosting API URL could not be constructed.
    #[error("Invalid hosting API URL: {0}")]
    InvalidUrl(String),
}

impl HostingError {
    /// Checks if this error is transient and the operation might succeed on retry.
    #[allow(dead_code)] // Kept for future retry hints in the error handler
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for HostingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for HostingError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => Self::Network(e.to_string()),
        }
    }
}
