//! Error types and result aliases for flagctl.
//!
//! This module provides the top-level error type:
//! - Per-module errors fold in transparently (git, flags, hosting, workflow)
//! - CLI/config failures get their own variants with actionable messages
//! - Helper methods classify errors for exit-code decisions

use thiserror::Error;

use crate::flags::FlagError;
use crate::git::GitError;
use crate::hosting::HostingError;
use crate::workflow::WorkflowError;

/// Main error type for flagctl operations.
#[derive(Error, Debug)]
pub enum FlagctlError {
    /// Invalid CLI input, caught before any side effects.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}. Check file permissions and format.")]
    ConfigRead(String),

    /// Failed to write configuration file.
    #[error("Failed to write configuration file: {0}. Check directory permissions.")]
    ConfigWrite(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Flag request or config file mutation error.
    #[error(transparent)]
    Flag(#[from] FlagError),

    /// Git operation error.
    #[error(transparent)]
    Git(#[from] GitError),

    /// Hosting API error.
    #[error(transparent)]
    Hosting(#[from] HostingError),

    /// Branch workflow error.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl FlagctlError {
    /// Checks if this is the soft "everything already in the desired state"
    /// outcome, which reports as a no-op and exits zero.
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        matches!(self, Self::Workflow(w) if w.is_no_change_needed())
    }
}

/// Result type alias using [`FlagctlError`].
pub type Result<T> = std::result::Result<T, FlagctlError>;
