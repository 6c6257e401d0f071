//! Flag-specific error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors specific to flag requests and config file mutations.
#[derive(Error, Debug)]
pub enum FlagError {
    /// Flag name is empty or not a valid identifier.
    #[error("Invalid flag name '{0}': must be a non-empty identifier (letters, digits, '_' or '-', not starting with a digit).")]
    InvalidFlagName(String),

    /// Environment class selector was not recognized.
    #[error("Invalid environment class '{0}'. Expected 'prod' or 'non-prod'.")]
    InvalidEnvironmentClass(String),

    /// Failed to read a config file.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        /// Path of the file being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("Failed to write config file '{path}': {source}")]
    Write {
        /// Path of the file being written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_user_friendly() {
        let name = FlagError::InvalidFlagName("9bad".to_string());
        assert!(name.to_string().contains("9bad"));

        let env = FlagError::InvalidEnvironmentClass("staging".to_string());
        assert!(env.to_string().contains("non-prod"));
    }
}
