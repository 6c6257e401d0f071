//! Flag change request types.
//!
//! A [`FeatureFlagRequest`] is the unit of work for one branch workflow run.
//! It is validated on construction and immutable afterwards; everything the
//! workflow derives (environment targets, branch name, commit message) comes
//! from here.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::flags::environments::EnvironmentClass;
use crate::flags::error::FlagError;

/// File holding the flag lines inside each environment directory.
pub const FLAG_FILE_NAME: &str = "values.yaml";

/// Whether a flag is being rolled out or retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Insert the flag, set to `true`.
    Add,
    /// Remove the flag line entirely.
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// A validated request to change one flag for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlagRequest {
    operation: Operation,
    flag: String,
    project: String,
    environment_class: EnvironmentClass,
}

impl FeatureFlagRequest {
    /// Creates a request, validating the flag name.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::InvalidFlagName`] if the flag is empty or not an
    /// identifier (letters, digits, `_`, `-`; must not start with a digit).
    pub fn new(
        operation: Operation,
        flag: impl Into<String>,
        project: impl Into<String>,
        environment_class: EnvironmentClass,
    ) -> Result<Self, FlagError> {
        let flag = flag.into();
        validate_flag_name(&flag)?;

        Ok(Self {
            operation,
            flag,
            project: project.into(),
            environment_class,
        })
    }

    /// The requested operation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// The flag name.
    #[must_use]
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// The project whose environments are touched.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The environment class selector.
    #[must_use]
    pub const fn environment_class(&self) -> EnvironmentClass {
        self.environment_class
    }

    /// Expands the request into one target per environment directory.
    #[must_use]
    pub fn targets(&self, repo_root: &Path) -> Vec<EnvironmentTarget> {
        self.environment_class
            .environments()
            .iter()
            .map(|env| EnvironmentTarget::new(repo_root, &self.project, env))
            .collect()
    }

    /// Derives a unique topic branch name for this request.
    ///
    /// The epoch-millisecond suffix keeps repeated runs collision-free.
    #[must_use]
    pub fn branch_name(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.operation,
            self.flag,
            self.project,
            self.environment_class,
            chrono::Utc::now().timestamp_millis()
        )
    }

    /// Commit message (and pull request title) for this change.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = match self.operation {
            Operation::Add => "Add",
            Operation::Remove => "Remove",
        };
        format!(
            "{verb} feature flag {} for {} ({})",
            self.flag, self.project, self.environment_class
        )
    }

    /// Builds an identical request for a different project.
    #[must_use]
    pub fn for_project(&self, project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..self.clone()
        }
    }
}

/// One concrete environment directory touched by a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentTarget {
    /// Environment name (e.g. `prod`, `stage`).
    pub environment: String,

    /// Environment directory: `<repo>/<project>/<environment>`.
    pub directory: PathBuf,

    /// Flag config file inside the environment directory.
    pub config_file: PathBuf,
}

impl EnvironmentTarget {
    /// Derives the target for `(repo_root, project, environment)`.
    #[must_use]
    pub fn new(repo_root: &Path, project: &str, environment: &str) -> Self {
        let directory = repo_root.join(project).join(environment);
        let config_file = directory.join(FLAG_FILE_NAME);
        Self {
            environment: environment.to_string(),
            directory,
            config_file,
        }
    }

    /// Path of the config file relative to the repository root, for display
    /// and commit/PR summaries.
    #[must_use]
    pub fn relative_config_file(&self, repo_root: &Path) -> PathBuf {
        self.config_file
            .strip_prefix(repo_root)
            .map_or_else(|_| self.config_file.clone(), Path::to_path_buf)
    }
}

/// Validates a flag name against the identifier pattern.
fn validate_flag_name(flag: &str) -> Result<(), FlagError> {
    let mut chars = flag.chars();

    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(FlagError::InvalidFlagName(flag.to_string()))
    }
}
