//! Application configuration settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Main configuration for flagctl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagctlConfig {
    /// Deployment repository settings.
    pub repo: RepoConfig,
    /// Hosting API settings.
    pub hosting: HostingConfig,
}

/// Deployment repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository root. When unset, the repository is discovered from the
    /// current directory.
    pub path: Option<PathBuf>,

    /// Base branch that topic branches fork from.
    pub base_branch: String,

    /// Remote that topic branches are pushed to and PRs are opened against.
    pub push_remote: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            path: None,
            base_branch: "master".to_string(),
            push_remote: "origin".to_string(),
        }
    }
}

/// Hosting API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingConfig {
    /// Hosting REST API base URL.
    #[serde(with = "url_serde")]
    pub api_base: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of retries for failed requests.
    pub max_retries: u32,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse("https://api.github.com").expect("valid default URL"),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Custom serde module for URL serialization.
mod url_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use url::Url;

    pub fn serialize<S>(url: &Url, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(url.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Url, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Url::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Environment variables that can override configuration.
pub mod env {
    pub const REPO_PATH: &str = "FLAGCTL_REPO";
    pub const BASE_BRANCH: &str = "FLAGCTL_BASE_BRANCH";
    pub const PUSH_REMOTE: &str = "FLAGCTL_REMOTE";
    pub const API_URL: &str = "FLAGCTL_API_URL";
    pub const LOG_LEVEL: &str = "FLAGCTL_LOG";
}

impl FlagctlConfig {
    /// Apply environment variable overrides to the configuration.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(env::REPO_PATH) {
            if !path.is_empty() {
                self.repo.path = Some(PathBuf::from(path));
            }
        }

        if let Ok(branch) = std::env::var(env::BASE_BRANCH) {
            if !branch.is_empty() {
                self.repo.base_branch = branch;
            }
        }

        if let Ok(remote) = std::env::var(env::PUSH_REMOTE) {
            if !remote.is_empty() {
                self.repo.push_remote = remote;
            }
        }

        if let Ok(url) = std::env::var(env::API_URL) {
            if let Ok(parsed) = Url::parse(&url) {
                self.hosting.api_base = parsed;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = FlagctlConfig::default();

        assert!(config.repo.path.is_none());
        assert_eq!(config.repo.base_branch, "master");
        assert_eq!(config.repo.push_remote, "origin");
        assert_eq!(config.hosting.api_base.as_str(), "https://api.github.com/");
        assert_eq!(config.hosting.timeout_secs, 30);
        assert_eq!(config.hosting.max_retries, 3);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: FlagctlConfig = toml::from_str(
            r#"
            [repo]
            base_branch = "main"
            "#,
        )
        .unwrap();

        assert_eq!(config.repo.base_branch, "main");
        assert_eq!(config.repo.push_remote, "origin");
        assert_eq!(config.hosting.timeout_secs, 30);
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let mut config = FlagctlConfig::default();
        config.repo.path = Some(PathBuf::from("/srv/deploy-config"));
        config.repo.push_remote = "upstream".to_string();
        config.hosting.api_base = Url::parse("https://github.example.com/api/v3").unwrap();

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: FlagctlConfig = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.repo.path, config.repo.path);
        assert_eq!(parsed.repo.push_remote, "upstream");
        assert_eq!(
            parsed.hosting.api_base.as_str(),
            "https://github.example.com/api/v3"
        );
    }

    #[test]
    fn env_override_changes_base_branch() {
        std::env::set_var(env::BASE_BRANCH, "trunk");
        let config = FlagctlConfig::default().with_env_overrides();
        std::env::remove_var(env::BASE_BRANCH);

        assert_eq!(config.repo.base_branch, "trunk");
    }
}
