//! Hosting API token storage using the operating system keyring.
//!
//! The token is a plain personal access token pasted by the operator:
//! - macOS: Keychain
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - Windows: Credential Manager
//!
//! Environment variables take precedence over the keyring so CI jobs never
//! need keyring access.

use keyring::Entry;

use crate::hosting::error::HostingError;

const SERVICE_NAME: &str = "dev.flagctl.cli";
const TOKEN_KEY: &str = "hosting_token";

/// Environment variables consulted before the keyring, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["FLAGCTL_TOKEN", "GITHUB_TOKEN"];

/// Secure hosting-token storage backed by the OS keyring.
pub struct TokenStore {
    entry: Entry,
}

impl TokenStore {
    /// Creates a new token store instance.
    ///
    /// # Errors
    ///
    /// Returns [`HostingError::TokenStorage`] if the keyring entry cannot be
    /// created, which may occur if the keyring service is unavailable or locked.
    pub fn new() -> Result<Self, HostingError> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_KEY)
            .map_err(|e| HostingError::TokenStorage(e.to_string()))?;
        Ok(Self { entry })
    }

    /// Saves the token, overwriting any previously stored one.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring is inaccessible.
    pub fn save(&self, token: &str) -> Result<(), HostingError> {
        self.entry
            .set_password(token)
            .map_err(|e| HostingError::TokenStorage(e.to_string()))
    }

    /// Loads the stored token. Returns `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring is inaccessible.
    pub fn load(&self) -> Result<Option<String>, HostingError> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(HostingError::TokenStorage(e.to_string())),
        }
    }

    /// Deletes the stored token. No-op if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring is inaccessible.
    pub fn delete(&self) -> Result<(), HostingError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(HostingError::TokenStorage(e.to_string())),
        }
    }

    /// Resolves the token to use: environment variables first, keyring second.
    ///
    /// # Errors
    ///
    /// Returns [`HostingError::MissingToken`] when neither source has one.
    pub fn resolve(&self) -> Result<String, HostingError> {
        if let Some(token) = token_from_env() {
            return Ok(token);
        }

        self.load()?.ok_or(HostingError::MissingToken)
    }
}

/// First non-empty token from [`TOKEN_ENV_VARS`].
fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|token| !token.trim().is_empty())
}
