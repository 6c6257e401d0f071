//! Auth command handlers for the flagctl CLI.
//!
//! This module implements hosting token management:
//! - [`handle_set_token`] - Store the token in the keyring (`flagctl auth set-token`)
//! - [`handle_status`] - Show where a token would come from (`flagctl auth status`)
//! - [`handle_clear`] - Remove the stored token (`flagctl auth clear`)

use std::io::{self, Write};

use crate::error::Result;
use crate::hosting::token::{TokenStore, TOKEN_ENV_VARS};

/// Handles the `flagctl auth set-token` command.
///
/// Stores the given token in the OS keyring. When no token is passed on the
/// command line, it is read from stdin so it does not land in shell history.
///
/// # Errors
///
/// Returns an error if the keyring is inaccessible or stdin cannot be read.
pub fn handle_set_token(token: Option<String>) -> Result<()> {
    let token = match token {
        Some(t) => t,
        None => {
            print!("Paste the hosting API token: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };

    if token.is_empty() {
        println!("No token provided; nothing stored.");
        return Ok(());
    }

    let store = TokenStore::new()?;
    store.save(&token)?;

    println!("Hosting token stored in the system keyring.");
    Ok(())
}

/// Handles the `flagctl auth status` command.
///
/// # Errors
///
/// Returns an error if the keyring is inaccessible.
pub fn handle_status() -> Result<()> {
    for var in TOKEN_ENV_VARS {
        if std::env::var(var).is_ok_and(|v| !v.trim().is_empty()) {
            println!("Token source: environment variable {var}.");
            return Ok(());
        }
    }

    let store = TokenStore::new()?;
    if store.load()?.is_some() {
        println!("Token source: system keyring.");
    } else {
        println!("No hosting token configured.");
        println!("\nStore one with: flagctl auth set-token");
    }

    Ok(())
}

/// Handles the `flagctl auth clear` command.
///
/// # Errors
///
/// Returns an error if the keyring is inaccessible.
pub fn handle_clear() -> Result<()> {
    let store = TokenStore::new()?;
    store.delete()?;

    println!("Stored hosting token removed.");
    Ok(())
}
