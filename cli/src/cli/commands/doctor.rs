//! Diagnostic and tooling command handlers for the flagctl CLI.

use crate::cli::args::ShellType;
use crate::error::Result;
use crate::git::{Git2Operations, GitOperations};
use crate::hosting::TokenStore;

/// Handles the `flagctl doctor` command.
///
/// Checks flagctl installation and diagnoses issues.
pub fn handle_doctor() -> Result<()> {
    println!("Flagctl Doctor\n");
    println!("Checking installation...\n");

    let mut issues = 0;

    // Check 1: Config directory
    print!("  Config directory: ");
    match crate::config::paths::config_dir() {
        Ok(path) => {
            if path.exists() {
                println!("OK ({})", path.display());
            } else {
                println!("OK (will be created: {})", path.display());
            }
        }
        Err(e) => {
            println!("ERROR - {e}");
            issues += 1;
        }
    }

    // Check 2: Config file
    print!("  Configuration: ");
    match crate::config::load_config() {
        Ok(config) => {
            println!(
                "OK (base branch: {}, remote: {})",
                config.repo.base_branch, config.repo.push_remote
            );
        }
        Err(e) => {
            println!("ERROR - {e}");
            issues += 1;
        }
    }

    // Check 3: Deployment repository
    print!("  Deployment repository: ");
    match resolve_repo() {
        Ok(git) => match git.status() {
            Ok(status) => {
                println!(
                    "OK (branch: {}, {})",
                    status.branch.as_deref().unwrap_or("<detached>"),
                    if status.has_changes() { "dirty" } else { "clean" }
                );
            }
            Err(e) => {
                println!("WARNING - {e}");
            }
        },
        Err(_) => {
            println!("N/A (not in a git repository; pass --repo or set repo.path)");
        }
    }

    // Check 4: Hosting token
    print!("  Hosting token: ");
    match TokenStore::new() {
        Ok(store) => match store.resolve() {
            Ok(_) => println!("OK"),
            Err(e) => {
                println!("MISSING - {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("ERROR - {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("All checks passed!");
    } else {
        println!("{issues} issue(s) found.");
    }

    Ok(())
}

fn resolve_repo() -> Result<Git2Operations> {
    let config = crate::config::load_config()?;
    let git = match config.repo.path {
        Some(path) => Git2Operations::open(path)?,
        None => Git2Operations::discover(std::env::current_dir()?)?,
    };
    Ok(git)
}

/// Handles the `flagctl completions <shell>` command.
///
/// Generates shell completion scripts.
pub fn handle_completions(shell: ShellType) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell};

    let mut cmd = crate::cli::Cli::command();
    let shell = match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
    };

    generate(shell, &mut cmd, "flagctl", &mut std::io::stdout());

    Ok(())
}
