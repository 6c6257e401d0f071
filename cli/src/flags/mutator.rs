//! Idempotent flag mutation for a single config file.
//!
//! The config files are flat YAML-like documents, one `NAME: true` line per
//! flag. Mutation never parses the document: insertion appends a line,
//! removal filters the declaring line out, and every unrelated byte is
//! preserved as-is. "Already in the desired state" is a normal outcome here,
//! not an error.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::flags::error::FlagError;
use crate::flags::request::Operation;

/// Header written when a config file is created from scratch.
const CREATED_FILE_HEADER: &str = "# Managed feature flags\n";

/// Result of applying one operation to one config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The file was changed.
    Applied {
        /// The file did not exist (or was empty) and was created.
        created_file: bool,
    },

    /// Add requested but the flag is already declared; file untouched.
    SkippedAlreadyPresent,

    /// Remove requested but the flag (or the whole file) is absent; file untouched.
    SkippedAbsent,
}

impl MutationOutcome {
    /// Whether this outcome changed the file.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

impl std::fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Applied { created_file: true } => write!(f, "applied (file created)"),
            Self::Applied { created_file: false } => write!(f, "applied"),
            Self::SkippedAlreadyPresent => write!(f, "skipped (already present)"),
            Self::SkippedAbsent => write!(f, "skipped (not present)"),
        }
    }
}

/// Applies `operation` for `flag` to the config file at `config_file`.
///
/// Add: appends `<flag>: true`, creating the file (with a header comment)
/// when missing or empty. Remove: drops the declaring line. Both directions
/// are idempotent; the steady-state cases return a `Skipped*` outcome.
///
/// The file is replaced atomically (temp file + rename in the target
/// directory), so a crash mid-write never leaves a truncated config.
///
/// # Errors
///
/// Returns [`FlagError::Read`]/[`FlagError::Write`] on IO failure.
pub fn apply(config_file: &Path, flag: &str, operation: Operation) -> Result<MutationOutcome, FlagError> {
    match operation {
        Operation::Add => add_flag(config_file, flag),
        Operation::Remove => remove_flag(config_file, flag),
    }
}

fn add_flag(config_file: &Path, flag: &str) -> Result<MutationOutcome, FlagError> {
    let content = read_or_empty(config_file)?;

    if content.lines().any(|line| declares_flag(line, flag)) {
        return Ok(MutationOutcome::SkippedAlreadyPresent);
    }

    let created_file = content.is_empty();
    let mut updated = String::with_capacity(content.len() + flag.len() + 8);

    if created_file {
        updated.push_str(CREATED_FILE_HEADER);
    } else {
        updated.push_str(&content);
        if !content.ends_with('\n') {
            updated.push('\n');
        }
    }
    updated.push_str(flag);
    updated.push_str(": true\n");

    write_atomic(config_file, &updated)?;
    Ok(MutationOutcome::Applied { created_file })
}

fn remove_flag(config_file: &Path, flag: &str) -> Result<MutationOutcome, FlagError> {
    if !config_file.exists() {
        return Ok(MutationOutcome::SkippedAbsent);
    }

    let content = read_or_empty(config_file)?;

    // split_inclusive keeps line endings, so untouched lines survive byte-for-byte.
    let updated: String = content
        .split_inclusive('\n')
        .filter(|line| !declares_flag(line, flag))
        .collect();

    if updated == content {
        return Ok(MutationOutcome::SkippedAbsent);
    }

    write_atomic(config_file, &updated)?;
    Ok(MutationOutcome::Applied { created_file: false })
}

/// Whether `line` declares `flag` as a top-level key.
///
/// Matches `FLAG:` with optional surrounding whitespace; comment lines and
/// longer keys sharing the prefix do not count.
fn declares_flag(line: &str, flag: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return false;
    }
    trimmed
        .strip_prefix(flag)
        .is_some_and(|rest| rest.trim_start().starts_with(':'))
}

fn read_or_empty(path: &Path) -> Result<String, FlagError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(FlagError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `content` to `path` via a temp file in the same directory, then
/// renames it over the target.
fn write_atomic(path: &Path, content: &str) -> Result<(), FlagError> {
    let write_err = |source| FlagError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(write_err)?;
    }

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.persist(path)
        .map_err(|e| write_err(e.error))?;

    Ok(())
}
