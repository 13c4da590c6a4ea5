//! Fixture directory listing and confined file reads.
//!
//! The fixture directory is taken from the `input_files.directory` setting on
//! every call; relative paths resolve against the data directory.
//!
//! # Read confinement
//!
//! A requested name goes through two independent checks before any content
//! is returned:
//!
//! 1. **Syntactic**: it must be a bare file name. Separators (`/`, `\`), NUL
//!    bytes, `.` and `..` are refused before touching the filesystem. Only a
//!    whole `..` segment counts as a parent reference: a name that merely
//!    contains two dots, such as `notes..txt`, is a valid bare name and is
//!    served.
//! 2. **Canonical**: the candidate and the root are both canonicalized
//!    (symlinks and `.`/`..` resolved) and the candidate must lie strictly
//!    inside the root. This catches symlinks that point outside.
//!
//! Existence is only checked after both pass.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::settings::SettingsStore;

/// Errors from fixture reads.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No filename was supplied.
    #[error("Missing filename parameter")]
    MissingFilename,

    /// No fixture directory is configured.
    #[error("Input directory not configured")]
    NotConfigured,

    /// The configured fixture directory does not exist.
    #[error("Input directory not found")]
    DirectoryMissing,

    /// The name is not a bare file name, or resolves outside the directory.
    #[error("Access denied - {0}")]
    AccessDenied(&'static str),

    /// No regular file by that name.
    #[error("File not found")]
    FileNotFound,

    /// The file exists but could not be read.
    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves fixture names against the configured directory.
#[derive(Clone)]
pub struct FixtureResolver {
    settings: Arc<SettingsStore>,
    base_dir: PathBuf,
}

impl FixtureResolver {
    /// Create a resolver whose relative roots are joined onto `base_dir`.
    pub fn new(settings: Arc<SettingsStore>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            base_dir: base_dir.into(),
        }
    }

    /// The configured root, resolved against the base directory.
    pub fn root(&self) -> Option<PathBuf> {
        let dir = PathBuf::from(self.settings.fixture_directory()?);
        if dir.is_absolute() {
            Some(dir)
        } else {
            Some(self.base_dir.join(dir))
        }
    }

    /// Sorted names of the regular files directly inside the root.
    ///
    /// An unconfigured, missing or unreadable root yields an empty list.
    pub fn list(&self) -> Vec<String> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        if !root.is_dir() {
            return Vec::new();
        }

        let entries = match std::fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "failed to list fixture directory");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            // `Path::is_file` follows symlinks, so links to regular files are listed.
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Read a fixture file's bytes.
    pub fn read(&self, filename: Option<&str>) -> Result<Vec<u8>, ResolveError> {
        let filename = filename
            .filter(|f| !f.is_empty())
            .ok_or(ResolveError::MissingFilename)?;

        let root = self.root().ok_or(ResolveError::NotConfigured)?;

        check_bare_name(filename)?;

        let canonical_root =
            std::fs::canonicalize(&root).map_err(|_| ResolveError::DirectoryMissing)?;
        let candidate = root.join(filename);

        let canonical = match std::fs::canonicalize(&candidate) {
            Ok(path) => path,
            // A directory entry that exists but cannot be resolved is a dangling link.
            Err(_) if std::fs::symlink_metadata(&candidate).is_ok() => {
                reject(filename, "unresolvable_link");
                return Err(ResolveError::AccessDenied("path resolution error"));
            }
            Err(_) => return Err(ResolveError::FileNotFound),
        };

        if canonical == canonical_root || !canonical.starts_with(&canonical_root) {
            reject(filename, "outside_root");
            return Err(ResolveError::AccessDenied("path traversal detected"));
        }

        if !canonical.is_file() {
            return Err(ResolveError::FileNotFound);
        }

        let bytes = std::fs::read(&canonical)?;
        tracing::debug!(file = %filename, bytes = bytes.len(), "fixture read");
        Ok(bytes)
    }
}

/// Refuse anything that is not a plain file name.
fn check_bare_name(filename: &str) -> Result<(), ResolveError> {
    let syntactically_bad = filename.contains(['/', '\\', '\0'])
        || filename == "."
        || filename == ".."
        || Path::new(filename)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        || Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename);

    if syntactically_bad {
        reject(filename, "not_a_bare_name");
        return Err(ResolveError::AccessDenied("invalid filename"));
    }
    Ok(())
}

fn reject(filename: &str, reason: &'static str) {
    tracing::warn!(
        security_event = "path_traversal_attempt",
        path = %filename.replace('\0', "\\0"),
        reason,
        "Blocked fixture read"
    );
}
