//! Bounded log of past renders, persisted as a JSON array.
//!
//! Each entry stores the raw input and the template base64-encoded so that
//! arbitrary control characters in either cannot corrupt the file. The log is
//! ordered oldest first and never holds more than
//! [`SettingsStore::max_entries`] entries.
//!
//! Every operation is a full read-modify-write of the file. A missing,
//! unreadable or corrupt file reads as an empty log and is replaced by the
//! next write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::settings::SettingsStore;

/// An entry as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// UTC timestamp, ISO-8601 with a trailing `Z`.
    #[serde(default)]
    pub datetime: String,
    /// Base64 of the raw input text.
    #[serde(default)]
    pub input: String,
    /// Base64 of the template text.
    #[serde(default)]
    pub expr: String,
}

/// An entry as returned to callers, with both text fields decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub datetime: String,
    pub input: String,
    pub expr: String,
}

/// Outcome of [`HistoryLog::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    /// Entries actually removed.
    pub cleared: usize,
    /// Entries remaining.
    pub size: usize,
}

/// File-backed history log.
pub struct HistoryLog {
    path: PathBuf,
    settings: Arc<SettingsStore>,
}

impl HistoryLog {
    /// Create a log backed by `path`, bounded by `settings`.
    ///
    /// The file is not touched until the first read or write.
    pub fn new<P: AsRef<Path>>(path: P, settings: Arc<SettingsStore>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            settings,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a render, evict the oldest entries beyond the bound, persist.
    pub fn record(&self, input: &str, expr: &str) -> std::io::Result<()> {
        let entry = StoredEntry {
            datetime: timestamp(),
            input: STANDARD.encode(input.as_bytes()),
            expr: STANDARD.encode(expr.as_bytes()),
        };

        let mut entries = self.load();
        entries.push(entry);

        let bound = self.settings.max_entries();
        if entries.len() > bound {
            let excess = entries.len() - bound;
            entries.drain(..excess);
        }

        self.save(&entries)?;
        tracing::debug!(size = entries.len(), max = bound, "history entry recorded");
        Ok(())
    }

    /// All entries, oldest first, with text fields decoded.
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.load()
            .into_iter()
            .map(|e| HistoryEntry {
                input: decode_field(e.input),
                expr: decode_field(e.expr),
                datetime: e.datetime,
            })
            .collect()
    }

    /// Number of stored entries.
    pub fn size(&self) -> usize {
        self.load().len()
    }

    /// Current bound.
    pub fn max_size(&self) -> usize {
        self.settings.max_entries()
    }

    /// Remove the oldest `count` entries, or all of them when `count` is `None`.
    pub fn clear(&self, count: Option<usize>) -> std::io::Result<ClearOutcome> {
        let mut entries = self.load();
        let original = entries.len();

        let cleared = match count {
            Some(n) => n.min(original),
            None => original,
        };
        entries.drain(..cleared);

        self.save(&entries)?;
        tracing::info!(cleared, size = entries.len(), "history cleared");

        Ok(ClearOutcome {
            cleared,
            size: entries.len(),
        })
    }

    fn load(&self) -> Vec<StoredEntry> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "history file unreadable");
                return Vec::new();
            }
        };

        match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "history file corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[StoredEntry]) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
    }
}

/// Decode a base64 field, returning it unchanged when it is not valid
/// base64 of UTF-8 text.
fn decode_field(raw: String) -> String {
    match STANDARD.decode(raw.as_bytes()) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or(raw),
        Err(_) => raw,
    }
}

fn timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}
