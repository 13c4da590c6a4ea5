//! Sectioned key/value settings persisted to a TOML file.
//!
//! The file is the source of truth: every write re-reads it, merges the new
//! keys into the requested section and writes the whole document back. A copy
//! of the last good state is kept in memory so that a missing or corrupt file
//! degrades to the previous (or default) values instead of failing requests.
//!
//! # File format
//!
//! ```toml
//! [history]
//! max_entries = "1000"
//!
//! [input_files]
//! directory = "jinjapad_inputs"
//! refresh_interval = "1"
//! ```
//!
//! Values are always strings. Hand-edited scalars (`max_entries = 1000`) are
//! accepted and stringified on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

/// Section holding the history bound.
pub const HISTORY_SECTION: &str = "history";

/// Section holding the fixture directory settings.
pub const INPUT_FILES_SECTION: &str = "input_files";

/// Bound applied when `history.max_entries` is absent or not a number.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Fixture directory written into a freshly created settings file.
pub const DEFAULT_INPUT_DIRECTORY: &str = "jinjapad_inputs";

/// Key/value pairs of one section.
pub type Section = BTreeMap<String, String>;

/// All sections keyed by name.
pub type Sections = BTreeMap<String, Section>;

/// Errors from settings writes.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The caller did not name a section.
    #[error("Missing section parameter")]
    MissingSection,

    /// The settings file could not be written.
    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings could not be encoded as TOML.
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Result of a settings read: one section or all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingsView {
    /// A single section (empty if it does not exist).
    Section(Section),
    /// Every section keyed by name.
    All(Sections),
}

/// File-backed settings store.
pub struct SettingsStore {
    path: PathBuf,
    cached: Mutex<Sections>,
}

impl SettingsStore {
    /// Open the settings file at `path`, creating it with defaults if absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let defaults = default_sections();
            write_sections(&path, &defaults)?;
            tracing::info!(path = %path.display(), "created settings file with defaults");
            return Ok(Self {
                path,
                cached: Mutex::new(defaults),
            });
        }

        let sections = read_sections(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "settings file unreadable, using defaults");
            default_sections()
        });
        tracing::info!(
            path = %path.display(),
            sections = sections.len(),
            "settings loaded"
        );

        Ok(Self {
            path,
            cached: Mutex::new(sections),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one section, or every section when `section` is `None`.
    pub fn get(&self, section: Option<&str>) -> SettingsView {
        let sections = self.current();
        match section {
            Some(name) => SettingsView::Section(sections.get(name).cloned().unwrap_or_default()),
            None => SettingsView::All(sections),
        }
    }

    /// Merge `pairs` into `section` and persist.
    ///
    /// Keys not mentioned in `pairs` are preserved. Returns the updated section.
    pub fn set<I, K, V>(&self, section: &str, pairs: I) -> Result<Section, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let section = section.trim();
        if section.is_empty() {
            return Err(SettingsError::MissingSection);
        }

        let mut cached = self.cached.lock();
        let mut sections = match read_sections(&self.path) {
            Ok(on_disk) => on_disk,
            Err(e) => {
                tracing::warn!(error = %e, "settings file unreadable, merging into last good copy");
                cached.clone()
            }
        };

        let entry = sections.entry(section.to_string()).or_default();
        for (key, value) in pairs {
            entry.insert(key.as_ref().to_lowercase(), value.into());
        }
        let updated = entry.clone();

        write_sections(&self.path, &sections)?;
        *cached = sections;

        tracing::info!(section = %section, keys = updated.len(), "settings updated");
        Ok(updated)
    }

    /// Bound for the history log, read fresh on every call.
    pub fn max_entries(&self) -> usize {
        self.value(HISTORY_SECTION, "max_entries")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_ENTRIES)
    }

    /// Configured fixture directory, `None` when unset or blank.
    pub fn fixture_directory(&self) -> Option<String> {
        self.value(INPUT_FILES_SECTION, "directory")
            .filter(|d| !d.trim().is_empty())
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.current()
            .get(section)
            .and_then(|s| s.get(key))
            .cloned()
    }

    /// Current state: the file if readable, otherwise the last good copy.
    fn current(&self) -> Sections {
        let mut cached = self.cached.lock();
        match read_sections(&self.path) {
            Ok(sections) => {
                *cached = sections.clone();
                sections
            }
            Err(e) => {
                tracing::debug!(error = %e, "settings file unreadable, serving cached copy");
                cached.clone()
            }
        }
    }
}

/// Settings written to a fresh file.
pub fn default_sections() -> Sections {
    let mut sections = Sections::new();
    sections.insert(
        HISTORY_SECTION.to_string(),
        Section::from([("max_entries".to_string(), DEFAULT_MAX_ENTRIES.to_string())]),
    );
    sections.insert(
        INPUT_FILES_SECTION.to_string(),
        Section::from([
            ("directory".to_string(), DEFAULT_INPUT_DIRECTORY.to_string()),
            ("refresh_interval".to_string(), "1".to_string()),
        ]),
    );
    sections
}

fn read_sections(path: &Path) -> anyhow::Result<Sections> {
    let text = std::fs::read_to_string(path)?;
    let table: toml::Table = text.parse()?;

    let mut sections = Sections::new();
    for (name, value) in table {
        // Top-level scalars have no section and are ignored.
        let toml::Value::Table(entries) = value else {
            continue;
        };
        let section = entries
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k.to_lowercase(), v)
            })
            .collect();
        sections.insert(name, section);
    }
    Ok(sections)
}

fn write_sections(path: &Path, sections: &Sections) -> Result<(), SettingsError> {
    let text = toml::to_string_pretty(sections)?;
    std::fs::write(path, text).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(tmp: &TempDir) -> SettingsStore {
        SettingsStore::open(tmp.path().join("settings.toml")).unwrap()
    }

    #[test]
    fn test_open_creates_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        assert!(store.path().exists());
        assert_eq!(store.max_entries(), 1000);
        assert_eq!(
            store.fixture_directory().as_deref(),
            Some(DEFAULT_INPUT_DIRECTORY)
        );

        let SettingsView::All(all) = store.get(None) else {
            panic!("expected all sections");
        };
        assert_eq!(all["history"]["max_entries"], "1000");
        assert_eq!(all["input_files"]["refresh_interval"], "1");
    }

    #[test]
    fn test_set_merges_keys() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.set("s", [("a", "1")]).unwrap();
        let updated = store.set("s", [("b", "2")]).unwrap();

        assert_eq!(updated.get("a").map(String::as_str), Some("1"));
        assert_eq!(updated.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_set_overwrites_existing_key() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        let updated = store.set("history", [("max_entries", "5")]).unwrap();
        assert_eq!(updated["max_entries"], "5");
        assert_eq!(store.max_entries(), 5);
    }

    #[test]
    fn test_set_requires_section() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        let err = store.set("", [("a", "1")]).unwrap_err();
        assert!(matches!(err, SettingsError::MissingSection));
        let err = store.set("   ", [("a", "1")]).unwrap_err();
        assert!(matches!(err, SettingsError::MissingSection));
    }

    #[test]
    fn test_get_missing_section_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        assert_eq!(
            store.get(Some("nope")),
            SettingsView::Section(Section::new())
        );
    }

    #[test]
    fn test_keys_are_lowercased() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.set("user", [("Theme", "dark")]).unwrap();
        let SettingsView::Section(user) = store.get(Some("user")) else {
            panic!("expected a section");
        };
        assert_eq!(user.get("theme").map(String::as_str), Some("dark"));
        assert!(!user.contains_key("Theme"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = open_store(&tmp);
            store.set("user", [("theme", "dark")]).unwrap();
        }
        let store = open_store(&tmp);
        assert_eq!(
            store.get(Some("user")),
            SettingsView::Section(Section::from([("theme".to_string(), "dark".to_string())]))
        );
    }

    #[test]
    fn test_external_edit_is_visible() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        std::fs::write(store.path(), "[history]\nmax_entries = 7\n").unwrap();
        assert_eq!(store.max_entries(), 7);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(store.max_entries(), DEFAULT_MAX_ENTRIES);

        // The next write heals the file.
        store.set("user", [("theme", "light")]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("theme"));
        assert!(text.contains("max_entries"));
    }

    #[test]
    fn test_invalid_max_entries_uses_default() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.set("history", [("max_entries", "lots")]).unwrap();
        assert_eq!(store.max_entries(), DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn test_blank_fixture_directory_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp);

        store.set("input_files", [("directory", "  ")]).unwrap();
        assert_eq!(store.fixture_directory(), None);
    }
}
