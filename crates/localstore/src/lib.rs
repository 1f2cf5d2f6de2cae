//! Named text entries persisted in a local data directory.
//!
//! Each entry is a single file (`<name>.json`) holding one whole
//! document. Reads of missing or unreadable entries yield `None`;
//! writes replace the entire document in one atomic step. There are no
//! partial updates and no locking: last write wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Store errors. Reads never produce these; only writes can fail.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid entry name: {0:?}")]
    InvalidName(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A directory of named text entries.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory this store lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, name: &str) -> StoreResult<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// Read an entry. Missing or unreadable entries are `None`.
    pub fn get(&self, name: &str) -> Option<String> {
        let path = self.entry_path(name).ok()?;
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(entry = name, %err, "unreadable store entry");
                None
            }
        }
    }

    /// Write an entry as one whole document. The text lands in a
    /// sibling temp file first and is renamed into place, so a reader
    /// never observes a partially written entry.
    pub fn set(&self, name: &str, text: &str) -> StoreResult<()> {
        let path = self.entry_path(name)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Remove an entry, ignoring absence.
    pub fn remove(&self, name: &str) -> StoreResult<()> {
        let path = self.entry_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Check whether an entry exists (presence-only flags).
    pub fn contains(&self, name: &str) -> bool {
        self.entry_path(name).map(|p| p.exists()).unwrap_or(false)
    }
}

/// Parse `text` as JSON, falling back to `fallback` when the text is
/// absent, empty, or corrupt. Never errors.
pub fn safe_json_parse(text: Option<&str>, fallback: serde_json::Value) -> serde_json::Value {
    match text {
        Some(t) if !t.trim().is_empty() => match serde_json::from_str(t) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "discarding corrupt store entry");
                fallback
            }
        },
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.get("flashcards"), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set("flashcards", r#"{"Math":[]}"#).unwrap();
        assert_eq!(store.get("flashcards").as_deref(), Some(r#"{"Math":[]}"#));
    }

    #[test]
    fn set_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set("categories", r#"["Math","Science"]"#).unwrap();
        store.set("categories", r#"["Math"]"#).unwrap();
        assert_eq!(store.get("categories").as_deref(), Some(r#"["Math"]"#));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set("darkMode", "true").unwrap();
        store.remove("darkMode").unwrap();
        store.remove("darkMode").unwrap();
        assert!(!store.contains("darkMode"));
    }

    #[test]
    fn rejects_path_traversal_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert!(store.set("../escape", "{}").is_err());
        assert_eq!(store.get("a/b"), None);
    }

    #[test]
    fn safe_parse_falls_back_on_garbage() {
        assert_eq!(safe_json_parse(None, json!({})), json!({}));
        assert_eq!(safe_json_parse(Some(""), json!([])), json!([]));
        assert_eq!(safe_json_parse(Some("{not json"), json!({})), json!({}));
        assert_eq!(
            safe_json_parse(Some(r#"{"a":1}"#), json!({})),
            json!({"a": 1})
        );
    }
}
