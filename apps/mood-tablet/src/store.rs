//! Persistence for the mood tablet: the `moodEntries` document plus
//! the username and accent-color preferences.

use localstore::{safe_json_parse, LocalStore, StoreResult};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::{repair_entries, validate_accent, MoodLog};

pub const ENTRIES_ENTRY: &str = "moodEntries";
pub const USERNAME_ENTRY: &str = "moodTabletUsername";
pub const ACCENT_ENTRY: &str = "moodTabletAccentColor";

pub const DEFAULT_ACCENT: &str = "#FF4081";

pub struct MoodStore {
    store: LocalStore,
}

impl MoodStore {
    pub fn open(dir: impl Into<std::path::PathBuf>) -> StoreResult<Self> {
        Ok(Self {
            store: LocalStore::open(dir)?,
        })
    }

    /// Load and repair the entry log. Corrupt or missing data degrades
    /// to an empty log, never an error.
    pub fn load(&self) -> MoodLog {
        let raw = safe_json_parse(self.store.get(ENTRIES_ENTRY).as_deref(), json!([]));
        let log = repair_entries(&raw);
        info!(entries = log.entries().len(), "mood log loaded");
        log
    }

    /// Rewrite the whole entry document in one write.
    pub fn save(&self, log: &MoodLog) -> StoreResult<()> {
        // Entry serialization is infallible; the fallback is unreachable.
        let doc = serde_json::to_value(log.entries()).unwrap_or(Value::Array(Vec::new()));
        self.store.set(ENTRIES_ENTRY, &doc.to_string())
    }

    pub fn username(&self) -> Option<String> {
        self.store.get(USERNAME_ENTRY).filter(|name| !name.is_empty())
    }

    pub fn set_username(&self, name: &str) {
        if let Err(err) = self.store.set(USERNAME_ENTRY, name) {
            warn!(%err, "failed to persist username");
        }
    }

    /// Saved accent color, falling back to the default on anything
    /// that is not `#RRGGBB`.
    pub fn accent_color(&self) -> String {
        self.store
            .get(ACCENT_ENTRY)
            .as_deref()
            .and_then(validate_accent)
            .unwrap_or(DEFAULT_ACCENT)
            .to_string()
    }

    pub fn set_accent_color(&self, color: &str) {
        if validate_accent(color).is_none() {
            warn!(color, "ignoring invalid accent color");
            return;
        }
        if let Err(err) = self.store.set(ACCENT_ENTRY, color) {
            warn!(%err, "failed to persist accent color");
        }
    }

    /// Logging out clears the identity preferences but keeps the
    /// mood history.
    pub fn clear_user(&self) {
        for entry in [USERNAME_ENTRY, ACCENT_ENTRY] {
            if let Err(err) = self.store.remove(entry) {
                warn!(%err, entry, "failed to clear preference");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mood, MoodEntry};
    use chrono::NaiveDate;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = MoodStore::open(dir.path()).unwrap();

        let mut log = MoodLog::default();
        log.add(MoodEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            mood: Mood::Excited,
            note: "launch day".to_string(),
        });
        store.save(&log).unwrap();

        let loaded = MoodStore::open(dir.path()).unwrap().load();
        assert_eq!(loaded.entries(), log.entries());
    }

    #[test]
    fn corrupt_entries_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let raw = LocalStore::open(dir.path()).unwrap();
        raw.set(ENTRIES_ENTRY, "][ garbage").unwrap();

        let store = MoodStore::open(dir.path()).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn username_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = MoodStore::open(dir.path()).unwrap();
        assert_eq!(store.username(), None);

        store.set_username("ana");
        assert_eq!(store.username().as_deref(), Some("ana"));

        store.clear_user();
        assert_eq!(store.username(), None);
    }

    #[test]
    fn accent_color_falls_back_on_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = MoodStore::open(dir.path()).unwrap();
        assert_eq!(store.accent_color(), DEFAULT_ACCENT);

        store.set_accent_color("#00FF00");
        assert_eq!(store.accent_color(), "#00FF00");

        store.set_accent_color("green");
        assert_eq!(store.accent_color(), "#00FF00", "invalid value ignored");

        store.clear_user();
        assert_eq!(store.accent_color(), DEFAULT_ACCENT);
    }
}
