//! Persistence codec between the in-memory collection and the local
//! store's two legacy entries (`flashcards` object + `categories`
//! name list), plus the auxiliary preference flags.

use localstore::{safe_json_parse, LocalStore, StoreResult};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::Collection;
use crate::repair::repair;

pub const FLASHCARDS_ENTRY: &str = "flashcards";
pub const CATEGORIES_ENTRY: &str = "categories";
pub const DARK_MODE_ENTRY: &str = "darkMode";
pub const INSTRUCTIONS_SHOWN_ENTRY: &str = "instructionsShown";

/// Derived display summary, recomputed fresh from the whole collection
/// on every load and save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub total_cards: usize,
    pub mastered_cards: usize,
}

/// Decode the two raw store texts into a consistent collection.
/// Absent or corrupt entries fall back to empty containers; the result
/// always satisfies the model invariants. Never fails.
pub fn load_collection(
    flashcards_text: Option<&str>,
    categories_text: Option<&str>,
) -> Collection {
    let raw_flashcards = safe_json_parse(flashcards_text, json!({}));
    let raw_categories = safe_json_parse(categories_text, json!([]));
    repair(&raw_flashcards, &raw_categories)
}

/// Encode the collection as the two legacy entries, as JSON values.
/// The name list is derived from the collection itself, so the two
/// entries cannot drift apart.
pub fn encode_values(collection: &Collection) -> (Value, Value) {
    let mut mapping = serde_json::Map::new();
    let mut names = Vec::with_capacity(collection.categories().len());
    for category in collection.categories() {
        // Card serialization is infallible; the fallback is unreachable.
        let cards = serde_json::to_value(&category.cards).unwrap_or(Value::Array(Vec::new()));
        mapping.insert(category.name.clone(), cards);
        names.push(Value::String(category.name.clone()));
    }
    (Value::Object(mapping), Value::Array(names))
}

/// Encode the collection as the two store text documents.
pub fn encode_collection(collection: &Collection) -> (String, String) {
    let (flashcards, categories) = encode_values(collection);
    (flashcards.to_string(), categories.to_string())
}

/// The flashcard app's view of the local store.
pub struct StudyStore {
    store: LocalStore,
    summary: StoreSummary,
}

impl StudyStore {
    pub fn open(dir: impl Into<std::path::PathBuf>) -> StoreResult<Self> {
        Ok(Self {
            store: LocalStore::open(dir)?,
            summary: StoreSummary::default(),
        })
    }

    /// Load, repair, and summarize the persisted collection. Corrupt
    /// or missing data degrades to an empty collection, never an error.
    pub fn load(&mut self) -> Collection {
        let collection = load_collection(
            self.store.get(FLASHCARDS_ENTRY).as_deref(),
            self.store.get(CATEGORIES_ENTRY).as_deref(),
        );
        self.summary = summarize(&collection);
        info!(
            total = self.summary.total_cards,
            mastered = self.summary.mastered_cards,
            "collection loaded"
        );
        collection
    }

    /// Rewrite both entries from the full collection. Each entry is a
    /// single whole-document write.
    pub fn save(&mut self, collection: &Collection) -> StoreResult<()> {
        let (flashcards, categories) = encode_collection(collection);
        self.store.set(FLASHCARDS_ENTRY, &flashcards)?;
        self.store.set(CATEGORIES_ENTRY, &categories)?;
        self.summary = summarize(collection);
        Ok(())
    }

    pub fn summary(&self) -> StoreSummary {
        self.summary
    }

    pub fn dark_mode(&self) -> bool {
        self.store.get(DARK_MODE_ENTRY).as_deref() == Some("true")
    }

    pub fn set_dark_mode(&self, on: bool) {
        if let Err(err) = self.store.set(DARK_MODE_ENTRY, if on { "true" } else { "false" }) {
            warn!(%err, "failed to persist theme preference");
        }
    }

    /// Presence-only first-launch flag.
    pub fn instructions_shown(&self) -> bool {
        self.store.contains(INSTRUCTIONS_SHOWN_ENTRY)
    }

    pub fn set_instructions_shown(&self) {
        if let Err(err) = self.store.set(INSTRUCTIONS_SHOWN_ENTRY, "true") {
            warn!(%err, "failed to persist instructions flag");
        }
    }
}

fn summarize(collection: &Collection) -> StoreSummary {
    StoreSummary {
        total_cards: collection.total_cards(),
        mastered_cards: collection.mastered_cards(),
    }
}
