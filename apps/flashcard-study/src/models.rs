//! Data model for the flashcard study app.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique card identifier, derived from the creation timestamp.
pub type CardId = i64;

/// Model operation failures. Every variant is a recoverable no-op: the
/// collection is unchanged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("category '{0}' already exists")]
    CategoryExists(String),
    #[error("category '{0}' not found")]
    CategoryNotFound(String),
    #[error("category name is empty")]
    EmptyCategoryName,
    #[error("question is empty")]
    EmptyQuestion,
    #[error("answer is empty")]
    EmptyAnswer,
}

pub type ModelResult<T> = Result<T, ModelError>;

/// A question/answer pair with mastery and review metadata.
///
/// The wire form keeps the store's legacy camelCase field names so
/// previously persisted documents keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier, stable for the card's lifetime.
    pub id: CardId,
    /// Prompt shown first.
    pub question: String,
    /// Revealed on flip.
    pub answer: String,
    /// Short free-form labels, may be empty.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Mastery flag.
    #[serde(default)]
    pub known: bool,
    /// Last time a response was recorded for this card.
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Create a new, unreviewed card.
    pub fn new(id: CardId, question: impl Into<String>, answer: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
            tags,
            known: false,
            last_reviewed: None,
            created_at: Utc::now(),
        }
    }
}

/// A named, ordered group of cards. Insertion order is display order;
/// order changes only through [`Collection::shuffle`].
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub cards: Vec<Card>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
        }
    }
}

/// The root aggregate: an ordered sequence of uniquely named
/// categories. Name ordering and membership live in this one structure;
/// the store's legacy parallel name list is derived on save.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    categories: Vec<Category>,
}

impl Collection {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    /// Total number of cards across all categories.
    pub fn total_cards(&self) -> usize {
        self.categories.iter().map(|c| c.cards.len()).sum()
    }

    /// Number of cards marked known across all categories.
    pub fn mastered_cards(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.cards)
            .filter(|card| card.known)
            .count()
    }

    /// Allocate a fresh card id. Ids are creation-timestamp derived;
    /// when two cards land on the same millisecond the id is bumped
    /// past the current maximum instead.
    pub fn next_card_id(&self) -> CardId {
        let max_id = self
            .categories
            .iter()
            .flat_map(|c| &c.cards)
            .map(|card| card.id)
            .max()
            .unwrap_or(0);
        Utc::now().timestamp_millis().max(max_id + 1)
    }

    /// Add an empty category. The name must be non-blank and not an
    /// exact (case-sensitive) duplicate of an existing one.
    pub fn add_category(&mut self, name: &str) -> ModelResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyCategoryName);
        }
        if self.get(name).is_some() {
            return Err(ModelError::CategoryExists(name.to_string()));
        }
        self.categories.push(Category::new(name));
        Ok(())
    }

    /// Append a new card, creating the category on the fly when it does
    /// not exist yet. Blank fields (after trimming) are rejected.
    pub fn add_card(
        &mut self,
        category: &str,
        question: &str,
        answer: &str,
        tags: Vec<String>,
    ) -> ModelResult<CardId> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ModelError::EmptyCategoryName);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(ModelError::EmptyQuestion);
        }
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ModelError::EmptyAnswer);
        }

        let id = self.next_card_id();
        let tags = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let card = Card::new(id, question, answer, tags);

        if let Some(cat) = self.get_mut(category) {
            cat.cards.push(card);
        } else {
            let mut cat = Category::new(category);
            cat.cards.push(card);
            self.categories.push(cat);
        }
        Ok(id)
    }

    /// Set the mastery flag on one card and stamp its review time.
    /// Out-of-range category or index is a silent no-op.
    pub fn mark_known(&mut self, category: &str, index: usize, is_known: bool) {
        if let Some(card) = self
            .get_mut(category)
            .and_then(|cat| cat.cards.get_mut(index))
        {
            card.known = is_known;
            card.last_reviewed = Some(Utc::now());
        }
    }

    /// Reorder a category's cards into a uniformly random permutation.
    /// No-op for zero or one cards, or an unknown category.
    pub fn shuffle<R: Rng>(&mut self, category: &str, rng: &mut R) {
        if let Some(cat) = self.get_mut(category) {
            if cat.cards.len() > 1 {
                // Unbiased single pass from the last index down, swap
                // partner uniform in [0, i].
                for i in (1..cat.cards.len()).rev() {
                    let j = rng.gen_range(0..=i);
                    cat.cards.swap(i, j);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn collection_with(cards: &[(&str, &str)]) -> Collection {
        let mut collection = Collection::default();
        for (q, a) in cards {
            collection.add_card("Math", q, a, vec![]).unwrap();
        }
        collection
    }

    #[test]
    fn add_category_rejects_duplicates() {
        let mut collection = Collection::default();
        collection.add_category("Math").unwrap();
        assert_eq!(
            collection.add_category("Math"),
            Err(ModelError::CategoryExists("Math".to_string()))
        );
        assert_eq!(collection.categories().len(), 1);
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        let mut collection = Collection::default();
        collection.add_category("Math").unwrap();
        collection.add_category("math").unwrap();
        assert_eq!(collection.categories().len(), 2);
    }

    #[test]
    fn add_category_rejects_blank_names() {
        let mut collection = Collection::default();
        assert_eq!(
            collection.add_category("   "),
            Err(ModelError::EmptyCategoryName)
        );
    }

    #[test]
    fn add_card_creates_category_on_the_fly() {
        let mut collection = Collection::default();
        collection
            .add_card("Math", "2+2?", "4", vec![])
            .unwrap();
        let cat = collection.get("Math").unwrap();
        assert_eq!(cat.cards.len(), 1);
        assert!(!cat.cards[0].known);
        assert!(cat.cards[0].last_reviewed.is_none());
    }

    #[test]
    fn add_card_trims_and_validates_fields() {
        let mut collection = Collection::default();
        assert_eq!(
            collection.add_card("Math", "  ", "4", vec![]),
            Err(ModelError::EmptyQuestion)
        );
        assert_eq!(
            collection.add_card("Math", "2+2?", "\t", vec![]),
            Err(ModelError::EmptyAnswer)
        );
        assert!(collection.is_empty());

        collection
            .add_card("Math", " 2+2? ", " 4 ", vec!["  algebra ".into(), " ".into()])
            .unwrap();
        let card = &collection.get("Math").unwrap().cards[0];
        assert_eq!(card.question, "2+2?");
        assert_eq!(card.answer, "4");
        assert_eq!(card.tags, vec!["algebra".to_string()]);
    }

    #[test]
    fn card_ids_are_unique_within_a_burst() {
        let mut collection = Collection::default();
        let mut ids = BTreeSet::new();
        for i in 0..50 {
            let id = collection
                .add_card("Math", &format!("q{i}"), "a", vec![])
                .unwrap();
            assert!(ids.insert(id), "duplicate id {id}");
        }
    }

    #[test]
    fn mark_known_stamps_review_time() {
        let mut collection = collection_with(&[("q", "a")]);
        collection.mark_known("Math", 0, true);
        let card = &collection.get("Math").unwrap().cards[0];
        assert!(card.known);
        assert!(card.last_reviewed.is_some());
    }

    #[test]
    fn mark_known_out_of_range_is_a_no_op() {
        let mut collection = collection_with(&[("q", "a")]);
        collection.mark_known("Math", 5, true);
        collection.mark_known("Nope", 0, true);
        assert!(!collection.get("Math").unwrap().cards[0].known);
    }

    #[test]
    fn shuffle_preserves_the_id_multiset() {
        let mut collection =
            collection_with(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")]);
        let before: BTreeSet<CardId> = collection.get("Math").unwrap().cards.iter().map(|c| c.id).collect();

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        collection.shuffle("Math", &mut rng);

        let after: BTreeSet<CardId> = collection.get("Math").unwrap().cards.iter().map(|c| c.id).collect();
        assert_eq!(before, after);
        assert_eq!(collection.get("Math").unwrap().cards.len(), 5);
    }

    #[test]
    fn shuffle_single_card_is_unchanged() {
        let mut collection = collection_with(&[("q", "a")]);
        let id = collection.get("Math").unwrap().cards[0].id;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        collection.shuffle("Math", &mut rng);
        assert_eq!(collection.get("Math").unwrap().cards[0].id, id);
    }
}
