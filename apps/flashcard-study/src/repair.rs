//! Validation and repair of decoded store documents.
//!
//! [`repair`] is total: whatever shape the two raw JSON values have, it
//! returns a [`Collection`] satisfying the model invariants — every
//! category named and non-empty, every card carrying a numeric id and
//! non-blank question/answer, timestamps valid or absent. It is also
//! idempotent: repairing an already-repaired collection changes
//! nothing.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::models::{Card, Category, Collection};

/// Rebuild a consistent collection from raw decoded store entries.
pub fn repair(raw_flashcards: &Value, raw_categories: &Value) -> Collection {
    // Non-mapping flashcards and non-sequence category lists are
    // replaced by empty containers outright.
    let empty_map = serde_json::Map::new();
    let mapping = raw_flashcards.as_object().unwrap_or(&empty_map);

    // Surviving category names: non-empty trimmed strings, first
    // occurrence wins.
    let mut names: Vec<String> = Vec::new();
    if let Some(raw_names) = raw_categories.as_array() {
        for raw in raw_names {
            if let Some(name) = raw.as_str() {
                let name = name.trim();
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
    }

    // Repair every mapping entry; keys collapse to their trimmed form.
    let mut repaired: Vec<(String, Vec<Card>)> = Vec::new();
    for (key, value) in mapping {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let cards = repair_cards(value);
        match repaired.iter_mut().find(|(name, _)| name == key) {
            Some((_, existing)) => existing.extend(cards),
            None => repaired.push((key.to_string(), cards)),
        }
    }

    // Orphan cleanup, both directions: list names keep their order and
    // survive only with at least one card; mapping keys missing from
    // the list are appended afterwards (serde_json objects iterate in
    // sorted key order, so the result is deterministic).
    let mut categories: Vec<Category> = Vec::new();
    for name in &names {
        if let Some((_, cards)) = repaired.iter().find(|(key, _)| key == name) {
            if !cards.is_empty() {
                categories.push(Category {
                    name: name.clone(),
                    cards: cards.clone(),
                });
            }
        }
    }
    for (key, cards) in repaired {
        if !cards.is_empty() && !names.iter().any(|n| *n == key) {
            debug!(category = %key, "restoring category missing from name list");
            categories.push(Category { name: key, cards });
        }
    }

    Collection::new(categories)
}

/// Repair one category's card sequence. Non-sequences become empty;
/// entries failing the card predicate are dropped; survivors are
/// normalized field by field.
fn repair_cards(value: &Value) -> Vec<Card> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries.iter().filter_map(repair_card).collect()
}

/// The card predicate plus normalization. `None` drops the entry.
fn repair_card(value: &Value) -> Option<Card> {
    let obj = value.as_object()?;

    let question = obj.get("question")?.as_str()?;
    let answer = obj.get("answer")?.as_str()?;
    if question.trim().is_empty() || answer.trim().is_empty() {
        return None;
    }
    let id = numeric_id(obj.get("id")?)?;

    Some(Card {
        id,
        question: question.to_string(),
        answer: answer.to_string(),
        tags: obj
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        known: obj.get("known").map(truthy).unwrap_or(false),
        last_reviewed: obj.get("lastReviewed").and_then(parse_timestamp),
        created_at: obj
            .get("createdAt")
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now),
    })
}

fn numeric_id(value: &Value) -> Option<i64> {
    let n = value.as_number()?;
    n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))
}

/// JavaScript-style truthiness, matching how the legacy store coerced
/// the `known` flag.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Accept only timestamp text that actually parses; anything else
/// repairs to absent.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::encode_values;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn garbage_inputs_yield_an_empty_collection() {
        for (fc, cats) in [
            (Value::Null, Value::Null),
            (json!(42), json!("nope")),
            (json!([1, 2, 3]), json!({"a": 1})),
            (json!("text"), json!([null, 7, {}])),
        ] {
            let collection = repair(&fc, &cats);
            assert!(collection.is_empty(), "input {fc}/{cats}");
        }
    }

    #[test]
    fn cards_failing_the_predicate_are_dropped() {
        let fc = json!({
            "Math": [
                {"id": 1, "question": "2+2?", "answer": "4"},
                {"id": 2, "question": "  ", "answer": "blank question"},
                {"id": 3, "question": "no answer", "answer": ""},
                {"question": "no id", "answer": "x"},
                {"id": "4", "question": "string id", "answer": "x"},
                "not an object",
                null
            ]
        });
        let collection = repair(&fc, &json!(["Math"]));
        let cards = &collection.get("Math").unwrap().cards;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "2+2?");
    }

    #[test]
    fn surviving_cards_are_normalized() {
        let fc = json!({
            "Math": [{
                "id": 9,
                "question": "q",
                "answer": "a",
                "known": "yes",
                "lastReviewed": "not a date",
                "createdAt": 0,
                "tags": ["t", 5, null]
            }]
        });
        let collection = repair(&fc, &json!(["Math"]));
        let card = &collection.get("Math").unwrap().cards[0];
        assert!(card.known, "non-empty string is truthy");
        assert_eq!(card.last_reviewed, None);
        assert_eq!(card.tags, vec!["t".to_string()]);
        // createdAt was falsy, so it was freshly stamped.
        assert!(card.created_at <= Utc::now());
    }

    #[test]
    fn known_coercion_follows_store_truthiness() {
        let variants = [
            (json!(true), true),
            (json!(false), false),
            (json!(0), false),
            (json!(2), true),
            (json!(""), false),
            (json!("false"), true),
            (json!(null), false),
            (json!([]), true),
        ];
        for (raw, expected) in variants {
            let fc = json!({"C": [{"id": 1, "question": "q", "answer": "a", "known": raw}]});
            let collection = repair(&fc, &json!(["C"]));
            assert_eq!(
                collection.get("C").unwrap().cards[0].known,
                expected,
            );
        }
    }

    #[test]
    fn orphaned_names_are_pruned() {
        let fc = json!({"Math": [], "Ghost": "not an array"});
        let cats = json!(["Math", "Ghost", "Missing"]);
        assert!(repair(&fc, &cats).is_empty());
    }

    #[test]
    fn mapping_keys_missing_from_the_name_list_are_restored() {
        let fc = json!({
            "Listed": [{"id": 1, "question": "q", "answer": "a"}],
            "Unlisted": [{"id": 2, "question": "q", "answer": "a"}]
        });
        let collection = repair(&fc, &json!(["Listed"]));
        let names: Vec<_> = collection.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Listed", "Unlisted"]);
    }

    #[test]
    fn name_list_order_is_preserved() {
        let fc = json!({
            "A": [{"id": 1, "question": "q", "answer": "a"}],
            "B": [{"id": 2, "question": "q", "answer": "a"}],
            "C": [{"id": 3, "question": "q", "answer": "a"}]
        });
        let collection = repair(&fc, &json!(["C", "A", "B"]));
        let names: Vec<_> = collection.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn duplicate_names_collapse_to_first_occurrence() {
        let fc = json!({"Math": [{"id": 1, "question": "q", "answer": "a"}]});
        let collection = repair(&fc, &json!(["Math", "Math"]));
        assert_eq!(collection.categories().len(), 1);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z ]{0,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// `repair` never panics and its output re-repairs to itself.
        #[test]
        fn repair_is_total_and_idempotent(fc in arb_json(), cats in arb_json()) {
            let once = repair(&fc, &cats);
            let (fc2, cats2) = encode_values(&once);
            let twice = repair(&fc2, &cats2);
            prop_assert_eq!(encode_values(&twice), (fc2, cats2));
        }

        /// Post-repair invariants hold for arbitrary input.
        #[test]
        fn repair_output_satisfies_invariants(fc in arb_json(), cats in arb_json()) {
            let collection = repair(&fc, &cats);
            let mut seen = std::collections::BTreeSet::new();
            for category in collection.categories() {
                prop_assert!(!category.name.trim().is_empty());
                prop_assert_eq!(category.name.trim(), category.name.as_str());
                prop_assert!(seen.insert(category.name.clone()), "duplicate name");
                prop_assert!(!category.cards.is_empty(), "empty category survived");
                for card in &category.cards {
                    prop_assert!(!card.question.trim().is_empty());
                    prop_assert!(!card.answer.trim().is_empty());
                }
            }
        }
    }
}
