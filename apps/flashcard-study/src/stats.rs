//! Derived statistics over a collection: mastery counts, review
//! recency, day streaks, and the dashboard activity series.
//!
//! Timestamps are stored in UTC; anything day-granular (streak,
//! activity chart) is computed against the local calendar day.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::models::Collection;

/// Per-category counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub total: usize,
    pub mastered: usize,
    pub recently_reviewed: usize,
}

impl CategoryStats {
    /// Mastery as a rounded percentage; an empty category is 0%, never
    /// a division error.
    pub fn mastery_percent(&self) -> u8 {
        percent(self.mastered, self.total)
    }
}

/// Whole-collection counters plus the per-category breakdown, in
/// category display order.
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    pub total: usize,
    pub mastered: usize,
    pub recently_reviewed: usize,
    pub per_category: Vec<(String, CategoryStats)>,
}

impl CollectionStats {
    pub fn mastery_percent(&self) -> u8 {
        percent(self.mastered, self.total)
    }
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u8
    }
}

/// Compute totals, mastery, and recent-review counts. "Recent" means a
/// review strictly within the last 24 hours of `now`.
pub fn collection_stats(collection: &Collection, now: DateTime<Utc>) -> CollectionStats {
    let cutoff = now - Duration::hours(24);
    let mut stats = CollectionStats::default();

    for category in collection.categories() {
        let cat = CategoryStats {
            total: category.cards.len(),
            mastered: category.cards.iter().filter(|c| c.known).count(),
            recently_reviewed: category
                .cards
                .iter()
                .filter(|c| c.last_reviewed.is_some_and(|ts| ts > cutoff))
                .count(),
        };
        stats.total += cat.total;
        stats.mastered += cat.mastered;
        stats.recently_reviewed += cat.recently_reviewed;
        stats.per_category.push((category.name.clone(), cat));
    }
    stats
}

/// Number of cards reviewed on a given local calendar day.
pub fn reviews_on(collection: &Collection, day: NaiveDate) -> usize {
    collection
        .categories()
        .iter()
        .flat_map(|c| &c.cards)
        .filter(|card| {
            card.last_reviewed
                .is_some_and(|ts| ts.with_timezone(&Local).date_naive() == day)
        })
        .count()
}

/// Consecutive days with review activity, walking backward from
/// `today`. Today always counts, even before any review; the walk
/// stops at the first earlier day with no activity, or at `cap` days.
pub fn day_streak_from(collection: &Collection, today: NaiveDate, cap: u32) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while streak < cap {
        if day != today && reviews_on(collection, day) == 0 {
            break;
        }
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Day streak ending at the current local day.
pub fn day_streak(collection: &Collection, cap: u32) -> u32 {
    day_streak_from(collection, Local::now().date_naive(), cap)
}

/// Review counts for the last seven local days, oldest first.
pub fn last_7_days_activity(collection: &Collection) -> Vec<(NaiveDate, usize)> {
    let today = Local::now().date_naive();
    (0..7)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            (day, reviews_on(collection, day))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Noon (local) on the day `back` days before today, in UTC.
    fn reviewed_days_ago(back: i64) -> DateTime<Utc> {
        let day = Local::now().date_naive() - Duration::days(back);
        Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Build a collection through repair so `lastReviewed` can be set
    /// to specific days instead of the "now" that `mark_known` stamps.
    fn collection_reviewed_on(days_back: &[i64]) -> Collection {
        let entries: Vec<serde_json::Value> = days_back
            .iter()
            .enumerate()
            .map(|(i, back)| {
                let ts = reviewed_days_ago(*back);
                serde_json::json!({
                    "id": i as i64 + 1,
                    "question": format!("q{i}"),
                    "answer": "a",
                    "known": true,
                    "lastReviewed": ts.to_rfc3339(),
                    "createdAt": ts.to_rfc3339(),
                })
            })
            .collect();
        crate::repair::repair(
            &serde_json::json!({ "Math": entries }),
            &serde_json::json!(["Math"]),
        )
    }

    #[test]
    fn mastery_percent_rounds_to_nearest() {
        let stats = CategoryStats { total: 3, mastered: 1, recently_reviewed: 0 };
        assert_eq!(stats.mastery_percent(), 33);
        let stats = CategoryStats { total: 3, mastered: 2, recently_reviewed: 0 };
        assert_eq!(stats.mastery_percent(), 67);
        let stats = CategoryStats { total: 0, mastered: 0, recently_reviewed: 0 };
        assert_eq!(stats.mastery_percent(), 0);
    }

    #[test]
    fn stats_count_mastered_and_totals() {
        let mut collection = Collection::default();
        collection.add_card("Math", "q1", "a", vec![]).unwrap();
        collection.add_card("Math", "q2", "a", vec![]).unwrap();
        collection.add_card("Science", "q3", "a", vec![]).unwrap();
        collection.mark_known("Math", 0, true);

        let stats = collection_stats(&collection, Utc::now());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.mastered, 1);
        let math = &stats.per_category[0].1;
        assert_eq!((math.total, math.mastered), (2, 1));
        assert_eq!(math.mastery_percent(), 50);
    }

    #[test]
    fn recently_reviewed_uses_a_strict_24h_window() {
        let collection = collection_reviewed_on(&[0, 2]);
        let stats = collection_stats(&collection, Utc::now());
        // Noon today is inside the window, two days ago is out.
        assert_eq!(stats.recently_reviewed, 1);
    }

    #[test]
    fn streak_is_one_with_no_activity() {
        let collection = Collection::default();
        assert_eq!(day_streak(&collection, 3650), 1);
    }

    #[test]
    fn streak_counts_consecutive_days_and_stops_at_a_gap() {
        // Reviews today, yesterday, and 3 days ago: gap at day 2.
        let collection = collection_reviewed_on(&[0, 1, 3]);
        assert_eq!(day_streak(&collection, 3650), 2);
    }

    #[test]
    fn streak_includes_today_even_without_activity_today() {
        // Reviews yesterday and the day before only.
        let collection = collection_reviewed_on(&[1, 2]);
        assert_eq!(day_streak(&collection, 3650), 3);
    }

    #[test]
    fn streak_respects_the_lookback_cap() {
        let collection = collection_reviewed_on(&[0, 1, 2, 3, 4]);
        assert_eq!(day_streak(&collection, 3), 3);
    }

    #[test]
    fn activity_series_covers_seven_days_oldest_first() {
        let collection = collection_reviewed_on(&[0, 0, 6]);
        let series = last_7_days_activity(&collection);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].1, 1, "six days back");
        assert_eq!(series[6].1, 2, "today");
        assert!(series.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
