//! Study session control: which card is showing, which face is up,
//! and what a response is worth.
//!
//! With no session active the app is idle. Starting one selects a
//! category and shows card 0 question-side up; a flip reveals the
//! answer; a response records mastery on the model, earns XP, and
//! advances circularly to the next card's question face.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::models::{Card, Collection, ModelError, ModelResult};
use crate::stats;

/// XP for reviewing a card with a "known" response.
pub const XP_PER_CARD: u32 = 10;
/// Per-day multiplier applied on streaks longer than one day.
pub const XP_STREAK_BONUS: u32 = 5;
/// Streak days counted toward the bonus are capped here.
pub const XP_STREAK_CAP: u32 = 7;

/// How long a flip animation is considered in flight; flips inside
/// this window are ignored.
const FLIP_WINDOW: Duration = Duration::from_millis(600);

/// Which face of the current card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Question,
    Answer,
}

/// Observational milestones emitted after a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    /// Category hit 100% mastery.
    Mastered,
    /// Category is at 75% or better, short of full mastery.
    NearMastery,
}

/// XP earned by one response, by component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reward {
    pub base: u32,
    pub first_time_bonus: u32,
    pub streak_bonus: u32,
}

impl Reward {
    pub fn total(&self) -> u32 {
        self.base + self.first_time_bonus + self.streak_bonus
    }
}

/// What one response produced, for the UI to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseOutcome {
    pub reward: Reward,
    pub achievement: Option<Achievement>,
}

/// An active study pass over one category.
#[derive(Debug)]
pub struct StudySession {
    category: String,
    index: usize,
    face: CardFace,
    last_flip: Option<Instant>,
    xp_earned: u32,
    cards_reviewed: usize,
}

impl StudySession {
    /// Select a category and show its first card. Fails when the
    /// category is absent or has no cards.
    pub fn start(collection: &Collection, category: &str) -> ModelResult<Self> {
        match collection.get(category) {
            Some(cat) if !cat.cards.is_empty() => Ok(Self {
                category: category.to_string(),
                index: 0,
                face: CardFace::Question,
                last_flip: None,
                xp_earned: 0,
                cards_reviewed: 0,
            }),
            _ => Err(ModelError::CategoryNotFound(category.to_string())),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn face(&self) -> CardFace {
        self.face
    }

    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }

    pub fn cards_reviewed(&self) -> usize {
        self.cards_reviewed
    }

    pub fn card_count(&self, collection: &Collection) -> usize {
        collection.get(&self.category).map_or(0, |c| c.cards.len())
    }

    pub fn current_card<'a>(&self, collection: &'a Collection) -> Option<&'a Card> {
        collection
            .get(&self.category)
            .and_then(|cat| cat.cards.get(self.index))
    }

    /// Toggle between question and answer. A flip arriving while the
    /// previous flip's animation window is still open is ignored;
    /// returns whether the flip was applied.
    pub fn flip(&mut self) -> bool {
        if self
            .last_flip
            .is_some_and(|at| at.elapsed() < FLIP_WINDOW)
        {
            return false;
        }
        self.face = match self.face {
            CardFace::Question => CardFace::Answer,
            CardFace::Answer => CardFace::Question,
        };
        self.last_flip = Some(Instant::now());
        true
    }

    /// Record the user's verdict on the current card: update mastery on
    /// the model, compute the reward, and advance circularly to the
    /// next card's question face. `day_streak` is the streak in effect
    /// when the response happened. No-op (`None`) if the category has
    /// vanished or emptied underneath the session.
    pub fn respond(
        &mut self,
        collection: &mut Collection,
        is_known: bool,
        day_streak: u32,
    ) -> Option<ResponseOutcome> {
        let count = self.card_count(collection);
        if count == 0 {
            return None;
        }
        self.index = self.index.min(count - 1);

        let was_known = self.current_card(collection)?.known;
        collection.mark_known(&self.category, self.index, is_known);

        let reward = if is_known {
            Reward {
                base: XP_PER_CARD,
                first_time_bonus: if was_known { 0 } else { XP_PER_CARD * 2 },
                streak_bonus: if day_streak > 1 {
                    XP_STREAK_BONUS * day_streak.min(XP_STREAK_CAP)
                } else {
                    0
                },
            }
        } else {
            Reward::default()
        };
        self.xp_earned += reward.total();
        self.cards_reviewed += 1;

        let achievement = self.achievement(collection);

        self.index = (self.index + 1) % count;
        self.face = CardFace::Question;

        Some(ResponseOutcome { reward, achievement })
    }

    /// Shuffle the session's category and restart from the first card.
    pub fn shuffle<R: Rng>(&mut self, collection: &mut Collection, rng: &mut R) {
        collection.shuffle(&self.category, rng);
        self.index = 0;
        self.face = CardFace::Question;
    }

    fn achievement(&self, collection: &Collection) -> Option<Achievement> {
        let cat = stats::collection_stats(collection, chrono::Utc::now())
            .per_category
            .into_iter()
            .find(|(name, _)| name == &self.category)?
            .1;
        match cat.mastery_percent() {
            100 => Some(Achievement::Mastered),
            75..=99 => Some(Achievement::NearMastery),
            _ => None,
        }
    }
}
