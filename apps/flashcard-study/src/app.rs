//! Application state and key handling.
//!
//! All mutations go through the model and session operations; this
//! layer translates key events into those calls, persists after every
//! mutating operation, and holds transient UI state (input flows,
//! messages, the help popup).

use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use crate::config::Config;
use crate::models::Collection;
use crate::session::{Achievement, StudySession};
use crate::stats;
use crate::store::StudyStore;

pub struct App {
    pub store: StudyStore,
    pub config: Config,
    pub collection: Collection,
    pub view: View,
    pub selected_category: usize,
    pub session: Option<StudySession>,
    pub dark_mode: bool,
    pub editing: bool,
    pub input_buffer: String,
    pub input_field: InputField,
    pub card_draft: CardDraft,
    pub message: Option<(String, MessageType)>,
    pub show_help: bool,
}

/// Current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// First-launch walkthrough, shown until dismissed once.
    Instructions,
    Dashboard,
    Study,
    Stats,
}

/// Which input the editing popup is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    None,
    CategoryName,
    CardCategory,
    CardQuestion,
    CardAnswer,
    CardTags,
}

/// Partially entered card, filled across the input fields.
#[derive(Debug, Clone, Default)]
pub struct CardDraft {
    pub category: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Error,
}

impl App {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::load();

        let data_dir = Config::data_dir().unwrap_or_else(|| "flashcard-study-data".into());
        let mut store = match StudyStore::open(&data_dir) {
            Ok(store) => store,
            Err(err) => {
                // Never refuse to start over a bad data dir; fall back
                // to the working directory.
                warn!(%err, dir = %data_dir.display(), "data dir unusable, falling back");
                StudyStore::open("flashcard-study-data")?
            }
        };

        let collection = store.load();
        // Write the repaired form straight back so the on-disk entries
        // are consistent from the first frame; a corrupt store becomes
        // a clean empty one instead of an error.
        if let Err(err) = store.save(&collection) {
            warn!(%err, "failed to persist repaired collection");
        }
        let dark_mode = store.dark_mode();
        let view = if store.instructions_shown() {
            View::Dashboard
        } else {
            View::Instructions
        };

        Ok(Self {
            store,
            config,
            collection,
            view,
            selected_category: 0,
            session: None,
            dark_mode,
            editing: false,
            input_buffer: String::new(),
            input_field: InputField::None,
            card_draft: CardDraft::default(),
            message: None,
            show_help: false,
        })
    }

    /// 'q' quits only from the dashboard; everywhere else it is a
    /// view-local key (back, end session, or plain text input).
    pub fn can_quit(&self) -> bool {
        !self.editing && self.session.is_none() && self.view == View::Dashboard
    }

    pub fn selected_category_name(&self) -> Option<&str> {
        self.collection
            .categories()
            .get(self.selected_category)
            .map(|c| c.name.as_str())
    }

    pub fn day_streak(&self) -> u32 {
        stats::day_streak(&self.collection, self.config.study.streak_lookback_days)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        self.message = None;

        if self.editing {
            self.handle_edit_key(key);
            return;
        }

        match self.view {
            View::Instructions => self.dismiss_instructions(),
            View::Dashboard => self.handle_dashboard_key(key),
            View::Study => self.handle_study_key(key),
            View::Stats => self.handle_stats_key(key),
        }
    }

    fn dismiss_instructions(&mut self) {
        self.store.set_instructions_shown();
        self.view = View::Dashboard;
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.collection.is_empty() {
                    self.selected_category =
                        (self.selected_category + 1).min(self.collection.categories().len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_category = self.selected_category.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.start_study(),
            KeyCode::Char('a') => {
                self.editing = true;
                self.input_field = InputField::CategoryName;
                self.input_buffer.clear();
            }
            KeyCode::Char('c') => {
                self.editing = true;
                self.input_field = InputField::CardCategory;
                self.card_draft = CardDraft::default();
                self.input_buffer = self
                    .selected_category_name()
                    .unwrap_or_default()
                    .to_string();
            }
            KeyCode::Char('s') => self.view = View::Stats,
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_study_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(session) = &mut self.session {
                    session.flip();
                }
            }
            KeyCode::Right | KeyCode::Char('k') => self.respond(true),
            KeyCode::Left | KeyCode::Char('d') => self.respond(false),
            KeyCode::Char('r') => self.shuffle(),
            KeyCode::Char('q') | KeyCode::Esc => self.end_session(),
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.view = View::Dashboard,
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing = false;
                self.input_buffer.clear();
                self.input_field = InputField::None;
                self.card_draft = CardDraft::default();
            }
            KeyCode::Enter => self.finish_editing(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn finish_editing(&mut self) {
        match self.input_field {
            InputField::CategoryName => {
                match self.collection.add_category(&self.input_buffer) {
                    Ok(()) => {
                        self.persist();
                        self.set_message("Category added", MessageType::Success);
                    }
                    Err(err) => self.set_message(err.to_string(), MessageType::Error),
                }
            }
            InputField::CardCategory => {
                self.card_draft.category = self.input_buffer.trim().to_string();
                self.advance_input(InputField::CardQuestion);
                return;
            }
            InputField::CardQuestion => {
                self.card_draft.question = self.input_buffer.clone();
                self.advance_input(InputField::CardAnswer);
                return;
            }
            InputField::CardAnswer => {
                self.card_draft.answer = self.input_buffer.clone();
                self.advance_input(InputField::CardTags);
                return;
            }
            InputField::CardTags => {
                let tags: Vec<String> =
                    self.input_buffer.split(',').map(str::to_string).collect();
                let draft = std::mem::take(&mut self.card_draft);
                match self.collection.add_card(
                    &draft.category,
                    &draft.question,
                    &draft.answer,
                    tags,
                ) {
                    Ok(_) => {
                        self.persist();
                        self.set_message("Card added", MessageType::Success);
                    }
                    Err(err) => self.set_message(err.to_string(), MessageType::Error),
                }
            }
            InputField::None => {}
        }
        self.editing = false;
        self.input_buffer.clear();
        self.input_field = InputField::None;
    }

    fn advance_input(&mut self, next: InputField) {
        self.input_field = next;
        self.input_buffer.clear();
    }

    fn start_study(&mut self) {
        let Some(name) = self.selected_category_name().map(str::to_string) else {
            return;
        };
        match StudySession::start(&self.collection, &name) {
            Ok(session) => {
                self.session = Some(session);
                self.view = View::Study;
            }
            Err(err) => self.set_message(err.to_string(), MessageType::Error),
        }
    }

    fn respond(&mut self, is_known: bool) {
        let streak = self.day_streak();
        let Some(session) = &mut self.session else {
            return;
        };
        let Some(outcome) = session.respond(&mut self.collection, is_known, streak) else {
            return;
        };
        self.persist();

        let (text, kind) = match outcome.achievement {
            Some(Achievement::Mastered) => {
                ("Category mastered! Amazing job!".to_string(), MessageType::Success)
            }
            Some(Achievement::NearMastery) => {
                ("Getting close to mastery!".to_string(), MessageType::Success)
            }
            None if is_known => (
                format!("Great job! +{} XP", outcome.reward.total()),
                MessageType::Success,
            ),
            None => ("You'll get it next time!".to_string(), MessageType::Info),
        };
        self.set_message(text, kind);
    }

    fn shuffle(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        session.shuffle(&mut self.collection, &mut rand::thread_rng());
        self.persist();
        self.set_message("Cards shuffled", MessageType::Info);
    }

    fn end_session(&mut self) {
        self.session = None;
        self.view = View::Dashboard;
        if self.selected_category >= self.collection.categories().len() {
            self.selected_category = self.collection.categories().len().saturating_sub(1);
        }
    }

    fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.store.set_dark_mode(self.dark_mode);
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.collection) {
            warn!(%err, "failed to persist collection");
            self.set_message("Could not save your changes", MessageType::Error);
        }
    }

    fn set_message(&mut self, text: impl Into<String>, kind: MessageType) {
        self.message = Some((text.into(), kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelError;
    use crate::session::XP_PER_CARD;

    fn app_in_temp(dir: &std::path::Path) -> App {
        let mut store = StudyStore::open(dir).unwrap();
        let collection = store.load();
        App {
            store,
            config: Config::default(),
            collection,
            view: View::Dashboard,
            selected_category: 0,
            session: None,
            dark_mode: false,
            editing: false,
            input_buffer: String::new(),
            input_field: InputField::None,
            card_draft: CardDraft::default(),
            message: None,
            show_help: false,
        }
    }

    /// End to end: empty store, one category, one card, one known
    /// response, then a duplicate-category rejection.
    #[test]
    fn first_session_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in_temp(dir.path());
        assert!(app.collection.is_empty());

        app.collection.add_category("Math").unwrap();
        app.collection.add_card("Math", "2+2?", "4", vec![]).unwrap();

        let mut session = StudySession::start(&app.collection, "Math").unwrap();
        let streak = app.day_streak();
        let outcome = session
            .respond(&mut app.collection, true, streak)
            .unwrap();
        // Base plus the first-time bonus; a fresh collection's streak
        // is 1, so no streak bonus.
        assert_eq!(outcome.reward.total(), XP_PER_CARD * 3);

        let card = &app.collection.get("Math").unwrap().cards[0];
        assert!(card.known);
        assert!(card.last_reviewed.is_some());

        let before = crate::store::encode_values(&app.collection);
        assert_eq!(
            app.collection.add_category("Math"),
            Err(ModelError::CategoryExists("Math".to_string()))
        );
        assert_eq!(crate::store::encode_values(&app.collection), before);
    }

    #[test]
    fn add_card_flow_walks_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in_temp(dir.path());

        app.handle_key(KeyEvent::from(KeyCode::Char('c')));
        assert!(app.editing);
        assert_eq!(app.input_field, InputField::CardCategory);

        for c in "Math".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.input_field, InputField::CardQuestion);

        for c in "2+2?".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.input_field, InputField::CardAnswer);

        app.handle_key(KeyEvent::from(KeyCode::Char('4')));
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.input_field, InputField::CardTags);

        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert!(!app.editing);
        assert_eq!(app.collection.get("Math").unwrap().cards.len(), 1);
    }

    #[test]
    fn empty_answer_rejects_the_draft_and_leaves_the_model_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in_temp(dir.path());

        app.handle_key(KeyEvent::from(KeyCode::Char('c')));
        for c in "Math".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        app.handle_key(KeyEvent::from(KeyCode::Char('q')));
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        // Answer left blank.
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        // Tags prompt still appears, then submission fails.
        app.handle_key(KeyEvent::from(KeyCode::Enter));

        assert!(app.collection.is_empty());
        assert!(matches!(app.message, Some((_, MessageType::Error))));
    }

    #[test]
    fn selecting_a_missing_category_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in_temp(dir.path());
        app.collection.add_category("Math").unwrap();

        // "Math" exists but has no cards, so study cannot start.
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert!(app.session.is_none());
        assert!(matches!(app.message, Some((_, MessageType::Error))));
    }

    #[test]
    fn responses_persist_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in_temp(dir.path());
        app.collection.add_card("Math", "q", "a", vec![]).unwrap();
        app.handle_key(KeyEvent::from(KeyCode::Enter)); // start study
        assert!(app.session.is_some());
        app.handle_key(KeyEvent::from(KeyCode::Right)); // respond known

        let reloaded = StudyStore::open(dir.path()).unwrap().load();
        assert!(reloaded.get("Math").unwrap().cards[0].known);
    }

    #[test]
    fn quit_is_blocked_while_editing_or_studying() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in_temp(dir.path());
        assert!(app.can_quit());

        app.handle_key(KeyEvent::from(KeyCode::Char('a')));
        assert!(!app.can_quit());
        app.handle_key(KeyEvent::from(KeyCode::Esc));
        assert!(app.can_quit());

        app.collection.add_card("Math", "q", "a", vec![]).unwrap();
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert!(!app.can_quit());
        app.handle_key(KeyEvent::from(KeyCode::Esc));
        assert!(app.can_quit());
    }
}
