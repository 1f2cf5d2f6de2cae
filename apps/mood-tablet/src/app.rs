//! Application state and key handling.

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use crate::config::Config;
use crate::models::{validate_username, Mood, MoodEntry, MoodError, MoodLog, ALL_MOODS};
use crate::store::MoodStore;

pub struct App {
    pub store: MoodStore,
    pub config: Config,
    pub log: MoodLog,
    pub username: Option<String>,
    pub accent: String,
    pub view: View,
    /// Displayed calendar month as (year, month).
    pub month: (i32, u32),
    pub selected_mood: Option<Mood>,
    pub editing_note: bool,
    pub note_buffer: String,
    pub login_buffer: String,
    pub message: Option<(String, MessageType)>,
    pub show_help: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Tracker,
    Chart,
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

        let data_dir = Config::data_dir().unwrap_or_else(|| "mood-tablet-data".into());
        let store = match MoodStore::open(&data_dir) {
            Ok(store) => store,
            Err(err) => {
                warn!(%err, dir = %data_dir.display(), "data dir unusable, falling back");
                MoodStore::open("mood-tablet-data")?
            }
        };

        let log = store.load();
        let username = store.username();
        let accent = store.accent_color();
        let today = Local::now().date_naive();
        let view = if username.is_some() {
            View::Tracker
        } else {
            View::Login
        };

        Ok(Self {
            store,
            config,
            log,
            username,
            accent,
            view,
            month: (today.year(), today.month()),
            selected_mood: None,
            editing_note: false,
            note_buffer: String::new(),
            login_buffer: String::new(),
            message: None,
            show_help: false,
        })
    }

    /// 'q' quits only from the tracker; on the login screen it is
    /// text input and in the chart view it navigates back.
    pub fn can_quit(&self) -> bool {
        !self.editing_note && self.view == View::Tracker
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        self.message = None;

        if self.editing_note {
            self.handle_note_key(key);
            return;
        }

        match self.view {
            View::Login => self.handle_login_key(key),
            View::Tracker => self.handle_tracker_key(key),
            View::Chart => self.handle_chart_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => match validate_username(&self.login_buffer) {
                Ok(name) => {
                    self.store.set_username(&name);
                    self.username = Some(name);
                    self.login_buffer.clear();
                    self.view = View::Tracker;
                }
                Err(err) => self.set_message(err.to_string(), MessageType::Error),
            },
            KeyCode::Backspace => {
                self.login_buffer.pop();
            }
            KeyCode::Char(c) => self.login_buffer.push(c),
            _ => {}
        }
    }

    fn handle_tracker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.selected_mood = Some(ALL_MOODS[index]);
            }
            KeyCode::Char('n') => {
                self.editing_note = true;
            }
            KeyCode::Enter | KeyCode::Char('s') => self.save_entry(),
            KeyCode::Char('h') | KeyCode::Left => self.shift_month(-1),
            KeyCode::Char('l') | KeyCode::Right => self.shift_month(1),
            KeyCode::Char('t') => {
                let today = self.today();
                self.month = (today.year(), today.month());
            }
            KeyCode::Char('c') => self.view = View::Chart,
            KeyCode::Char('o') => self.log_out(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_chart_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.view = View::Tracker,
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_note_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing_note = false;
                self.note_buffer.clear();
            }
            KeyCode::Enter => {
                self.editing_note = false;
                if !self.note_buffer.is_empty() {
                    self.set_message(
                        "Note will be saved with today's entry",
                        MessageType::Info,
                    );
                }
            }
            KeyCode::Backspace => {
                self.note_buffer.pop();
            }
            KeyCode::Char(c) => self.note_buffer.push(c),
            _ => {}
        }
    }

    /// Log today's mood. Requires a selected mood; the note is
    /// whatever was typed, possibly empty.
    fn save_entry(&mut self) {
        let Some(mood) = self.selected_mood else {
            self.set_message(MoodError::NoMoodSelected.to_string(), MessageType::Error);
            return;
        };
        let entry = MoodEntry {
            date: self.today(),
            mood,
            note: std::mem::take(&mut self.note_buffer),
        };
        self.log.add(entry);
        if let Err(err) = self.store.save(&self.log) {
            warn!(%err, "failed to persist mood log");
            self.set_message("Could not save your entry", MessageType::Error);
            return;
        }
        self.selected_mood = None;
        self.set_message("Entry saved!", MessageType::Success);
    }

    fn shift_month(&mut self, delta: i32) {
        let (mut year, mut month) = self.month;
        let total = year * 12 + month as i32 - 1 + delta;
        year = total.div_euclid(12);
        month = (total.rem_euclid(12) + 1) as u32;
        self.month = (year, month);
    }

    fn log_out(&mut self) {
        self.store.clear_user();
        self.username = None;
        self.accent = self.store.accent_color();
        self.selected_mood = None;
        self.view = View::Login;
    }

    fn set_message(&mut self, text: impl Into<String>, kind: MessageType) {
        self.message = Some((text.into(), kind));
    }
}
