//! Data models for mood tracking.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoodError {
    #[error("username must be 2-20 characters long")]
    InvalidUsername,
    #[error("please select a mood first")]
    NoMoodSelected,
}

/// The six trackable moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Calm,
    Excited,
    Tired,
}

/// All moods in picker order.
pub const ALL_MOODS: [Mood; 6] = [
    Mood::Happy,
    Mood::Sad,
    Mood::Angry,
    Mood::Calm,
    Mood::Excited,
    Mood::Tired,
];

impl Mood {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Angry => "Angry",
            Self::Calm => "Calm",
            Self::Excited => "Excited",
            Self::Tired => "Tired",
        }
    }

    /// One-character marker for calendar cells.
    pub fn glyph(&self) -> char {
        match self {
            Self::Happy => 'H',
            Self::Sad => 'S',
            Self::Angry => 'A',
            Self::Calm => 'C',
            Self::Excited => 'E',
            Self::Tired => 'T',
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "happy" => Some(Self::Happy),
            "sad" => Some(Self::Sad),
            "angry" => Some(Self::Angry),
            "calm" => Some(Self::Calm),
            "excited" => Some(Self::Excited),
            "tired" => Some(Self::Tired),
            _ => None,
        }
    }
}

/// One logged mood. The wire form is `{"date": "YYYY-MM-DD", "mood":
/// "happy", "note": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub date: NaiveDate,
    pub mood: Mood,
    #[serde(default)]
    pub note: String,
}

/// Append-only sequence of logged moods.
#[derive(Debug, Clone, Default)]
pub struct MoodLog {
    entries: Vec<MoodEntry>,
}

impl MoodLog {
    pub fn new(entries: Vec<MoodEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, entry: MoodEntry) {
        self.entries.push(entry);
    }

    /// First entry logged on `date`, the one the calendar shows.
    pub fn entry_on(&self, date: NaiveDate) -> Option<&MoodEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// How often each mood was logged, in picker order. Unlogged moods
    /// are skipped, matching the chart's labels.
    pub fn mood_counts(&self) -> Vec<(Mood, usize)> {
        ALL_MOODS
            .iter()
            .map(|mood| {
                (
                    *mood,
                    self.entries.iter().filter(|e| e.mood == *mood).count(),
                )
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// Repair a raw decoded `moodEntries` document. Non-sequences become
/// empty; entries without a parseable date or a known mood are dropped;
/// notes default to empty. Total and idempotent.
pub fn repair_entries(raw: &serde_json::Value) -> MoodLog {
    let Some(items) = raw.as_array() else {
        return MoodLog::default();
    };
    let entries = items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let date = obj.get("date")?.as_str()?.parse::<NaiveDate>().ok()?;
            let mood = Mood::from_name(obj.get("mood")?.as_str()?)?;
            let note = obj
                .get("note")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(MoodEntry { date, mood, note })
        })
        .collect();
    MoodLog::new(entries)
}

/// One month of calendar cells: `None` for the leading blanks before
/// the 1st, then every day of the month in order.
pub fn month_grid(year: i32, month: u32, week_starts_sunday: bool) -> Vec<Option<NaiveDate>> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let leading = if week_starts_sunday {
        first.weekday().num_days_from_sunday()
    } else {
        first.weekday().num_days_from_monday()
    } as usize;

    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = match next_month {
        Some(d) => d - Duration::days(1),
        None => return Vec::new(),
    };

    let mut cells: Vec<Option<NaiveDate>> = vec![None; leading];
    for day in 1..=last.day() {
        cells.push(NaiveDate::from_ymd_opt(year, month, day));
    }
    cells
}

/// Validate a login name: 2 to 20 characters after trimming.
pub fn validate_username(raw: &str) -> Result<String, MoodError> {
    let name = raw.trim();
    if (2..=20).contains(&name.chars().count()) {
        Ok(name.to_string())
    } else {
        Err(MoodError::InvalidUsername)
    }
}

/// Accept only `#RRGGBB` accent colors.
pub fn validate_accent(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix('#')?;
    (rest.len() == 6 && rest.chars().all(|c| c.is_ascii_hexdigit())).then_some(raw)
}
