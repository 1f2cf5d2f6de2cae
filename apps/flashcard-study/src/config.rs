//! Configuration for the flashcard study app.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "flashcard-study")
            .map(|d| d.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "flashcard-study")
            .map(|d| d.data_dir().to_path_buf())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Maximum days the streak walk looks back before giving up.
    #[serde(default = "default_streak_lookback")]
    pub streak_lookback_days: u32,
}

fn default_streak_lookback() -> u32 {
    3650
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            streak_lookback_days: 3650,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_activity_chart: bool,
    #[serde(default = "default_true")]
    pub show_session_xp: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_activity_chart: true,
            show_session_xp: true,
        }
    }
}
