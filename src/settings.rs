//! Player preferences
//!
//! Persisted separately from high scores.

use serde::{Deserialize, Serialize};

use crate::persistence::JsonFile;
use crate::sim::pong::Difficulty;

/// Arcade settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Silence every sound effect
    #[serde(default)]
    pub muted: bool,
    /// AI tracking tier for Pong
    #[serde(default)]
    pub pong_difficulty: Difficulty,
    /// Fixed RNG seed; `None` seeds from the clock each session
    #[serde(default)]
    pub seed: Option<u64>,
    /// Backing file; `None` keeps settings in memory only
    #[serde(skip)]
    file: Option<JsonFile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            pong_difficulty: Difficulty::Medium,
            seed: None,
            file: None,
        }
    }
}

impl Settings {
    /// Default file name inside the data directory
    pub const FILE_NAME: &'static str = "arcade_settings.json";

    /// Load settings from `file`, using defaults if missing or unreadable
    pub fn load(file: JsonFile) -> Self {
        let mut settings: Settings = file.load_or_default("settings");
        settings.file = Some(file);
        settings
    }

    /// Save settings to the backing file (no-op when in memory only)
    pub fn save(&self) {
        if let Some(file) = &self.file {
            file.save_logged(self, "Settings");
        }
    }

    /// Change the mute flag, saving if it changed
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            self.muted = muted;
            self.save();
        }
    }

    /// Flip the mute flag and save. Returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    /// Change the Pong AI tier, saving if it changed
    pub fn set_pong_difficulty(&mut self, difficulty: Difficulty) {
        if self.pong_difficulty != difficulty {
            self.pong_difficulty = difficulty;
            log::info!("Pong difficulty set to {}", difficulty.as_str());
            self.save();
        }
    }

    /// Seed for a new session
    pub fn session_seed(&self) -> u64 {
        self.seed.unwrap_or_else(crate::highscores::now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::scratch_file;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.muted);
        assert_eq!(settings.pong_difficulty, Difficulty::Medium);
        assert_eq!(Settings { seed: Some(7), ..Settings::default() }.session_seed(), 7);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"muted": true}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.pong_difficulty, Difficulty::Medium);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_save_and_reload() {
        let file = scratch_file(Settings::FILE_NAME);
        let mut settings = Settings::load(file.clone());
        settings.muted = true;
        settings.pong_difficulty = Difficulty::Hard;
        settings.save();

        let reloaded = Settings::load(file);
        assert!(reloaded.muted);
        assert_eq!(reloaded.pong_difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_changes_are_saved_immediately() {
        let file = scratch_file(Settings::FILE_NAME);
        let mut settings = Settings::load(file.clone());
        assert!(settings.toggle_mute());
        settings.set_pong_difficulty(Difficulty::Easy);

        let reloaded = Settings::load(file.clone());
        assert!(reloaded.muted);
        assert_eq!(reloaded.pong_difficulty, Difficulty::Easy);

        let mut settings = reloaded;
        settings.set_muted(false);
        assert!(!Settings::load(file).muted);
    }
}
