//! Audio collaborator
//!
//! The engines only emit [`GameEvent`]s; this module maps them onto the four
//! arcade sound effects and hands them to whatever sink is attached. Playback
//! is fire-and-forget: a muted or missing backend drops sounds silently.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Menu blip, pause toggle, rotation, wall bounce
    Select,
    /// Food eaten, piece locked, paddle hit
    Eat,
    /// Lines cleared, player point
    Coin,
    /// Run ended or point conceded
    GameOver,
}

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Select => "select",
            SoundEffect::Eat => "eat",
            SoundEffect::Coin => "coin",
            SoundEffect::GameOver => "gameOver",
        }
    }
}

impl From<GameEvent> for SoundEffect {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Select => SoundEffect::Select,
            GameEvent::Eat => SoundEffect::Eat,
            GameEvent::Coin => SoundEffect::Coin,
            GameEvent::GameOver => SoundEffect::GameOver,
        }
    }
}

/// Anything that can play (or ignore) a sound effect
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Most recent effects kept for a frontend to drain
pub const HISTORY_LEN: usize = 64;

/// Audio manager for the arcade
///
/// There is no output device here; the last [`HISTORY_LEN`] played effects
/// are kept so a frontend can drain and voice them. The mute flag lives in
/// [`Settings`] and is saved whenever it changes.
#[derive(Debug, Default)]
pub struct AudioManager {
    settings: Settings,
    played: VecDeque<SoundEffect>,
}

impl AudioManager {
    /// In-memory manager; the mute flag is not saved anywhere
    pub fn new(muted: bool) -> Self {
        let mut settings = Settings::default();
        settings.muted = muted;
        Self::with_settings(settings)
    }

    /// Manager backed by loaded settings
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            played: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.settings.set_muted(muted);
    }

    pub fn is_muted(&self) -> bool {
        self.settings.muted
    }

    /// Flip the mute flag, returning the new value
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.settings.toggle_mute();
        log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        muted
    }

    /// Take every effect played since the last drain, oldest first
    pub fn drain(&mut self) -> Vec<SoundEffect> {
        self.played.drain(..).collect()
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, effect: SoundEffect) {
        if self.is_muted() {
            return;
        }
        log::debug!("sfx: {}", effect.as_str());
        if self.played.len() == HISTORY_LEN {
            self.played.pop_front();
        }
        self.played.push_back(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_manager_drops_effects() {
        let mut audio = AudioManager::new(true);
        audio.play(SoundEffect::Eat);
        assert!(audio.drain().is_empty());

        assert!(!audio.toggle_mute());
        audio.play(SoundEffect::Coin);
        audio.play(SoundEffect::GameOver);
        assert_eq!(audio.drain(), vec![SoundEffect::Coin, SoundEffect::GameOver]);
        assert!(audio.drain().is_empty());
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(SoundEffect::from(GameEvent::Eat), SoundEffect::Eat);
        assert_eq!(SoundEffect::from(GameEvent::GameOver).as_str(), "gameOver");
    }

    #[test]
    fn test_toggle_mute_saved_to_settings() {
        let file = crate::persistence::scratch_file(Settings::FILE_NAME);
        let mut audio = AudioManager::with_settings(Settings::load(file.clone()));
        assert!(!audio.is_muted());
        assert!(audio.toggle_mute());
        assert!(Settings::load(file.clone()).muted);

        audio.set_muted(false);
        assert!(!Settings::load(file).muted);
    }

    #[test]
    fn test_history_keeps_latest() {
        let mut audio = AudioManager::new(false);
        for _ in 0..HISTORY_LEN {
            audio.play(SoundEffect::Eat);
        }
        audio.play(SoundEffect::Coin);
        let played = audio.drain();
        assert_eq!(played.len(), HISTORY_LEN);
        assert_eq!(played.last(), Some(&SoundEffect::Coin));
    }
}
