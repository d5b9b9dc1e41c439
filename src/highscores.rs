//! Per-game high score table
//!
//! One record per game id, only ever replaced by a strictly greater score.
//! Persisted as JSON through [`crate::persistence::JsonFile`].

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::persistence::JsonFile;

/// Storage key for each game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Snake,
    Tetris,
    Pong,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::Snake, GameId::Tetris, GameId::Pong];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::Pong => "pong",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(GameId::Snake),
            "tetris" => Some(GameId::Tetris),
            "pong" => Some(GameId::Pong),
            _ => None,
        }
    }
}

/// Persistence contract the lifecycle talks to
pub trait ScoreStore {
    /// Best score recorded for `game` (0 if none)
    fn high_score(&self, game: GameId) -> u64;

    /// Record `score` if it beats the stored one. Returns true if updated.
    fn set_high_score(&mut self, game: GameId, score: u64) -> bool;
}

/// A single high score record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

/// High score table for all games
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: BTreeMap<GameId, HighScoreEntry>,
    /// Backing file; `None` keeps the table in memory only
    #[serde(skip)]
    file: Option<JsonFile>,
}

impl HighScores {
    /// Default file name inside the data directory
    pub const FILE_NAME: &'static str = "arcade_highscores.json";

    /// Create an empty in-memory table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `file`, starting fresh if it is missing or unreadable
    pub fn load(file: JsonFile) -> Self {
        let mut scores: HighScores = file.load_or_default("high scores");
        log::info!("{} high scores on record", scores.entries.len());
        scores.file = Some(file);
        scores
    }

    /// Write the table to its backing file (no-op when in memory only)
    pub fn save(&self) {
        if let Some(file) = &self.file {
            file.save_logged(self, "High scores");
        }
    }

    /// Record with an explicit timestamp. Returns true if updated.
    pub fn set_high_score_at(&mut self, game: GameId, score: u64, timestamp: u64) -> bool {
        if score <= self.high_score(game) {
            return false;
        }
        self.entries.insert(game, HighScoreEntry { score, timestamp });
        log::info!("New {} high score: {}", game.as_str(), score);
        self.save();
        true
    }

    pub fn entry(&self, game: GameId) -> Option<&HighScoreEntry> {
        self.entries.get(&game)
    }

    /// Every game with its record (zeroed when nothing is stored)
    pub fn all(&self) -> Vec<(GameId, HighScoreEntry)> {
        GameId::ALL
            .iter()
            .map(|&game| {
                let entry = self.entries.get(&game).copied().unwrap_or(HighScoreEntry {
                    score: 0,
                    timestamp: 0,
                });
                (game, entry)
            })
            .collect()
    }
}

impl ScoreStore for HighScores {
    fn high_score(&self, game: GameId) -> u64 {
        self.entries.get(&game).map(|e| e.score).unwrap_or(0)
    }

    fn set_high_score(&mut self, game: GameId, score: u64) -> bool {
        self.set_high_score_at(game, score, now_ms())
    }
}

/// Milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
