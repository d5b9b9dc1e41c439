//! Arcade Sim - Snake, Tetris and Pong simulation engines
//!
//! Core modules:
//! - `sim`: Per-game rule engines and the shared lifecycle state machine
//! - `platform`: Frame/interval driver helpers
//! - `persistence`: JSON file storage for collaborators
//! - `highscores`: Per-game best scores
//! - `settings`: Mute flag, Pong difficulty, RNG seed
//! - `audio`: Sound event sink

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use audio::{AudioManager, AudioSink, SoundEffect};
pub use highscores::{GameId, HighScores, ScoreStore};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Snake tuning
    pub mod snake {
        /// Square grid side length (cells)
        pub const GRID_SIZE: i32 = 30;
        /// Tick interval at level 1 (ms)
        pub const INITIAL_INTERVAL_MS: u32 = 150;
        /// Interval reduction per level (ms)
        pub const INTERVAL_STEP_MS: u32 = 10;
        /// Interval never drops below this (ms)
        pub const MIN_INTERVAL_MS: u32 = 60;
        pub const MAX_LEVEL: u32 = 10;
        /// Points per food eaten
        pub const FOOD_POINTS: u64 = 10;
        /// Level up at every multiple of this score
        pub const POINTS_PER_LEVEL: u64 = 50;
        /// Random food placement attempts before accepting the last candidate
        pub const FOOD_ATTEMPTS: u32 = 50;
    }

    /// Tetris tuning
    pub mod tetris {
        pub const BOARD_WIDTH: usize = 10;
        pub const BOARD_HEIGHT: usize = 20;
        /// Gravity interval at level 1 (ms)
        pub const INITIAL_INTERVAL_MS: f64 = 500.0;
        /// Multiplicative gravity decay per level
        pub const SPEED_DECREASE_FACTOR: f64 = 0.9;
        pub const LINES_PER_LEVEL: u32 = 5;
        pub const MAX_LEVEL: u32 = 10;
        /// Points by number of rows cleared in one lock
        pub const LINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];
    }

    /// Pong tuning (court units are pixels, motion is per frame)
    pub mod pong {
        pub const COURT_WIDTH: f32 = 640.0;
        pub const COURT_HEIGHT: f32 = 480.0;
        pub const PADDLE_HEIGHT: f32 = 100.0;
        pub const PADDLE_WIDTH: f32 = 15.0;
        pub const PADDLE_SPEED: f32 = 8.0;
        pub const BALL_SIZE: f32 = 12.0;
        pub const BALL_SPEED_INITIAL: f32 = 5.0;
        pub const BALL_SPEED_INCREMENT: f32 = 0.2;
        pub const BALL_MAX_SPEED: f32 = 15.0;
        /// Maximum bounce angle off a paddle edge (radians)
        pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;
        pub const AI_GAIN_EASY: f32 = 0.03;
        pub const AI_GAIN_MEDIUM: f32 = 0.06;
        pub const AI_GAIN_HARD: f32 = 0.1;
        /// Points needed to win a match
        pub const MAX_SCORE: u32 = 5;
        /// Nominal frame time the per-frame motion constants are tuned for
        pub const FRAME_DT: f32 = 1.0 / 60.0;
    }
}
