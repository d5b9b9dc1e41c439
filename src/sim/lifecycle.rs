//! Shared lifecycle state machine
//!
//! Every game runs inside a [`Session`]: it owns one engine, gates ticking on
//! the current [`Phase`], queues input [`Command`]s until the next step, and
//! records the high score exactly once per game over.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::grid::Direction;
use crate::audio::AudioSink;
use crate::highscores::{GameId, ScoreStore};
use crate::settings::Settings;

/// Lifecycle phase shared by all games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the start command
    #[default]
    NotStarted,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended; only restart leaves this phase
    GameOver,
}

/// Discrete happenings the audio collaborator may voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    Select,
    Eat,
    Coin,
    GameOver,
}

/// Input commands (device wiring maps keys onto these)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Direction pressed (Snake heading, Tetris shift/soft drop, Pong paddle)
    Move(Direction),
    /// Direction released (Pong paddle stops)
    Release(Direction),
    Rotate,
    HardDrop,
    TogglePause,
    Start,
    Restart,
    /// Pong AI tier: Easy → Medium → Hard → Easy
    CycleDifficulty,
}

impl Command {
    /// Game commands that are meaningful outside of Running
    fn accepted_when_idle(&self) -> bool {
        matches!(self, Command::Release(_) | Command::CycleDifficulty)
    }
}

/// A per-game rule engine driven by a [`Session`]
pub trait Engine {
    /// Read-only view handed to the renderer
    type Snapshot: Serialize;

    /// High score key for this game
    const GAME: GameId;

    /// Apply a game-specific command. Invalid commands are ignored.
    fn command(&mut self, command: Command);

    /// Advance by one logical step
    fn tick(&mut self, dt: f32);

    /// Back to the initial state of a fresh game
    fn reset(&mut self);

    /// True once a terminal rule has been violated
    fn is_over(&self) -> bool;

    /// Session score offered to the high score table
    fn score(&self) -> u64;

    /// Whether this run's score may be recorded at all
    fn records_score(&self) -> bool {
        true
    }

    /// Copy player preferences the engine changed into `settings`
    fn save_preferences(&self, _settings: &mut Settings) {}

    /// Fixed tick interval in ms, or `None` to tick every frame
    fn tick_interval_ms(&self) -> Option<f64>;

    /// Take events emitted since the last call
    fn take_events(&mut self) -> Vec<GameEvent>;

    fn snapshot(&self) -> Self::Snapshot;
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<S> {
    pub game: GameId,
    pub phase: Phase,
    pub high_score: u64,
    /// This run set a new record
    pub new_high_score: bool,
    pub state: S,
}

/// One game's lifecycle around its engine
#[derive(Debug)]
pub struct Session<E: Engine> {
    engine: E,
    phase: Phase,
    /// Set once the high score has been offered for the current run
    score_recorded: bool,
    new_high_score: bool,
    high_score: u64,
    pending: VecDeque<Command>,
    events: Vec<GameEvent>,
}

impl<E: Engine> Session<E> {
    pub fn new(engine: E, store: &dyn ScoreStore) -> Self {
        Self {
            engine,
            phase: Phase::NotStarted,
            score_recorded: false,
            new_high_score: false,
            high_score: store.high_score(E::GAME),
            pending: VecDeque::new(),
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Queue a command for the start of the next step
    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// NotStarted → Running
    pub fn start(&mut self) {
        if self.phase == Phase::NotStarted {
            self.phase = Phase::Running;
            self.events.push(GameEvent::Select);
            log::info!("{} started", E::GAME.as_str());
        }
    }

    /// Running ⇄ Paused
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            _ => return,
        };
        self.events.push(GameEvent::Select);
        log::debug!("{} {:?}", E::GAME.as_str(), self.phase);
    }

    /// Any phase → Running with a fresh engine
    pub fn restart(&mut self) {
        self.engine.reset();
        // Events from the abandoned run are stale
        self.engine.take_events();
        self.pending.clear();
        self.phase = Phase::Running;
        self.score_recorded = false;
        self.new_high_score = false;
        self.events.push(GameEvent::Select);
        log::info!("{} restarted", E::GAME.as_str());
    }

    /// Apply one command immediately
    pub fn apply(&mut self, command: Command, store: &mut dyn ScoreStore) {
        match command {
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::Restart => self.restart(),
            cmd if self.phase == Phase::Running || cmd.accepted_when_idle() => {
                self.engine.command(cmd);
                self.collect_events();
                self.check_game_over(store);
            }
            _ => {}
        }
    }

    /// Apply every queued command without advancing the simulation
    pub fn pump(&mut self, store: &mut dyn ScoreStore) {
        while let Some(command) = self.pending.pop_front() {
            self.apply(command, store);
        }
    }

    /// Drain queued commands, then advance the engine if Running
    pub fn tick(&mut self, dt: f32, store: &mut dyn ScoreStore) {
        self.pump(store);
        if self.phase != Phase::Running {
            return;
        }
        self.engine.tick(dt);
        self.collect_events();
        self.check_game_over(store);
    }

    /// Take events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forward pending events to an audio sink
    pub fn play_events(&mut self, sink: &mut dyn AudioSink) {
        for event in self.drain_events() {
            sink.play(event.into());
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot<E::Snapshot> {
        SessionSnapshot {
            game: E::GAME,
            phase: self.phase,
            high_score: self.high_score,
            new_high_score: self.new_high_score,
            state: self.engine.snapshot(),
        }
    }

    fn collect_events(&mut self) {
        let events = self.engine.take_events();
        self.events.extend(events);
    }

    /// Running → GameOver once the engine reports a terminal state
    fn check_game_over(&mut self, store: &mut dyn ScoreStore) {
        if self.phase != Phase::Running || !self.engine.is_over() {
            return;
        }
        self.phase = Phase::GameOver;
        let score = self.engine.score();
        log::info!("{} over, score {}", E::GAME.as_str(), score);

        if self.score_recorded {
            return;
        }
        self.score_recorded = true;
        if self.engine.records_score() && store.set_high_score(E::GAME, score) {
            self.new_high_score = true;
            self.high_score = score;
        }
    }
}
