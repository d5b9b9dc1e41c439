//! Frame driver
//!
//! Turns wall-clock frame callbacks into engine ticks:
//! - Fixed-interval games (Snake, Tetris) tick once per elapsed interval
//! - Per-frame games (Pong) tick on a fixed step with bounded substeps
//!
//! The driver owns no background work; dropping it stops the game.

use crate::audio::AudioSink;
use crate::consts::pong::FRAME_DT;
use crate::highscores::ScoreStore;
use crate::sim::{Command, Engine, Phase, Session};

/// Frames longer than this are clamped (tab switch, debugger pause)
pub const MAX_FRAME_DT: f32 = 0.1;
/// Maximum substeps per frame to prevent spiral of death
pub const MAX_SUBSTEPS: u32 = 4;

/// Fixed timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps,
            accumulator: 0.0,
        }
    }

    /// Add a frame's worth of time; returns how many steps to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            self.accumulator -= self.step;
            substeps += 1;
        }
        // Drop time we could not catch up on
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Fires once the elapsed time reaches the interval, then starts over
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    elapsed_ms: f64,
}

impl IntervalTimer {
    pub fn advance(&mut self, frame_ms: f64, interval_ms: f64) -> bool {
        self.elapsed_ms += frame_ms.max(0.0);
        if self.elapsed_ms >= interval_ms {
            self.elapsed_ms = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}

/// Runs one session from frame callbacks
#[derive(Debug)]
pub struct Driver<E: Engine> {
    session: Session<E>,
    timer: IntervalTimer,
    fixed: FixedStep,
}

impl<E: Engine> Driver<E> {
    pub fn new(session: Session<E>) -> Self {
        Self {
            session,
            timer: IntervalTimer::default(),
            fixed: FixedStep::new(FRAME_DT, MAX_SUBSTEPS),
        }
    }

    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// Queue input for the next frame
    pub fn push(&mut self, command: Command) {
        self.session.push(command);
    }

    /// Handle one display frame. Returns the number of engine ticks run.
    pub fn frame(
        &mut self,
        frame_ms: f64,
        store: &mut dyn ScoreStore,
        audio: &mut dyn AudioSink,
    ) -> u32 {
        let ticks = match self.session.engine().tick_interval_ms() {
            Some(interval) => self.interval_frame(frame_ms, interval, store),
            None => self.fixed_frame(frame_ms, store),
        };
        self.session.play_events(audio);
        ticks
    }

    fn interval_frame(&mut self, frame_ms: f64, interval: f64, store: &mut dyn ScoreStore) -> u32 {
        if self.session.phase() != Phase::Running {
            // Paused time does not count toward the next step
            self.timer.reset();
            self.session.pump(store);
            return 0;
        }
        if self.timer.advance(frame_ms, interval) {
            self.session.tick((interval / 1000.0) as f32, store);
            1
        } else {
            self.session.pump(store);
            0
        }
    }

    fn fixed_frame(&mut self, frame_ms: f64, store: &mut dyn ScoreStore) -> u32 {
        let steps = self.fixed.advance((frame_ms / 1000.0) as f32);
        if steps == 0 {
            self.session.pump(store);
        }
        for _ in 0..steps {
            self.session.tick(FRAME_DT, store);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioManager, Silent};
    use crate::highscores::HighScores;
    use crate::sim::{Difficulty, Direction, Pong, Snake};

    #[test]
    fn test_fixed_step_accumulates() {
        // Binary fractions keep the arithmetic exact
        let mut fixed = FixedStep::new(1.0 / 64.0, 8);
        assert_eq!(fixed.advance(1.0 / 128.0), 0);
        assert_eq!(fixed.advance(1.0 / 128.0), 1);
        assert_eq!(fixed.advance(3.0 / 64.0), 3);
    }

    #[test]
    fn test_fixed_step_bounded() {
        let mut fixed = FixedStep::new(0.01, 4);
        // A huge frame is clamped and capped
        assert_eq!(fixed.advance(5.0), 4);
        assert!(fixed.advance(0.0) <= 1);
    }

    #[test]
    fn test_interval_timer() {
        let mut timer = IntervalTimer::default();
        assert!(!timer.advance(100.0, 150.0));
        assert!(timer.advance(60.0, 150.0));
        assert!(!timer.advance(16.0, 150.0));
    }

    #[test]
    fn test_snake_ticks_on_interval() {
        let mut store = HighScores::new();
        let mut audio = AudioManager::new(false);
        let mut driver = Driver::new(Session::new(Snake::new(1), &store));

        // Not started: frames pass without ticks
        assert_eq!(driver.frame(500.0, &mut store, &mut audio), 0);

        driver.push(Command::Start);
        assert_eq!(driver.frame(0.0, &mut store, &mut audio), 0);
        assert_eq!(driver.session().phase(), Phase::Running);

        let mut ticks = 0;
        for _ in 0..30 {
            ticks += driver.frame(16.0, &mut store, &mut audio);
        }
        // 480 ms at 150 ms per step
        assert_eq!(ticks, 3);
        assert_eq!(driver.session().engine().head().x, 13);
    }

    #[test]
    fn test_pause_stops_snake() {
        let mut store = HighScores::new();
        let mut audio = AudioManager::new(false);
        let mut driver = Driver::new(Session::new(Snake::new(1), &store));
        driver.push(Command::Start);
        driver.frame(0.0, &mut store, &mut audio);
        driver.push(Command::TogglePause);
        driver.frame(0.0, &mut store, &mut audio);

        for _ in 0..100 {
            assert_eq!(driver.frame(16.0, &mut store, &mut audio), 0);
        }
        assert_eq!(driver.session().phase(), Phase::Paused);

        // Commands apply in order: resume, then the move lands while running
        driver.push(Command::TogglePause);
        driver.push(Command::Move(Direction::Down));
        let mut ticks = 0;
        while ticks == 0 {
            ticks = driver.frame(16.0, &mut store, &mut audio);
        }
        assert_eq!(driver.session().engine().head().y, 11);
        // Start, pause, resume
        assert_eq!(audio.drain().len(), 3);
    }

    #[test]
    fn test_pong_ticks_every_frame() {
        let mut store = HighScores::new();
        let mut audio = Silent;
        let mut driver = Driver::new(Session::new(Pong::new(Difficulty::Easy, 3), &store));
        driver.push(Command::Start);
        let start = driver.session().engine().ball().pos;

        let mut ticks = 0;
        for _ in 0..10 {
            ticks += driver.frame(1000.0 / 60.0 + 0.01, &mut store, &mut audio);
        }
        assert_eq!(ticks, 10);
        let moved = driver.session().engine().ball().pos - start;
        assert!((moved.x - 50.0).abs() < 0.001);
    }
}
