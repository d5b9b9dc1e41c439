//! Pong rules
//!
//! Player paddle on the left, AI paddle on the right. Motion constants are
//! per frame: the driver calls [`Pong::step`] once per display frame.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{
    ContactBand, ball_wall_collision, bounce_angle, bounce_velocity, next_speed, reflect_velocity,
};
use super::grid::Direction;
use super::lifecycle::{Command, Engine, GameEvent};
use crate::consts::pong::*;
use crate::highscores::GameId;
use crate::settings::Settings;

/// AI tracking tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// Fraction of the remaining distance the AI paddle closes per frame
    pub fn gain(&self) -> f32 {
        match self {
            Difficulty::Easy => AI_GAIN_EASY,
            Difficulty::Medium => AI_GAIN_MEDIUM,
            Difficulty::Hard => AI_GAIN_HARD,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Court side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Ai,
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rally speed scalar, in [BALL_SPEED_INITIAL, BALL_MAX_SPEED]
    pub speed: f32,
}

/// Top edge of a centered paddle
const PADDLE_START_Y: f32 = COURT_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0;

#[inline]
fn clamp_paddle(y: f32) -> f32 {
    y.clamp(0.0, COURT_HEIGHT - PADDLE_HEIGHT)
}

/// Pong match state
#[derive(Debug, Clone)]
pub struct Pong {
    player_y: f32,
    ai_y: f32,
    ball: Ball,
    player_points: u32,
    ai_points: u32,
    /// Player paddle returns this match (the score offered to the high score table)
    returns: u64,
    difficulty: Difficulty,
    held_up: bool,
    held_down: bool,
    winner: Option<Side>,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Pong {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        let mut pong = Self {
            player_y: PADDLE_START_Y,
            ai_y: PADDLE_START_Y,
            ball: Ball {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                speed: BALL_SPEED_INITIAL,
            },
            player_points: 0,
            ai_points: 0,
            returns: 0,
            difficulty,
            held_up: false,
            held_down: false,
            winner: None,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        pong.serve(1.0);
        pong
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn player_y(&self) -> f32 {
        self.player_y
    }

    pub fn ai_y(&self) -> f32 {
        self.ai_y
    }

    pub fn points(&self) -> (u32, u32) {
        (self.player_points, self.ai_points)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Contact band in front of the player's paddle
    fn player_band(&self) -> ContactBand {
        ContactBand {
            x_min: PADDLE_WIDTH + BALL_SIZE / 2.0,
            x_max: PADDLE_WIDTH * 2.0 + BALL_SIZE / 2.0,
            top: self.player_y,
            height: PADDLE_HEIGHT,
        }
    }

    /// Contact band in front of the AI paddle
    fn ai_band(&self) -> ContactBand {
        ContactBand {
            x_min: COURT_WIDTH - PADDLE_WIDTH * 2.0 - BALL_SIZE / 2.0,
            x_max: COURT_WIDTH - PADDLE_WIDTH - BALL_SIZE / 2.0,
            top: self.ai_y,
            height: PADDLE_HEIGHT,
        }
    }

    /// Advance one frame
    pub fn step(&mut self) {
        if self.winner.is_some() {
            return;
        }

        if self.held_up {
            self.player_y = clamp_paddle(self.player_y - PADDLE_SPEED);
        }
        if self.held_down {
            self.player_y = clamp_paddle(self.player_y + PADDLE_SPEED);
        }

        // Proportional tracking, not instantaneous
        let target = self.ball.pos.y - PADDLE_HEIGHT / 2.0;
        self.ai_y = clamp_paddle(self.ai_y + (target - self.ai_y) * self.difficulty.gain());

        self.ball.pos += self.ball.vel;

        let wall = ball_wall_collision(self.ball.pos, BALL_SIZE / 2.0, COURT_HEIGHT);
        if wall.hit && self.ball.vel.dot(wall.normal) < 0.0 {
            self.ball.vel = reflect_velocity(self.ball.vel, wall.normal);
            self.ball.pos += wall.normal * wall.penetration;
            self.events.push(GameEvent::Select);
        }

        // Only a ball travelling toward a paddle can hit it, so a ball still
        // inside the band on the next frame is not bounced twice
        if self.ball.vel.x < 0.0 && self.player_band().contains(self.ball.pos) {
            self.paddle_hit(Side::Player);
        } else if self.ball.vel.x > 0.0 && self.ai_band().contains(self.ball.pos) {
            self.paddle_hit(Side::Ai);
        }

        if self.ball.pos.x < 0.0 {
            self.award_point(Side::Ai);
        } else if self.ball.pos.x > COURT_WIDTH {
            self.award_point(Side::Player);
        }
    }

    fn paddle_hit(&mut self, side: Side) {
        let (band, toward) = match side {
            Side::Player => (self.player_band(), 1.0),
            Side::Ai => (self.ai_band(), -1.0),
        };
        let angle = bounce_angle(band.offset(self.ball.pos.y));
        self.ball.speed = next_speed(self.ball.speed);
        self.ball.vel = bounce_velocity(self.ball.speed, angle, toward);
        if side == Side::Player {
            self.returns += 1;
        }
        self.events.push(GameEvent::Eat);
    }

    fn award_point(&mut self, scorer: Side) {
        let (points, toward) = match scorer {
            Side::Player => {
                self.player_points += 1;
                self.events.push(GameEvent::Coin);
                (self.player_points, -1.0)
            }
            Side::Ai => {
                self.ai_points += 1;
                self.events.push(GameEvent::GameOver);
                (self.ai_points, 1.0)
            }
        };
        self.serve(toward);

        if points >= MAX_SCORE {
            self.winner = Some(scorer);
            log::info!(
                "pong match won by {:?} ({}-{})",
                scorer,
                self.player_points,
                self.ai_points
            );
        }
    }

    /// Ball back to center at the initial speed, random vertical direction
    fn serve(&mut self, toward: f32) {
        let y_dir = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball = Ball {
            pos: Vec2::new(COURT_WIDTH / 2.0, COURT_HEIGHT / 2.0),
            vel: Vec2::new(toward * BALL_SPEED_INITIAL, y_dir * BALL_SPEED_INITIAL),
            speed: BALL_SPEED_INITIAL,
        };
    }

    pub fn snapshot(&self) -> PongSnapshot {
        PongSnapshot {
            court: Vec2::new(COURT_WIDTH, COURT_HEIGHT),
            paddle_size: Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            player_y: self.player_y,
            ai_y: self.ai_y,
            ball: self.ball,
            ball_size: BALL_SIZE,
            player_points: self.player_points,
            ai_points: self.ai_points,
            returns: self.returns,
            difficulty: self.difficulty,
            winner: self.winner,
        }
    }
}

/// Render view of a Pong match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PongSnapshot {
    pub court: Vec2,
    pub paddle_size: Vec2,
    pub player_y: f32,
    pub ai_y: f32,
    pub ball: Ball,
    pub ball_size: f32,
    pub player_points: u32,
    pub ai_points: u32,
    pub returns: u64,
    pub difficulty: Difficulty,
    pub winner: Option<Side>,
}

impl Engine for Pong {
    type Snapshot = PongSnapshot;
    const GAME: GameId = GameId::Pong;

    fn command(&mut self, command: Command) {
        match command {
            Command::Move(Direction::Up) => self.held_up = true,
            Command::Move(Direction::Down) => self.held_down = true,
            Command::Release(Direction::Up) => self.held_up = false,
            Command::Release(Direction::Down) => self.held_down = false,
            Command::CycleDifficulty => {
                self.difficulty = self.difficulty.next();
                self.events.push(GameEvent::Select);
                log::info!("pong difficulty {}", self.difficulty.as_str());
            }
            _ => {}
        }
    }

    fn tick(&mut self, _dt: f32) {
        self.step();
    }

    fn reset(&mut self) {
        self.player_y = PADDLE_START_Y;
        self.ai_y = PADDLE_START_Y;
        self.player_points = 0;
        self.ai_points = 0;
        self.returns = 0;
        self.held_up = false;
        self.held_down = false;
        self.winner = None;
        self.serve(1.0);
    }

    fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    fn score(&self) -> u64 {
        self.returns
    }

    /// Only a won match can set a record
    fn records_score(&self) -> bool {
        self.winner == Some(Side::Player)
    }

    fn save_preferences(&self, settings: &mut Settings) {
        settings.set_pong_difficulty(self.difficulty);
    }

    fn tick_interval_ms(&self) -> Option<f64> {
        None
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn snapshot(&self) -> PongSnapshot {
        Pong::snapshot(self)
    }
}
