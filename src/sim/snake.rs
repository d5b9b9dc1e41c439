//! Snake rules
//!
//! The body is head-first; a tick prepends a new head and drops the tail
//! unless food was eaten. Direction changes are buffered until the next tick.

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::grid::{Cell, Direction, GridSize};
use super::lifecycle::{Command, Engine, GameEvent};
use crate::consts::snake::*;
use crate::highscores::GameId;

/// Tick interval for a level, floored at [`MIN_INTERVAL_MS`]
pub fn interval_for_level(level: u32) -> u32 {
    let step = INTERVAL_STEP_MS.saturating_mul(level.saturating_sub(1));
    INITIAL_INTERVAL_MS.saturating_sub(step).max(MIN_INTERVAL_MS)
}

fn initial_body() -> VecDeque<Cell> {
    (6..=10).rev().map(|x| IVec2::new(x, 10)).collect()
}

/// Snake game state
#[derive(Debug, Clone)]
pub struct Snake {
    grid: GridSize,
    body: VecDeque<Cell>,
    food: Cell,
    direction: Direction,
    /// Applied at the start of the next tick
    requested: Option<Direction>,
    score: u64,
    level: u32,
    interval_ms: u32,
    over: bool,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Snake {
    /// Standard 30×30 game
    pub fn new(seed: u64) -> Self {
        Self::build(
            GridSize::square(GRID_SIZE),
            initial_body(),
            Direction::Right,
            IVec2::new(15, 5),
            seed,
        )
    }

    /// Build a game from an explicit layout, head first.
    /// Returns `None` for an empty body.
    pub fn from_parts(
        grid: GridSize,
        body: Vec<Cell>,
        direction: Direction,
        food: Cell,
        seed: u64,
    ) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(Self::build(grid, body.into(), direction, food, seed))
    }

    fn build(
        grid: GridSize,
        body: VecDeque<Cell>,
        direction: Direction,
        food: Cell,
        seed: u64,
    ) -> Self {
        Self {
            grid,
            body,
            food,
            direction,
            requested: None,
            score: 0,
            level: 1,
            interval_ms: interval_for_level(1),
            over: false,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Buffer a heading for the next tick; the exact reverse is refused
    pub fn set_direction(&mut self, direction: Direction) {
        if self.over || direction.is_reverse_of(self.direction) {
            return;
        }
        self.requested = Some(direction);
    }

    /// Move one cell
    pub fn step(&mut self) {
        if self.over {
            return;
        }
        if let Some(dir) = self.requested.take() {
            self.direction = dir;
        }

        let head = self.head() + self.direction.delta();

        if !self.grid.contains(head) || self.body.contains(&head) {
            self.over = true;
            self.events.push(GameEvent::GameOver);
            return;
        }

        self.body.push_front(head);

        if head == self.food {
            self.eat();
        } else {
            self.body.pop_back();
        }
    }

    fn eat(&mut self) {
        self.score += FOOD_POINTS;
        if self.score % POINTS_PER_LEVEL == 0 && self.level < MAX_LEVEL {
            self.level += 1;
            self.interval_ms = interval_for_level(self.level);
            log::debug!("snake level {} ({} ms)", self.level, self.interval_ms);
        }
        self.food = self.place_food();
        self.events.push(GameEvent::Eat);
    }

    /// Random cell off the body, inset one cell from the walls.
    ///
    /// Gives up after [`FOOD_ATTEMPTS`] and keeps the last candidate even if
    /// it overlaps the body; boards that full are not reachable in practice.
    fn place_food(&mut self) -> Cell {
        let inset = if self.grid.width > 2 && self.grid.height > 2 { 1 } else { 0 };
        let mut candidate = self.food;
        for _ in 0..FOOD_ATTEMPTS {
            candidate = IVec2::new(
                self.rng.random_range(inset..self.grid.width - inset),
                self.rng.random_range(inset..self.grid.height - inset),
            );
            if !self.body.contains(&candidate) {
                return candidate;
            }
        }
        log::debug!("food placement gave up at {:?}", candidate);
        candidate
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            grid: self.grid,
            body: self.body.iter().copied().collect(),
            food: self.food,
            direction: self.direction,
            score: self.score,
            level: self.level,
            interval_ms: self.interval_ms,
            game_over: self.over,
        }
    }
}

/// Render view of a Snake game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnakeSnapshot {
    pub grid: GridSize,
    pub body: Vec<Cell>,
    pub food: Cell,
    pub direction: Direction,
    pub score: u64,
    pub level: u32,
    pub interval_ms: u32,
    pub game_over: bool,
}

impl Engine for Snake {
    type Snapshot = SnakeSnapshot;
    const GAME: GameId = GameId::Snake;

    fn command(&mut self, command: Command) {
        if let Command::Move(dir) = command {
            self.set_direction(dir);
        }
    }

    fn tick(&mut self, _dt: f32) {
        self.step();
    }

    fn reset(&mut self) {
        self.body = initial_body();
        self.direction = Direction::Right;
        self.requested = None;
        self.score = 0;
        self.level = 1;
        self.interval_ms = interval_for_level(1);
        self.over = false;
        self.food = self.place_food();
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn tick_interval_ms(&self) -> Option<f64> {
        Some(self.interval_ms as f64)
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn snapshot(&self) -> SnakeSnapshot {
        Snake::snapshot(self)
    }
}
