//! Tetris rules
//!
//! A `height × width` board of optional colors, one active piece with a
//! board-relative origin (top-left of its bounding box) and a one-deep
//! look-ahead. No wall kicks: a rotation that does not fit is refused.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::Direction;
use super::lifecycle::{Command, Engine, GameEvent};
use crate::consts::tetris::*;
use crate::highscores::GameId;

/// Gravity interval for a level, recomputed from the base each time
pub fn interval_for_level(level: u32) -> f64 {
    let exponent = level.saturating_sub(1) as i32;
    INITIAL_INTERVAL_MS * SPEED_DECREASE_FACTOR.powi(exponent)
}

/// Points for clearing `rows` rows at once
pub fn line_clear_points(rows: u32, level: u32) -> u64 {
    let idx = (rows as usize).min(LINE_SCORES.len() - 1);
    LINE_SCORES[idx] * level as u64
}

/// Block color tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    Cyan,
    Blue,
    Orange,
    Yellow,
    Green,
    Purple,
    Red,
}

/// The seven tetrominoes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    pub fn color(self) -> PieceColor {
        match self {
            PieceKind::I => PieceColor::Cyan,
            PieceKind::J => PieceColor::Blue,
            PieceKind::L => PieceColor::Orange,
            PieceKind::O => PieceColor::Yellow,
            PieceKind::S => PieceColor::Green,
            PieceKind::T => PieceColor::Purple,
            PieceKind::Z => PieceColor::Red,
        }
    }

    /// Spawn orientation
    pub fn shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1]],
            PieceKind::J => &[&[1, 0, 0], &[1, 1, 1]],
            PieceKind::L => &[&[0, 0, 1], &[1, 1, 1]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceKind::T => &[&[0, 1, 0], &[1, 1, 1]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        Shape::from_rows(rows)
    }
}

/// Boolean occupancy matrix of a piece, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|&v| v != 0).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Filled cells as (column, row) offsets
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &filled)| filled)
                .map(move |(c, _)| IVec2::new(c as i32, r as i32))
        })
    }

    /// 90° clockwise: new[r][c] = old[rows - 1 - c][r]
    pub fn rotated_cw(&self) -> Shape {
        let old_rows = self.height();
        let rows = (0..self.width())
            .map(|r| (0..old_rows).map(|c| self.rows[old_rows - 1 - c][r]).collect())
            .collect();
        Shape { rows }
    }
}

/// A tetromino placed on the board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    /// Top-left of the bounding box
    pub origin: IVec2,
}

impl Piece {
    /// Spawn orientation, horizontally centered on the top row
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let shape = kind.shape();
        let x = (board_width.saturating_sub(shape.width()) / 2) as i32;
        Self {
            kind,
            shape,
            origin: IVec2::new(x, 0),
        }
    }

    /// Filled cells in board coordinates
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.shape.cells().map(move |c| c + self.origin)
    }
}

/// One board cell
pub type BoardCell = Option<PieceColor>;

/// The playfield, row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    rows: Vec<Vec<BoardCell>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![vec![None; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<BoardCell>] {
        &self.rows
    }

    /// Cell at (x, y); `None` if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<BoardCell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows.get(y as usize)?.get(x as usize).copied()
    }

    /// Set cell at (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, cell: BoardCell) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self.rows.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Every filled cell lands inside the side walls, above the floor, and
    /// on an empty cell. Rows above the board (y < 0) are open.
    pub fn can_place(&self, shape: &Shape, origin: IVec2) -> bool {
        shape.cells().map(|c| c + origin).all(|p| {
            if p.x < 0 || p.x >= self.width as i32 || p.y >= self.height() as i32 {
                return false;
            }
            p.y < 0 || self.rows[p.y as usize][p.x as usize].is_none()
        })
    }

    /// Merge a piece into the board; cells above the top edge are dropped
    pub fn lock(&mut self, piece: &Piece) {
        let color = piece.kind.color();
        for p in piece.cells() {
            self.set(p.x, p.y, Some(color));
        }
    }

    /// Remove full rows and insert empty ones at the top. Returns rows cleared.
    pub fn clear_full_rows(&mut self) -> u32 {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().all(Option::is_some));
        let cleared = before - self.rows.len();
        for _ in 0..cleared {
            self.rows.insert(0, vec![None; self.width]);
        }
        cleared as u32
    }
}

/// Tetris game state
#[derive(Debug, Clone)]
pub struct Tetris {
    board: Board,
    active: Piece,
    next: PieceKind,
    score: u64,
    lines: u32,
    level: u32,
    over: bool,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Tetris {
    /// Standard 10×20 game
    pub fn new(seed: u64) -> Self {
        Self::with_board(Board::new(BOARD_WIDTH, BOARD_HEIGHT), seed)
    }

    /// Start on a prepared board
    pub fn with_board(board: Board, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let first = random_kind(&mut rng);
        let next = random_kind(&mut rng);
        let mut tetris = Self {
            active: Piece::spawn(first, board.width()),
            board,
            next,
            score: 0,
            lines: 0,
            level: 1,
            over: false,
            rng,
            events: Vec::new(),
        };
        tetris.check_spawn();
        tetris
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> &Piece {
        &self.active
    }

    pub fn next(&self) -> PieceKind {
        self.next
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn gravity_ms(&self) -> f64 {
        interval_for_level(self.level)
    }

    /// Rotate clockwise in place. Returns false if it would collide.
    pub fn rotate(&mut self) -> bool {
        if self.over {
            return false;
        }
        let rotated = self.active.shape.rotated_cw();
        if !self.board.can_place(&rotated, self.active.origin) {
            return false;
        }
        self.active.shape = rotated;
        self.events.push(GameEvent::Select);
        true
    }

    /// Shift sideways by `dx` columns if it fits
    pub fn shift(&mut self, dx: i32) -> bool {
        self.try_move(IVec2::new(dx, 0))
    }

    /// One row down; locks the piece when it cannot fall further.
    /// Returns true if the piece moved.
    pub fn move_down(&mut self) -> bool {
        if self.over {
            return false;
        }
        if self.try_move(IVec2::Y) {
            return true;
        }
        self.lock_and_spawn();
        false
    }

    /// Drop to the floor, 1 point per row descended, then lock.
    /// Returns rows descended.
    pub fn hard_drop(&mut self) -> u32 {
        if self.over {
            return 0;
        }
        let mut distance = 0;
        while self.try_move(IVec2::Y) {
            distance += 1;
        }
        self.score += distance as u64;
        self.lock_and_spawn();
        distance
    }

    fn try_move(&mut self, delta: IVec2) -> bool {
        if self.over {
            return false;
        }
        let origin = self.active.origin + delta;
        if !self.board.can_place(&self.active.shape, origin) {
            return false;
        }
        self.active.origin = origin;
        true
    }

    fn lock_and_spawn(&mut self) {
        self.board.lock(&self.active);
        self.events.push(GameEvent::Eat);

        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            self.award_lines(cleared);
        }

        let kind = self.next;
        self.next = random_kind(&mut self.rng);
        self.active = Piece::spawn(kind, self.board.width());
        self.check_spawn();
    }

    fn award_lines(&mut self, cleared: u32) {
        self.score += line_clear_points(cleared, self.level);
        self.events.push(GameEvent::Coin);

        let before = self.lines;
        self.lines += cleared;
        if self.lines / LINES_PER_LEVEL > before / LINES_PER_LEVEL && self.level < MAX_LEVEL {
            self.level += 1;
            log::debug!("tetris level {} ({:.0} ms)", self.level, self.gravity_ms());
        }
    }

    /// A freshly spawned piece that does not fit ends the game
    fn check_spawn(&mut self) {
        if !self.board.can_place(&self.active.shape, self.active.origin) {
            self.over = true;
            self.events.push(GameEvent::GameOver);
        }
    }

    pub fn snapshot(&self) -> TetrisSnapshot {
        TetrisSnapshot {
            width: self.board.width(),
            height: self.board.height(),
            board: self.board.rows().to_vec(),
            active: self.active.clone(),
            next: self.next,
            next_shape: self.next.shape(),
            score: self.score,
            lines: self.lines,
            level: self.level,
            gravity_ms: self.gravity_ms(),
            game_over: self.over,
        }
    }
}

fn random_kind(rng: &mut Pcg32) -> PieceKind {
    PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())]
}

/// Render view of a Tetris game; the active piece is not merged into `board`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TetrisSnapshot {
    pub width: usize,
    pub height: usize,
    pub board: Vec<Vec<BoardCell>>,
    pub active: Piece,
    pub next: PieceKind,
    pub next_shape: Shape,
    pub score: u64,
    pub lines: u32,
    pub level: u32,
    pub gravity_ms: f64,
    pub game_over: bool,
}

impl Engine for Tetris {
    type Snapshot = TetrisSnapshot;
    const GAME: GameId = GameId::Tetris;

    fn command(&mut self, command: Command) {
        match command {
            Command::Move(Direction::Left) => {
                self.shift(-1);
            }
            Command::Move(Direction::Right) => {
                self.shift(1);
            }
            Command::Move(Direction::Down) => {
                self.move_down();
            }
            Command::Rotate => {
                self.rotate();
            }
            Command::HardDrop => {
                self.hard_drop();
            }
            _ => {}
        }
    }

    /// Gravity step
    fn tick(&mut self, _dt: f32) {
        self.move_down();
    }

    fn reset(&mut self) {
        self.board = Board::new(self.board.width(), self.board.height());
        self.score = 0;
        self.lines = 0;
        self.level = 1;
        self.over = false;
        let first = random_kind(&mut self.rng);
        self.next = random_kind(&mut self.rng);
        self.active = Piece::spawn(first, self.board.width());
        self.check_spawn();
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn tick_interval_ms(&self) -> Option<f64> {
        Some(self.gravity_ms())
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn snapshot(&self) -> TetrisSnapshot {
        Tetris::snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(rows: &[&[u8]]) -> Shape {
        Shape::from_rows(rows)
    }

    /// Fill row `y` except the listed columns
    fn fill_row_except(board: &mut Board, y: i32, holes: &[i32]) {
        for x in 0..board.width() as i32 {
            if !holes.contains(&x) {
                board.set(x, y, Some(PieceColor::Red));
            }
        }
    }

    fn place(tetris: &mut Tetris, kind: PieceKind, origin: IVec2) {
        tetris.active = Piece {
            kind,
            shape: kind.shape(),
            origin,
        };
    }

    #[test]
    fn test_rotate_t_clockwise() {
        let t = PieceKind::T.shape();
        assert_eq!(t.rotated_cw(), shape(&[&[1, 0], &[1, 1], &[1, 0]]));
        let i = PieceKind::I.shape().rotated_cw();
        assert_eq!((i.width(), i.height()), (1, 4));
    }

    #[test]
    fn test_four_rotations_identity() {
        for kind in PieceKind::ALL {
            let mut tetris = Tetris::new(1);
            place(&mut tetris, kind, IVec2::new(4, 8));
            for _ in 0..4 {
                assert!(tetris.rotate());
            }
            assert_eq!(tetris.active().shape, kind.shape());
            assert_eq!(tetris.active().origin, IVec2::new(4, 8));
        }
    }

    #[test]
    fn test_rotation_into_wall_rejected() {
        let mut tetris = Tetris::new(1);
        place(&mut tetris, PieceKind::I, IVec2::new(9, 5));
        tetris.active.shape = PieceKind::I.shape().rotated_cw();
        let before = tetris.active().clone();
        assert!(!tetris.rotate());
        assert_eq!(tetris.active(), &before);
    }

    #[test]
    fn test_can_place_bounds() {
        let mut board = Board::new(10, 20);
        let o = PieceKind::O.shape();
        assert!(board.can_place(&o, IVec2::new(0, 0)));
        assert!(board.can_place(&o, IVec2::new(8, 18)));
        assert!(!board.can_place(&o, IVec2::new(9, 0)));
        assert!(!board.can_place(&o, IVec2::new(-1, 0)));
        assert!(!board.can_place(&o, IVec2::new(0, 19)));
        // Above the top edge is open
        assert!(board.can_place(&o, IVec2::new(0, -2)));

        board.set(1, 1, Some(PieceColor::Blue));
        assert!(!board.can_place(&o, IVec2::new(0, 0)));
        assert!(board.can_place(&o, IVec2::new(2, 0)));
    }

    #[test]
    fn test_o_piece_clears_two_rows() {
        let mut board = Board::new(10, 20);
        fill_row_except(&mut board, 18, &[0, 1]);
        fill_row_except(&mut board, 19, &[0, 1]);
        board.set(5, 17, Some(PieceColor::Green));

        let mut tetris = Tetris::with_board(board, 3);
        place(&mut tetris, PieceKind::O, IVec2::new(0, 18));
        tetris.take_events();

        assert!(!tetris.move_down());
        assert_eq!(tetris.board().height(), 20);
        assert_eq!(Engine::score(&tetris), line_clear_points(2, 1));
        assert_eq!(Engine::score(&tetris), 300);
        assert_eq!(tetris.lines(), 2);
        // The lone block above the cleared rows dropped two rows
        assert_eq!(tetris.board().get(5, 19), Some(Some(PieceColor::Green)));
        assert!(tetris.board().rows()[..19].iter().flatten().all(Option::is_none));
        assert_eq!(tetris.take_events(), vec![GameEvent::Eat, GameEvent::Coin]);
    }

    #[test]
    fn test_score_scales_with_level() {
        let mut board = Board::new(10, 20);
        fill_row_except(&mut board, 19, &[0]);
        let mut tetris = Tetris::with_board(board, 3);
        tetris.level = 3;
        tetris.lines = 10;
        place(&mut tetris, PieceKind::I, IVec2::new(0, 16));
        tetris.active.shape = PieceKind::I.shape().rotated_cw();

        tetris.move_down();
        assert_eq!(Engine::score(&tetris), 100 * 3);
    }

    #[test]
    fn test_level_up_and_gravity() {
        let mut board = Board::new(10, 20);
        fill_row_except(&mut board, 18, &[0, 1]);
        fill_row_except(&mut board, 19, &[0, 1]);
        let mut tetris = Tetris::with_board(board, 3);
        tetris.lines = 4;
        place(&mut tetris, PieceKind::O, IVec2::new(0, 18));

        tetris.move_down();
        assert_eq!(tetris.lines(), 6);
        assert_eq!(tetris.level(), 2);
        assert!((tetris.gravity_ms() - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_gravity_curve() {
        assert_eq!(interval_for_level(1), 500.0);
        assert!((interval_for_level(3) - 405.0).abs() < 1e-9);
        assert!((interval_for_level(MAX_LEVEL) - 500.0 * 0.9f64.powi(9)).abs() < 1e-9);
    }

    #[test]
    fn test_hard_drop_awards_distance() {
        let mut tetris = Tetris::new(5);
        place(&mut tetris, PieceKind::O, IVec2::new(4, 0));
        assert_eq!(tetris.hard_drop(), 18);
        assert_eq!(Engine::score(&tetris), 18);
        assert_eq!(tetris.board().get(4, 19), Some(Some(PieceColor::Yellow)));
        assert_eq!(tetris.board().get(5, 18), Some(Some(PieceColor::Yellow)));
    }

    #[test]
    fn test_spawn_promotes_look_ahead() {
        let mut tetris = Tetris::new(8);
        let upcoming = tetris.next();
        tetris.hard_drop();
        assert_eq!(tetris.active().kind, upcoming);
        assert_eq!(tetris.active().origin.y, 0);
        let w = upcoming.shape().width() as i32;
        assert_eq!(tetris.active().origin.x, (10 - w) / 2);
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut board = Board::new(10, 20);
        for x in 2..8 {
            board.set(x, 0, Some(PieceColor::Red));
            board.set(x, 1, Some(PieceColor::Red));
        }
        // Build on an open board, then block the spawn area
        let mut tetris = Tetris::new(2);
        tetris.board = board;
        place(&mut tetris, PieceKind::O, IVec2::new(0, 18));
        tetris.take_events();

        tetris.move_down();
        assert!(tetris.is_over());
        assert_eq!(tetris.take_events(), vec![GameEvent::Eat, GameEvent::GameOver]);

        // Nothing moves after the game ends
        let frozen = tetris.snapshot();
        assert!(!tetris.move_down());
        assert!(!tetris.rotate());
        assert_eq!(tetris.hard_drop(), 0);
        assert_eq!(tetris.snapshot(), frozen);
    }

    #[test]
    fn test_commands_map_to_moves() {
        let mut tetris = Tetris::new(4);
        place(&mut tetris, PieceKind::T, IVec2::new(4, 0));
        tetris.command(Command::Move(Direction::Left));
        assert_eq!(tetris.active().origin, IVec2::new(3, 0));
        tetris.command(Command::Move(Direction::Right));
        tetris.command(Command::Move(Direction::Right));
        assert_eq!(tetris.active().origin, IVec2::new(5, 0));
        tetris.command(Command::Move(Direction::Down));
        assert_eq!(tetris.active().origin, IVec2::new(5, 1));
        // Up is not a Tetris move
        tetris.command(Command::Move(Direction::Up));
        assert_eq!(tetris.active().origin, IVec2::new(5, 1));
    }

    #[test]
    fn test_reset_clears_board() {
        let mut tetris = Tetris::new(6);
        tetris.hard_drop();
        tetris.reset();
        assert!(tetris.board().rows().iter().flatten().all(Option::is_none));
        assert_eq!(Engine::score(&tetris), 0);
        assert_eq!(tetris.level(), 1);
        assert!(!tetris.is_over());
    }

    proptest::proptest! {
        #[test]
        fn prop_board_keeps_dimensions(seed in 0u64..1000, moves in proptest::collection::vec(0u8..5, 1..300)) {
            let mut tetris = Tetris::new(seed);
            let mut last_score = 0;
            for m in moves {
                match m {
                    0 => { tetris.shift(-1); }
                    1 => { tetris.shift(1); }
                    2 => { tetris.rotate(); }
                    3 => { tetris.hard_drop(); }
                    _ => { tetris.move_down(); }
                }
                proptest::prop_assert_eq!(tetris.board().height(), BOARD_HEIGHT);
                proptest::prop_assert!(tetris.board().rows().iter().all(|row| row.len() == BOARD_WIDTH));
                proptest::prop_assert!(tetris.score() >= last_score);
                proptest::prop_assert!(tetris.level() <= MAX_LEVEL);
                last_score = tetris.score();
                if tetris.is_over() {
                    break;
                }
            }
        }
    }
}
