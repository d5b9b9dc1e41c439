//! Simulation module
//!
//! All gameplay logic lives here. Engines are pure and synchronous:
//! - Seeded RNG only
//! - Commands applied between ticks, never mid-tick
//! - No rendering or platform dependencies

pub mod collision;
pub mod grid;
pub mod lifecycle;
pub mod pong;
pub mod snake;
pub mod tetris;

pub use collision::{CollisionResult, ContactBand, reflect_velocity};
pub use grid::{Cell, Direction, GridSize};
pub use lifecycle::{Command, Engine, GameEvent, Phase, Session, SessionSnapshot};
pub use pong::{Difficulty, Pong, PongSnapshot, Side};
pub use snake::{Snake, SnakeSnapshot};
pub use tetris::{Board, Piece, PieceColor, PieceKind, Shape, Tetris, TetrisSnapshot};
