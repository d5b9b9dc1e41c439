//! Grid geometry for the cell-based games
//!
//! Coordinates are integer (x, y) with x growing right and y growing down,
//! matching how boards are drawn row by row.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A single grid coordinate
pub type Cell = IVec2;

/// Compass direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step for one move in this direction
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// True when `other` points exactly back the way `self` goes
    #[inline]
    pub fn is_reverse_of(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Fixed dimensions of a rectangular field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: i32) -> Self {
        Self::new(side, side)
    }

    /// Check if a cell lies inside the field
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }
}

/// Two cells share an edge
#[inline]
pub fn are_adjacent(a: Cell, b: Cell) -> bool {
    let d = (a - b).abs();
    d.x + d.y == 1
}
