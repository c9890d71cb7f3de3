//! Bounded square-grid coordinates.
//!
//! - `Cell`: a signed (x, y) coordinate; x grows east, y grows south
//! - `Grid2D`: a `cols` x `rows` rectangle anchored at (0, 0)
//! - `GridNode`: lets node types that are not all cells (e.g. pools) expose
//!   their cell, so the transition templates can compute steps on them

use crate::compass::{CompassError, Direction};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A square on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other`, or `None` if it does not fit in `i32`
    pub const fn delta_to(&self, other: &Cell) -> Option<(i32, i32)> {
        match (other.x.checked_sub(self.x), other.y.checked_sub(self.y)) {
            (Some(dx), Some(dy)) => Some((dx, dy)),
            _ => None,
        }
    }

    /// The neighboring cell in a direction (may be off the grid).
    /// `None` past the edge of the `i32` range.
    pub const fn neighbor(&self, direction: Direction) -> Option<Cell> {
        let (dx, dy) = direction.xy();
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Cell::new(x, y)),
            _ => None,
        }
    }

    /// Direction of a single step from `self` to `other`
    pub fn direction_to(&self, other: &Cell) -> Result<Direction, CompassError> {
        match self.delta_to(other) {
            Some(delta) => Direction::from_xy(delta),
            None => Err(CompassError::NotUnitStep {
                dx: other.x.saturating_sub(self.x),
                dy: other.y.saturating_sub(self.y),
            }),
        }
    }

    /// Straight-line distance
    pub fn euclidean_distance(&self, other: &Cell) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }

    /// King-move distance
    pub fn chebyshev_distance(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A rectangular grid of `cols` x `rows` cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid2D {
    pub cols: i32,
    pub rows: i32,
}

impl Grid2D {
    pub const fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    pub const fn min_x(&self) -> i32 {
        0
    }

    pub const fn max_x(&self) -> i32 {
        self.cols - 1
    }

    pub const fn min_y(&self) -> i32 {
        0
    }

    pub const fn max_y(&self) -> i32 {
        self.rows - 1
    }

    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.cols && cell.y >= 0 && cell.y < self.rows
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |y| (0..cols).map(move |x| Cell::new(x, y)))
    }

    pub const fn len(&self) -> usize {
        (self.cols * self.rows) as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A graph node that may sit on a grid cell
pub trait GridNode {
    /// The cell this node occupies, or `None` for off-board nodes
    fn cell(&self) -> Option<Cell>;
}

impl GridNode for Cell {
    fn cell(&self) -> Option<Cell> {
        Some(*self)
    }
}
