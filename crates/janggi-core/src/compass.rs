//! Compass directions on a square grid.
//!
//! This module provides the directional vocabulary used by movement patterns:
//! - `Direction`: the eight compass points, clockwise from NorthWest
//! - `DirectionSet`: a compact set of directions for per-piece patterns
//! - Named groups (cardinals, ordinals, per-side triples) for declaring patterns
//!
//! Vectors use screen orientation: x grows to the east, y grows to the south,
//! so North is `(0, -1)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from direction lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompassError {
    #[error("Unknown direction name: {0:?}")]
    UnknownName(String),

    #[error("({dx}, {dy}) is not a unit step")]
    NotUnitStep { dx: i32, dy: i32 },
}

/// One of the eight compass points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    NW,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
}

impl Direction {
    /// All directions in clockwise order starting from NorthWest
    pub const ALL: [Direction; 8] = [
        Direction::NW,
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
    ];

    const CARDINALS: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];
    const ORDINALS: [Direction; 4] = [Direction::NW, Direction::NE, Direction::SE, Direction::SW];
    const VERTICALS: [Direction; 6] = [
        Direction::NW,
        Direction::N,
        Direction::NE,
        Direction::SE,
        Direction::S,
        Direction::SW,
    ];
    const HORIZONTALS: [Direction; 6] = [
        Direction::NW,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::SW,
        Direction::W,
    ];
    const ALL_NORTH: [Direction; 3] = [Direction::NW, Direction::N, Direction::NE];
    const ALL_EAST: [Direction; 3] = [Direction::NE, Direction::E, Direction::SE];
    const ALL_SOUTH: [Direction; 3] = [Direction::SE, Direction::S, Direction::SW];
    const ALL_WEST: [Direction; 3] = [Direction::SW, Direction::W, Direction::NW];

    /// Position in the clockwise order
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short upper-case name ("NW", "N", ...)
    pub const fn name(self) -> &'static str {
        match self {
            Direction::NW => "NW",
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
        }
    }

    /// Unit vector pointing in this direction
    pub const fn xy(self) -> (i32, i32) {
        match self {
            Direction::NW => (-1, -1),
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
        }
    }

    /// Direction of a unit vector.
    ///
    /// Only the eight nonzero vectors with components in `-1..=1` have a
    /// direction; the zero vector and longer vectors are rejected.
    pub fn from_xy((dx, dy): (i32, i32)) -> Result<Direction, CompassError> {
        Direction::ALL
            .into_iter()
            .find(|d| d.xy() == (dx, dy))
            .ok_or(CompassError::NotUnitStep { dx, dy })
    }

    /// The opposite direction
    pub const fn flip(self) -> Direction {
        self.rotate(4)
    }

    /// Rotate clockwise by `steps` eighths of a turn (negative for counter-clockwise)
    pub const fn rotate(self, steps: i32) -> Direction {
        let i = (self.index() as i32 + steps).rem_euclid(8);
        Direction::ALL[i as usize]
    }

    /// All eight directions clockwise, starting at `start`
    pub fn clockwise(start: Direction) -> [Direction; 8] {
        std::array::from_fn(|i| start.rotate(i as i32))
    }

    /// All eight directions counter-clockwise, starting at `start`
    pub fn counter_clockwise(start: Direction) -> [Direction; 8] {
        std::array::from_fn(|i| start.rotate(-(i as i32)))
    }

    pub const fn is_cardinal(self) -> bool {
        matches!(self, Direction::N | Direction::E | Direction::S | Direction::W)
    }

    pub const fn is_ordinal(self) -> bool {
        !self.is_cardinal()
    }

    /// Every direction (a King's reach)
    pub fn adjacents() -> &'static [Direction] {
        &Self::ALL
    }

    /// N, E, S, W
    pub fn cardinals() -> &'static [Direction] {
        &Self::CARDINALS
    }

    /// NW, NE, SE, SW
    pub fn ordinals() -> &'static [Direction] {
        &Self::ORDINALS
    }

    /// Alias of [`Direction::cardinals`]
    pub fn orthogonals() -> &'static [Direction] {
        &Self::CARDINALS
    }

    /// Alias of [`Direction::ordinals`]
    pub fn diagonals() -> &'static [Direction] {
        &Self::ORDINALS
    }

    /// Directions with a north or south component
    pub fn verticals() -> &'static [Direction] {
        &Self::VERTICALS
    }

    /// Directions with an east or west component
    pub fn horizontals() -> &'static [Direction] {
        &Self::HORIZONTALS
    }

    pub fn all_north() -> &'static [Direction] {
        &Self::ALL_NORTH
    }

    pub fn all_east() -> &'static [Direction] {
        &Self::ALL_EAST
    }

    pub fn all_south() -> &'static [Direction] {
        &Self::ALL_SOUTH
    }

    pub fn all_west() -> &'static [Direction] {
        &Self::ALL_WEST
    }

    /// Parse a whitespace-separated list of names, e.g. `"n e s w nw sw"`
    pub fn parse_list(names: &str) -> Result<Vec<Direction>, CompassError> {
        names.split_whitespace().map(str::parse).collect()
    }
}

impl FromStr for Direction {
    type Err = CompassError;

    /// Accepts abbreviations and full names in any case, with optional
    /// separators: `nw`, `NorthWest`, `north_west`, `NORTH-WEST`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let direction = match normalized.as_str() {
            "NW" | "NORTHWEST" => Direction::NW,
            "N" | "NORTH" => Direction::N,
            "NE" | "NORTHEAST" => Direction::NE,
            "E" | "EAST" => Direction::E,
            "SE" | "SOUTHEAST" => Direction::SE,
            "S" | "SOUTH" => Direction::S,
            "SW" | "SOUTHWEST" => Direction::SW,
            "W" | "WEST" => Direction::W,
            _ => return Err(CompassError::UnknownName(s.to_string())),
        };
        Ok(direction)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of directions, one bit per compass point.
///
/// Iteration follows the clockwise order of [`Direction::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | (1 << direction.index()))
    }

    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&d| self.contains(d))
    }
}

impl From<&[Direction]> for DirectionSet {
    fn from(directions: &[Direction]) -> Self {
        directions
            .iter()
            .fold(DirectionSet::EMPTY, |set, &d| set.with(d))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter().fold(DirectionSet::EMPTY, |set, d| set.with(d))
    }
}

impl fmt::Display for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Direction::name).collect();
        write!(f, "[{}]", names.join(" "))
    }
}
