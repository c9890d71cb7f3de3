//! Players, piece kinds, markers and board nodes.
//!
//! This module contains:
//! - `Player`: the two sides, with their sign and starting side
//! - `PieceKind`: the five kinds and their promotion/demotion rules
//! - `Marker`: one piece identity (owner + kind + instance number)
//! - `Node`: a board cell or a player's pool

use crate::grid::{Cell, GridNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identities available per (owner, kind).
///
/// Each side starts with one piece of each base class, so at most two pieces
/// of a class can ever belong to the same side.
pub const INSTANCES_PER_KIND: u8 = 2;

/// Errors from parsing names typed by a user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown player {0:?}")]
    UnknownPlayer(String),

    #[error("Unknown piece kind {0:?}")]
    UnknownKind(String),

    #[error("Unknown difficulty {0:?}")]
    UnknownDifficulty(String),
}

/// One of the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// Negative side, starts on the west column
    Red,
    /// Positive side, starts on the east column and moves first
    Green,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Red, Player::Green];

    /// -1 for Red, +1 for Green
    pub const fn sign(self) -> i8 {
        match self {
            Player::Red => -1,
            Player::Green => 1,
        }
    }

    pub const fn opponent(self) -> Player {
        match self {
            Player::Red => Player::Green,
            Player::Green => Player::Red,
        }
    }

    pub const fn sign_char(self) -> char {
        match self {
            Player::Red => '-',
            Player::Green => '+',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Player::Red => "Red",
            Player::Green => "Green",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Player {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "-" => Ok(Player::Red),
            "green" | "+" => Ok(Player::Green),
            _ => Err(ParseError::UnknownPlayer(s.to_string())),
        }
    }
}

/// Piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    General,
    Minister,
    Man,
    /// A promoted Man
    FeudalLord,
}

impl PieceKind {
    pub const ALL: [PieceKind; 5] = [
        PieceKind::King,
        PieceKind::General,
        PieceKind::Minister,
        PieceKind::Man,
        PieceKind::FeudalLord,
    ];

    /// The kind a captured piece reverts to
    pub const fn base(self) -> PieceKind {
        match self {
            PieceKind::FeudalLord => PieceKind::Man,
            other => other,
        }
    }

    /// The kind this piece becomes on entering opponent territory, if any
    pub const fn promoted(self) -> Option<PieceKind> {
        match self {
            PieceKind::Man => Some(PieceKind::FeudalLord),
            _ => None,
        }
    }

    /// Three-letter board label
    pub const fn abbrev(self) -> &'static str {
        match self {
            PieceKind::King => "KIN",
            PieceKind::General => "GEN",
            PieceKind::Minister => "MIN",
            PieceKind::Man => "MAN",
            PieceKind::FeudalLord => "FEU",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PieceKind::King => "King",
            PieceKind::General => "General",
            PieceKind::Minister => "Minister",
            PieceKind::Man => "Man",
            PieceKind::FeudalLord => "Feudal Lord",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PieceKind {
    type Err = ParseError;

    /// Accepts full names (`king`, `feudal_lord`) and board labels (`KIN`, `FEU`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "KING" | "KIN" | "K" => Ok(PieceKind::King),
            "GENERAL" | "GEN" | "G" => Ok(PieceKind::General),
            "MINISTER" | "MIN" | "M" => Ok(PieceKind::Minister),
            "MAN" | "N" => Ok(PieceKind::Man),
            "FEUDALLORD" | "FEU" | "F" => Ok(PieceKind::FeudalLord),
            _ => Err(ParseError::UnknownKind(s.to_string())),
        }
    }
}

/// A single piece identity.
///
/// Two pieces of the same owner and kind are told apart by `instance`. When a
/// piece changes owner or kind it takes over another, currently unused, identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Marker {
    pub owner: Player,
    pub kind: PieceKind,
    pub instance: u8,
}

impl Marker {
    pub const fn new(owner: Player, kind: PieceKind, instance: u8) -> Self {
        Self {
            owner,
            kind,
            instance,
        }
    }

    /// The first identity of a kind, the one pieces start the game with
    pub const fn first(owner: Player, kind: PieceKind) -> Self {
        Self::new(owner, kind, 0)
    }

    /// Every identity the game knows about
    pub fn universe() -> impl Iterator<Item = Marker> {
        Player::ALL.into_iter().flat_map(|owner| {
            PieceKind::ALL.into_iter().flat_map(move |kind| {
                (0..INSTANCES_PER_KIND).map(move |instance| Marker::new(owner, kind, instance))
            })
        })
    }

    /// Four-character board label, e.g. `+MAN`
    pub fn label(&self) -> String {
        format!("{}{}", self.owner.sign_char(), self.kind.abbrev())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance == 0 {
            write!(f, "{}", self.label())
        } else {
            write!(f, "{}#{}", self.label(), self.instance)
        }
    }
}

/// A place a marker can be: a board cell or a player's pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    Cell(Cell),
    Pool(Player),
}

impl Node {
    pub const fn at(x: i32, y: i32) -> Self {
        Node::Cell(Cell::new(x, y))
    }

    pub const fn is_pool(&self) -> bool {
        matches!(self, Node::Pool(_))
    }
}

impl GridNode for Node {
    fn cell(&self) -> Option<Cell> {
        match self {
            Node::Cell(cell) => Some(*cell),
            Node::Pool(_) => None,
        }
    }
}

impl From<Cell> for Node {
    fn from(cell: Cell) -> Self {
        Node::Cell(cell)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Cell(cell) => write!(f, "({cell})"),
            Node::Pool(player) => write!(f, "{} pool", player),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_players() {
        assert_eq!(Player::Red.sign(), -1);
        assert_eq!(Player::Green.sign(), 1);
        assert_eq!(Player::Red.opponent(), Player::Green);
        assert_eq!(Player::Green.opponent().opponent(), Player::Green);
        assert_eq!("green".parse::<Player>(), Ok(Player::Green));
        assert_eq!(
            "blue".parse::<Player>(),
            Err(ParseError::UnknownPlayer("blue".to_string()))
        );
    }

    #[test]
    fn test_base_and_promotion() {
        assert_eq!(PieceKind::FeudalLord.base(), PieceKind::Man);
        assert_eq!(PieceKind::King.base(), PieceKind::King);
        assert_eq!(PieceKind::Man.promoted(), Some(PieceKind::FeudalLord));
        assert_eq!(PieceKind::General.promoted(), None);
        assert_eq!(PieceKind::FeudalLord.promoted(), None);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("king".parse::<PieceKind>(), Ok(PieceKind::King));
        assert_eq!("Feudal_Lord".parse::<PieceKind>(), Ok(PieceKind::FeudalLord));
        assert_eq!("MAN".parse::<PieceKind>(), Ok(PieceKind::Man));
        assert_eq!(
            "queen".parse::<PieceKind>(),
            Err(ParseError::UnknownKind("queen".to_string()))
        );
    }

    #[test]
    fn test_universe_is_distinct() {
        let all: Vec<Marker> = Marker::universe().collect();
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 2 * 5 * INSTANCES_PER_KIND as usize);
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_marker_labels() {
        let man = Marker::first(Player::Green, PieceKind::Man);
        assert_eq!(man.label(), "+MAN");
        assert_eq!(man.to_string(), "+MAN");
        let lord = Marker::new(Player::Red, PieceKind::FeudalLord, 1);
        assert_eq!(lord.to_string(), "-FEU#1");
    }

    #[test]
    fn test_node_cells() {
        assert_eq!(Node::at(1, 2).cell(), Some(Cell::new(1, 2)));
        assert_eq!(Node::Pool(Player::Red).cell(), None);
        assert!(Node::Pool(Player::Red).is_pool());
    }
}
