//! Steps players take and the events they produce.
//!
//! A `Step` is what `is_step_valid` hands back and what `step` consumes.
//! Executing a step yields `StepEvent`s that report every identity change, so
//! a renderer can follow a piece across promotion or capture.

use crate::grid::Cell;
use crate::piece::{Marker, Node, Player};
use serde::{Deserialize, Serialize};

/// A validated move or drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    pub marker: Marker,
    pub destination: Cell,
}

impl Step {
    pub const fn new(marker: Marker, destination: Cell) -> Self {
        Self {
            marker,
            destination,
        }
    }
}

/// Events that occur while a step is carried out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepEvent {
    /// A piece entered the board from its owner's pool
    Dropped { marker: Marker, to: Cell },

    /// A piece moved across the board
    Moved { marker: Marker, from: Cell, to: Cell },

    /// A piece was taken; it now sits in the capturer's pool under a new identity
    Captured {
        captured: Marker,
        now: Marker,
        pool: Node,
    },

    /// A piece changed kind in place
    Promoted { from: Marker, to: Marker, at: Cell },

    /// The game is over
    Won { player: Player },
}
