//! Janggi-lite - a small capture-and-drop board game engine
//!
//! This crate provides the core game logic, including:
//! - Compass directions and a bounded square grid
//! - A node/marker registry with named snapshots
//! - Reusable transition templates for grid movement and capture
//! - The 4x3 game state machine with promotion, drops and win detection
//!
//! # Modules
//!
//! - [`compass`]: The eight directions and direction sets
//! - [`grid`]: Cells and grid bounds
//! - [`graph`]: Node/marker registry
//! - [`templates`]: Movement, destination and capture building blocks
//! - [`piece`]: Players, piece kinds, markers and nodes
//! - [`game`]: Game state machine
//! - [`bot`]: Computer players

pub mod actions;
pub mod bot;
pub mod compass;
pub mod game;
pub mod graph;
pub mod grid;
pub mod piece;
pub mod templates;

// Re-export commonly used types
pub use actions::{Step, StepEvent};
pub use bot::{Bot, BotDifficulty};
pub use compass::{CompassError, Direction, DirectionSet};
pub use game::{GameError, GameView, JanggiGame, PieceView, STARTING_POSITION};
pub use graph::{Graph, GraphError, Snapshot, EMPTY_SNAPSHOT};
pub use grid::{Cell, Grid2D, GridNode};
pub use piece::{Marker, Node, ParseError, PieceKind, Player, INSTANCES_PER_KIND};
pub use templates::{
    CaptureTarget, DestinationRule, DistanceRule, Eligibility, Transition, TransitionRules,
};
