//! Core game state machine.
//!
//! `JanggiGame` owns the node/marker registry for a 4x3 board with one pool per
//! player, the movement rules, the turn counter and the winner. Legality checks
//! go through [`JanggiGame::is_step_valid`]; state changes go through
//! [`JanggiGame::step`] or [`JanggiGame::apply_step`].

use crate::actions::{Step, StepEvent};
use crate::compass::{Direction, DirectionSet};
use crate::graph::{Graph, GraphError};
use crate::grid::{Cell, Grid2D};
use crate::piece::{Marker, Node, PieceKind, Player, INSTANCES_PER_KIND};
use crate::templates::{
    adjacent, CaptureTarget, DestinationRule, DistanceRule, Eligibility, TransitionRules,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Board width
pub const COLS: i32 = 4;

/// Board height
pub const ROWS: i32 = 3;

/// Snapshot restored by [`JanggiGame::reset`]
pub const RESET_SNAPSHOT: &str = "reset";

/// Where each piece starts. Red holds the west column, Green the east one.
pub const STARTING_POSITION: [(Marker, Cell); 8] = [
    (Marker::first(Player::Red, PieceKind::King), Cell::new(0, 1)),
    (Marker::first(Player::Red, PieceKind::Minister), Cell::new(0, 0)),
    (Marker::first(Player::Red, PieceKind::General), Cell::new(0, 2)),
    (Marker::first(Player::Red, PieceKind::Man), Cell::new(1, 1)),
    (Marker::first(Player::Green, PieceKind::King), Cell::new(3, 1)),
    (Marker::first(Player::Green, PieceKind::Minister), Cell::new(3, 2)),
    (Marker::first(Player::Green, PieceKind::General), Cell::new(3, 0)),
    (Marker::first(Player::Green, PieceKind::Man), Cell::new(2, 1)),
];

/// Errors returned by game operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Game is over")]
    GameOver,

    #[error("{marker} cannot step to {destination}")]
    IllegalStep { marker: Marker, destination: Cell },

    #[error("Cell {0} is already occupied")]
    CellOccupied(Cell),

    #[error("No free identity left for {owner} {kind}")]
    IdentitiesExhausted { owner: Player, kind: PieceKind },

    #[error("{count} pieces of class {kind} in play, at most {} allowed", INSTANCES_PER_KIND)]
    TooManyPieces { kind: PieceKind, count: usize },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One occupied board cell, as seen by renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub cell: Cell,
    pub marker: Marker,
    pub label: String,
}

/// Read-only snapshot of the whole game for renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub cols: i32,
    pub rows: i32,
    pub turn: u32,
    pub current_player: Player,
    pub winner: Option<Player>,
    pub pieces: Vec<PieceView>,
    pub red_pool: Vec<Marker>,
    pub green_pool: Vec<Marker>,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct JanggiGame {
    graph: Graph<Node, Marker>,
    rules: TransitionRules<Node, Marker>,
    /// What a dropped piece may land on
    drops: DestinationRule<Node, Marker>,
    grid: Grid2D,
    turn: u32,
    /// Turn restored by `reset`
    start_turn: u32,
    winner: Option<Player>,
}

impl JanggiGame {
    /// A game in the starting position, Green to move
    pub fn new() -> Self {
        let placements = STARTING_POSITION.map(|(marker, cell)| (marker, Node::Cell(cell)));
        Self::with_position(&placements, 0).expect("starting position fits the board")
    }

    /// A game set up from explicit placements.
    ///
    /// The position becomes the one [`reset`](Self::reset) returns to. Each
    /// board cell takes at most one piece, and each base class (a Feudal Lord
    /// counts as a Man) has at most [`INSTANCES_PER_KIND`] pieces across both
    /// sides, so captures and promotions always find a free identity.
    pub fn with_position(placements: &[(Marker, Node)], turn: u32) -> Result<Self, GameError> {
        let grid = Grid2D::new(COLS, ROWS);
        let nodes = grid
            .cells()
            .map(Node::Cell)
            .chain(Player::ALL.map(Node::Pool));
        let mut graph = Graph::new(nodes, Marker::universe());

        for &(marker, node) in placements {
            if let Node::Cell(cell) = node {
                if !graph.is_empty(&node) {
                    return Err(GameError::CellOccupied(cell));
                }
            }
            graph.place(marker, node)?;
        }
        for kind in PieceKind::ALL {
            let count = graph
                .placements()
                .filter(|(marker, _)| marker.kind.base() == kind)
                .count();
            if count > INSTANCES_PER_KIND as usize {
                return Err(GameError::TooManyPieces { kind, count });
            }
        }
        graph.save(RESET_SNAPSHOT);

        Ok(Self {
            graph,
            rules: movement_rules(),
            drops: DestinationRule::MustBeEmpty,
            grid,
            turn,
            start_turn: turn,
            winner: None,
        })
    }

    /// Return to the position the game was created with
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.graph.load(RESET_SNAPSHOT)?;
        self.turn = self.start_turn;
        self.winner = None;
        debug!("game reset");
        Ok(())
    }

    /// Directions a piece of `owner` and `kind` may step in
    pub fn movement_pattern(owner: Player, kind: PieceKind) -> DirectionSet {
        use Direction::*;

        match (kind, owner) {
            (PieceKind::King, _) => DirectionSet::from(Direction::adjacents()),
            (PieceKind::General, _) => DirectionSet::from(Direction::cardinals()),
            (PieceKind::Minister, _) => DirectionSet::from(Direction::ordinals()),
            (PieceKind::Man, Player::Green) => [W].into_iter().collect(),
            (PieceKind::Man, Player::Red) => [E].into_iter().collect(),
            (PieceKind::FeudalLord, Player::Green) => [N, E, S, W, NW, SW].into_iter().collect(),
            (PieceKind::FeudalLord, Player::Red) => [N, E, S, W, NE, SE].into_iter().collect(),
        }
    }

    pub fn graph(&self) -> &Graph<Node, Marker> {
        &self.graph
    }

    pub fn cols(&self) -> i32 {
        self.grid.cols
    }

    pub fn rows(&self) -> i32 {
        self.grid.rows
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Green moves on even turns, Red on odd ones
    pub fn current_player(&self) -> Player {
        if self.turn % 2 == 0 {
            Player::Green
        } else {
            Player::Red
        }
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// The piece on `cell`, if any
    pub fn marker_at(&self, cell: Cell) -> Option<Marker> {
        self.graph.markers_at(&Node::Cell(cell)).next()
    }

    /// Pieces waiting in a player's pool
    pub fn pool(&self, player: Player) -> Vec<Marker> {
        self.graph.markers_at(&Node::Pool(player)).collect()
    }

    pub fn node_of(&self, marker: Marker) -> Option<Node> {
        self.graph.node_of(&marker)
    }

    /// Whether `cell` lies on the column `player` is trying to reach
    pub fn in_opponent_territory(&self, player: Player, cell: Cell) -> bool {
        match player {
            Player::Green => cell.x == self.grid.min_x(),
            Player::Red => cell.x == self.grid.max_x(),
        }
    }

    /// Check whether `marker` may go to `destination` this turn.
    ///
    /// Returns the step to pass to [`apply_step`](Self::apply_step), or `None`
    /// when the rules forbid it. Fails only once the game is over.
    pub fn is_step_valid(&self, marker: Marker, destination: Cell) -> Result<Option<Step>, GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }
        if marker.owner != self.current_player() {
            trace!(%marker, "not this player's turn");
            return Ok(None);
        }
        if !self.grid.contains(destination) {
            trace!(%marker, %destination, "destination off the board");
            return Ok(None);
        }
        let Some(origin) = self.graph.node_of(&marker) else {
            trace!(%marker, "marker is not in play");
            return Ok(None);
        };

        let target = Node::Cell(destination);
        let legal = match origin {
            Node::Pool(_) => {
                self.drops.allows(&self.graph, marker, target)
                    && !self.in_opponent_territory(marker.owner, destination)
            }
            Node::Cell(_) => self
                .rules
                .validate(&self.graph, &[marker], target, Eligibility::Single)
                .is_some(),
        };

        if legal {
            Ok(Some(Step::new(marker, destination)))
        } else {
            trace!(%marker, from = %origin, %destination, "step rejected");
            Ok(None)
        }
    }

    /// Validate and carry out a step, returning the winner if there is one
    pub fn step(&mut self, marker: Marker, destination: Cell) -> Result<Option<Player>, GameError> {
        let step = self
            .is_step_valid(marker, destination)?
            .ok_or(GameError::IllegalStep {
                marker,
                destination,
            })?;
        self.apply_step(step)?;
        Ok(self.winner)
    }

    /// Carry out a step and report everything that happened.
    ///
    /// The step is checked again first. On error the game is left unchanged.
    pub fn apply_step(&mut self, step: Step) -> Result<Vec<StepEvent>, GameError> {
        let Step {
            marker,
            destination,
        } = step;
        if self.is_step_valid(marker, destination)? != Some(step) {
            return Err(GameError::IllegalStep {
                marker,
                destination,
            });
        }

        let player = marker.owner;
        let target = Node::Cell(destination);
        let mut graph = self.graph.clone();
        let mut winner = None;
        let mut events = Vec::new();

        let moved = match graph.node_of(&marker) {
            Some(Node::Cell(from)) => {
                let transition = self
                    .rules
                    .validate(&graph, &[marker], target, Eligibility::Single)
                    .ok_or(GameError::IllegalStep {
                        marker,
                        destination,
                    })?;
                let displaced = self.rules.apply(&mut graph, &transition)?;
                events.push(StepEvent::Moved {
                    marker,
                    from,
                    to: destination,
                });

                for (captured, pool) in displaced {
                    let now = free_identity(&graph, player, captured.kind.base())?;
                    graph.relabel(captured, now)?;
                    debug!(%captured, %now, "piece captured");
                    events.push(StepEvent::Captured { captured, now, pool });
                    if captured.kind == PieceKind::King {
                        winner = Some(player);
                    }
                }
                true
            }
            Some(Node::Pool(_)) => {
                graph.move_marker(marker, target)?;
                events.push(StepEvent::Dropped {
                    marker,
                    to: destination,
                });
                false
            }
            None => return Err(GraphError::NotPlaced(format!("{marker:?}")).into()),
        };

        if moved && self.in_opponent_territory(player, destination) {
            if marker.kind == PieceKind::King {
                winner = Some(player);
            } else if let Some(kind) = marker.kind.promoted() {
                let promoted = free_identity(&graph, player, kind)?;
                graph.relabel(marker, promoted)?;
                debug!(from = %marker, to = %promoted, "piece promoted");
                events.push(StepEvent::Promoted {
                    from: marker,
                    to: promoted,
                    at: destination,
                });
            }
        }

        self.graph = graph;
        self.turn += 1;
        debug!(%marker, %destination, turn = self.turn, "step applied");

        if let Some(player) = winner {
            self.winner = Some(player);
            debug!(%player, "game won");
            events.push(StepEvent::Won { player });
        }

        Ok(events)
    }

    /// Every legal step of the side to move
    pub fn legal_steps(&self) -> Vec<Step> {
        if self.winner.is_some() {
            return Vec::new();
        }

        let player = self.current_player();
        let own: Vec<Marker> = self
            .graph
            .placements()
            .map(|(marker, _)| marker)
            .filter(|marker| marker.owner == player)
            .collect();

        own.iter()
            .flat_map(|&marker| self.grid.cells().map(move |cell| (marker, cell)))
            .filter_map(|(marker, cell)| self.is_step_valid(marker, cell).ok().flatten())
            .collect()
    }

    /// Renderer-friendly view of the current state
    pub fn to_view(&self) -> GameView {
        let pieces = self
            .grid
            .cells()
            .filter_map(|cell| {
                self.marker_at(cell).map(|marker| PieceView {
                    cell,
                    marker,
                    label: marker.label(),
                })
            })
            .collect();

        GameView {
            cols: self.cols(),
            rows: self.rows(),
            turn: self.turn,
            current_player: self.current_player(),
            winner: self.winner,
            pieces,
            red_pool: self.pool(Player::Red),
            green_pool: self.pool(Player::Green),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_view())
    }
}

impl Default for JanggiGame {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JanggiGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in self.grid.min_y()..=self.grid.max_y() {
            let row: Vec<String> = (self.grid.min_x()..=self.grid.max_x())
                .map(|x| {
                    self.marker_at(Cell::new(x, y))
                        .map_or_else(|| "....".to_string(), |m| m.label())
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        for player in Player::ALL {
            let pool: Vec<String> = self.pool(player).iter().map(Marker::label).collect();
            writeln!(f, "{player} pool: {}", pool.join(" "))?;
        }
        Ok(())
    }
}

/// Lowest instance of `(owner, kind)` not currently in play
fn free_identity(
    graph: &Graph<Node, Marker>,
    owner: Player,
    kind: PieceKind,
) -> Result<Marker, GameError> {
    (0..INSTANCES_PER_KIND)
        .map(|instance| Marker::new(owner, kind, instance))
        .find(|marker| !graph.is_placed(marker))
        .ok_or(GameError::IdentitiesExhausted { owner, kind })
}

fn marker_pattern(marker: Marker) -> DirectionSet {
    JanggiGame::movement_pattern(marker.owner, marker.kind)
}

fn not_allied(graph: &Graph<Node, Marker>, marker: Marker, destination: Node) -> bool {
    graph
        .markers_at(&destination)
        .all(|other| other.owner != marker.owner)
}

fn capturer_pool(captured: Marker) -> Node {
    Node::Pool(captured.owner.opponent())
}

fn movement_rules() -> TransitionRules<Node, Marker> {
    TransitionRules {
        pattern: marker_pattern,
        distance: DistanceRule::Within(adjacent),
        destination: DestinationRule::Custom(not_allied),
        capture: CaptureTarget::With(capturer_pool),
    }
}
