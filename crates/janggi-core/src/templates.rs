//! Reusable transition building blocks for grid games.
//!
//! Chess-like moves, drops and stacked moves keep asking the same questions:
//! is the destination close enough, is it in one of the piece's directions,
//! may it be occupied, and where do displaced pieces go. This module provides
//! those predicates and the matching step effect, and gathers one choice of
//! each into a [`TransitionRules`] value that a game builds once and consults on
//! every move.

use crate::compass::{Direction, DirectionSet};
use crate::graph::{Graph, GraphError};
use crate::grid::{Cell, GridNode};
use std::fmt::{self, Debug};
use std::hash::Hash;

/// How far a single transition may travel
#[derive(Clone, Copy)]
pub enum DistanceRule {
    /// Straight-line distance at most this radius
    Radius(f64),
    /// Caller-supplied predicate on (origin, destination)
    Within(fn(Cell, Cell) -> bool),
}

impl DistanceRule {
    pub fn allows(&self, origin: Cell, destination: Cell) -> bool {
        match self {
            DistanceRule::Radius(radius) => origin.euclidean_distance(&destination) <= *radius,
            DistanceRule::Within(predicate) => predicate(origin, destination),
        }
    }
}

impl Debug for DistanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceRule::Radius(radius) => write!(f, "Radius({radius})"),
            DistanceRule::Within(_) => f.write_str("Within(..)"),
        }
    }
}

/// One step in any direction
pub fn adjacent(origin: Cell, destination: Cell) -> bool {
    origin.chebyshev_distance(&destination) == 1
}

/// Direction of a single step; `None` for anything but a unit step
pub fn direction_between(origin: Cell, destination: Cell) -> Option<Direction> {
    origin.direction_to(&destination).ok()
}

/// Whether `origin -> destination` is a unit step in one of the pattern's directions
pub fn pattern_allows(pattern: DirectionSet, origin: Cell, destination: Cell) -> bool {
    direction_between(origin, destination).is_some_and(|d| pattern.contains(d))
}

/// What may already sit on the destination
pub enum DestinationRule<N, M>
where
    N: Eq + Hash,
    M: Eq + Hash,
{
    Any,
    MustBeEmpty,
    MustBeOccupied,
    /// Caller-supplied predicate on (graph, moving marker, destination)
    Custom(fn(&Graph<N, M>, M, N) -> bool),
}

impl<N, M> DestinationRule<N, M>
where
    N: Copy + Eq + Hash + Debug,
    M: Copy + Eq + Hash + Ord + Debug,
{
    pub fn allows(&self, graph: &Graph<N, M>, marker: M, destination: N) -> bool {
        match self {
            DestinationRule::Any => true,
            DestinationRule::MustBeEmpty => graph.is_empty(&destination),
            DestinationRule::MustBeOccupied => !graph.is_empty(&destination),
            DestinationRule::Custom(predicate) => predicate(graph, marker, destination),
        }
    }
}

impl<N: Eq + Hash, M: Eq + Hash> Clone for DestinationRule<N, M> {
    fn clone(&self) -> Self {
        match self {
            DestinationRule::Any => DestinationRule::Any,
            DestinationRule::MustBeEmpty => DestinationRule::MustBeEmpty,
            DestinationRule::MustBeOccupied => DestinationRule::MustBeOccupied,
            DestinationRule::Custom(predicate) => DestinationRule::Custom(*predicate),
        }
    }
}

impl<N: Eq + Hash, M: Eq + Hash> Debug for DestinationRule<N, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationRule::Any => f.write_str("Any"),
            DestinationRule::MustBeEmpty => f.write_str("MustBeEmpty"),
            DestinationRule::MustBeOccupied => f.write_str("MustBeOccupied"),
            DestinationRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Where markers already on the destination go when others arrive
#[derive(Clone, Copy)]
pub enum CaptureTarget<N, M> {
    /// Occupants stay and the arriving markers stack on top
    Stack,
    /// Every occupant goes to the same node
    Fixed(N),
    /// The node depends on the captured marker
    With(fn(M) -> N),
}

impl<N: Copy, M> CaptureTarget<N, M> {
    /// Where `captured` goes, or `None` if it stays put
    pub fn target_for(&self, captured: M) -> Option<N> {
        match self {
            CaptureTarget::Stack => None,
            CaptureTarget::Fixed(node) => Some(*node),
            CaptureTarget::With(target) => Some(target(captured)),
        }
    }
}

impl<N: Debug, M> Debug for CaptureTarget<N, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureTarget::Stack => f.write_str("Stack"),
            CaptureTarget::Fixed(node) => write!(f, "Fixed({node:?})"),
            CaptureTarget::With(_) => f.write_str("With(..)"),
        }
    }
}

/// Move `markers` to `destination`, first sending its occupants to the
/// capture target.
///
/// Returns each displaced marker with the node it was sent to. Nothing is
/// changed if any marker is unplaced or any node is unknown.
pub fn relocate_with_capture<N, M>(
    graph: &mut Graph<N, M>,
    markers: &[M],
    destination: N,
    capture: &CaptureTarget<N, M>,
) -> Result<Vec<(M, N)>, GraphError>
where
    N: Copy + Eq + Hash + Debug,
    M: Copy + Eq + Hash + Ord + Debug,
{
    if !graph.contains_node(&destination) {
        return Err(GraphError::UnknownNode(format!("{destination:?}")));
    }
    for marker in markers {
        if !graph.contains_marker(marker) {
            return Err(GraphError::UnknownMarker(format!("{marker:?}")));
        }
        if !graph.is_placed(marker) {
            return Err(GraphError::NotPlaced(format!("{marker:?}")));
        }
    }

    let mut displaced = Vec::new();
    for occupant in graph.markers_at(&destination) {
        if markers.contains(&occupant) {
            continue;
        }
        if let Some(target) = capture.target_for(occupant) {
            if !graph.contains_node(&target) {
                return Err(GraphError::UnknownNode(format!("{target:?}")));
            }
            displaced.push((occupant, target));
        }
    }

    for (occupant, target) in &displaced {
        graph.move_marker(*occupant, *target)?;
    }
    for marker in markers {
        graph.move_marker(*marker, destination)?;
    }
    Ok(displaced)
}

/// How a group of markers is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Exactly one marker, and it must be able to move
    Single,
    /// Every marker must be able to move
    All,
    /// The markers that can move go; the rest are dropped from the transition
    Any,
}

/// A validated transition, ready for [`TransitionRules::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<N, M> {
    pub markers: Vec<M>,
    pub destination: N,
}

/// The movement rules of one game, assembled from the building blocks above
pub struct TransitionRules<N, M>
where
    N: Eq + Hash,
    M: Eq + Hash,
{
    /// Directions each marker may step in
    pub pattern: fn(M) -> DirectionSet,
    pub distance: DistanceRule,
    pub destination: DestinationRule<N, M>,
    pub capture: CaptureTarget<N, M>,
}

impl<N, M> TransitionRules<N, M>
where
    N: Copy + Eq + Hash + Debug + GridNode,
    M: Copy + Eq + Hash + Ord + Debug,
{
    /// Whether `marker` may move from its current cell to `destination`.
    ///
    /// Markers off the grid and destinations off the grid never qualify.
    pub fn can_move(&self, graph: &Graph<N, M>, marker: M, destination: N) -> bool {
        let Some(origin) = graph.node_of(&marker).and_then(|n| n.cell()) else {
            return false;
        };
        let Some(target) = destination.cell() else {
            return false;
        };

        self.destination.allows(graph, marker, destination)
            && self.distance.allows(origin, target)
            && pattern_allows((self.pattern)(marker), origin, target)
    }

    /// Check a group of markers against `destination`
    pub fn validate(
        &self,
        graph: &Graph<N, M>,
        markers: &[M],
        destination: N,
        eligibility: Eligibility,
    ) -> Option<Transition<N, M>> {
        let eligible: Vec<M> = match eligibility {
            Eligibility::Single => {
                if markers.len() != 1 || !self.can_move(graph, markers[0], destination) {
                    return None;
                }
                markers.to_vec()
            }
            Eligibility::All => {
                if !markers.iter().all(|&m| self.can_move(graph, m, destination)) {
                    return None;
                }
                markers.to_vec()
            }
            Eligibility::Any => markers
                .iter()
                .copied()
                .filter(|&m| self.can_move(graph, m, destination))
                .collect(),
        };

        if eligible.is_empty() {
            None
        } else {
            Some(Transition {
                markers: eligible,
                destination,
            })
        }
    }

    /// Carry out a transition, returning displaced markers and where they went
    pub fn apply(
        &self,
        graph: &mut Graph<N, M>,
        transition: &Transition<N, M>,
    ) -> Result<Vec<(M, N)>, GraphError> {
        relocate_with_capture(
            graph,
            &transition.markers,
            transition.destination,
            &self.capture,
        )
    }
}

impl<N, M> Clone for TransitionRules<N, M>
where
    N: Copy + Eq + Hash,
    M: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern,
            distance: self.distance,
            destination: self.destination.clone(),
            capture: match self.capture {
                CaptureTarget::Stack => CaptureTarget::Stack,
                CaptureTarget::Fixed(node) => CaptureTarget::Fixed(node),
                CaptureTarget::With(target) => CaptureTarget::With(target),
            },
        }
    }
}

impl<N, M> Debug for TransitionRules<N, M>
where
    N: Eq + Hash + Debug,
    M: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRules")
            .field("distance", &self.distance)
            .field("destination", &self.destination)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid2D;
    use pretty_assertions::assert_eq;

    const HOME: Cell = Cell::new(-1, -1);

    /// Markers 1-3 belong to one side, 4-6 to the other
    fn same_side(a: u8, b: u8) -> bool {
        (a <= 3) == (b <= 3)
    }

    fn board() -> Graph<Cell, u8> {
        let grid = Grid2D::new(3, 3);
        Graph::new(grid.cells().chain([HOME]), 1..=6)
    }

    fn rook_pattern(_: u8) -> DirectionSet {
        DirectionSet::from(Direction::cardinals())
    }

    fn chess_rules() -> TransitionRules<Cell, u8> {
        TransitionRules {
            pattern: rook_pattern,
            distance: DistanceRule::Within(adjacent),
            destination: DestinationRule::Custom(|graph, marker, dest| {
                graph.markers_at(&dest).all(|other| !same_side(marker, other))
            }),
            capture: CaptureTarget::Fixed(HOME),
        }
    }

    #[test]
    fn test_distance_rules() {
        let origin = Cell::new(0, 0);
        assert!(DistanceRule::Radius(1.5).allows(origin, Cell::new(1, 1)));
        assert!(!DistanceRule::Radius(1.0).allows(origin, Cell::new(1, 1)));
        assert!(DistanceRule::Within(adjacent).allows(origin, Cell::new(0, 1)));
        assert!(!DistanceRule::Within(adjacent).allows(origin, origin));
    }

    #[test]
    fn test_pattern_requires_unit_step() {
        let pattern = DirectionSet::from(Direction::all_east());
        let origin = Cell::new(1, 1);
        assert!(pattern_allows(pattern, origin, Cell::new(2, 1)));
        assert!(pattern_allows(pattern, origin, Cell::new(2, 0)));
        assert!(!pattern_allows(pattern, origin, Cell::new(0, 1)));
        assert!(!pattern_allows(pattern, origin, Cell::new(3, 1)));
        assert!(!pattern_allows(pattern, origin, origin));
        assert_eq!(direction_between(origin, Cell::new(1, 0)), Some(Direction::N));
    }

    #[test]
    fn test_extreme_cells_are_never_adjacent() {
        let edge = Cell::new(i32::MIN, 0);
        let other = Cell::new(1, 0);
        assert!(!adjacent(edge, other));
        assert!(!DistanceRule::Radius(1.5).allows(edge, other));
        assert!(!pattern_allows(DirectionSet::from(Direction::adjacents()), edge, other));
        assert_eq!(direction_between(Cell::new(i32::MAX, 0), edge), None);
    }

    #[test]
    fn test_destination_rules() {
        let mut graph = board();
        graph.place(1, Cell::new(0, 0)).unwrap();
        let empty = Cell::new(1, 1);
        let full = Cell::new(0, 0);

        let must_be_empty: DestinationRule<Cell, u8> = DestinationRule::MustBeEmpty;
        assert!(must_be_empty.allows(&graph, 2, empty));
        assert!(!must_be_empty.allows(&graph, 2, full));

        let must_be_occupied: DestinationRule<Cell, u8> = DestinationRule::MustBeOccupied;
        assert!(must_be_occupied.allows(&graph, 2, full));
        assert!(!must_be_occupied.allows(&graph, 2, empty));
        assert!(DestinationRule::Any.allows(&graph, 2, full));
    }

    #[test]
    fn test_can_move_checks_everything() {
        let mut graph = board();
        graph.place(1, Cell::new(1, 1)).unwrap();
        graph.place(2, Cell::new(1, 0)).unwrap();
        graph.place(4, Cell::new(2, 1)).unwrap();
        let rules = chess_rules();

        // ally above, enemy to the east, empty below, diagonal not in pattern
        assert!(!rules.can_move(&graph, 1, Cell::new(1, 0)));
        assert!(rules.can_move(&graph, 1, Cell::new(2, 1)));
        assert!(rules.can_move(&graph, 1, Cell::new(1, 2)));
        assert!(!rules.can_move(&graph, 1, Cell::new(2, 2)));
        assert!(!rules.can_move(&graph, 1, HOME));
        // unplaced marker
        assert!(!rules.can_move(&graph, 3, Cell::new(0, 0)));
    }

    #[test]
    fn test_capture_sends_occupant_to_target() {
        let mut graph = board();
        graph.place(1, Cell::new(1, 1)).unwrap();
        graph.place(4, Cell::new(2, 1)).unwrap();
        let rules = chess_rules();

        let transition = rules
            .validate(&graph, &[1], Cell::new(2, 1), Eligibility::Single)
            .unwrap();
        let displaced = rules.apply(&mut graph, &transition).unwrap();

        assert_eq!(displaced, vec![(4, HOME)]);
        assert_eq!(graph.node_of(&1), Some(Cell::new(2, 1)));
        assert_eq!(graph.node_of(&4), Some(HOME));
        assert!(graph.is_empty(&Cell::new(1, 1)));
    }

    #[test]
    fn test_capture_target_by_marker() {
        let mut graph = board();
        graph.place(1, Cell::new(0, 0)).unwrap();
        graph.place(4, Cell::new(0, 1)).unwrap();

        let capture: CaptureTarget<Cell, u8> = CaptureTarget::With(|m| Cell::new(m as i32 - 4, 2));
        let displaced = relocate_with_capture(&mut graph, &[1], Cell::new(0, 1), &capture).unwrap();
        assert_eq!(displaced, vec![(4, Cell::new(0, 2))]);
    }

    #[test]
    fn test_stacking_keeps_occupants() {
        let mut graph = board();
        graph.place(1, Cell::new(0, 0)).unwrap();
        graph.place(2, Cell::new(0, 0)).unwrap();
        graph.place(3, Cell::new(1, 0)).unwrap();

        let displaced =
            relocate_with_capture(&mut graph, &[1, 2], Cell::new(1, 0), &CaptureTarget::Stack)
                .unwrap();
        assert!(displaced.is_empty());
        assert_eq!(graph.occupant_count(&Cell::new(1, 0)), 3);
        assert!(graph.is_empty(&Cell::new(0, 0)));
    }

    #[test]
    fn test_relocate_unplaced_changes_nothing() {
        let mut graph = board();
        graph.place(1, Cell::new(0, 0)).unwrap();
        graph.place(4, Cell::new(1, 0)).unwrap();

        let result = relocate_with_capture(
            &mut graph,
            &[1, 2],
            Cell::new(1, 0),
            &CaptureTarget::Fixed(HOME),
        );
        assert!(matches!(result, Err(GraphError::NotPlaced(_))));
        assert_eq!(graph.node_of(&4), Some(Cell::new(1, 0)));
        assert_eq!(graph.node_of(&1), Some(Cell::new(0, 0)));
    }

    #[test]
    fn test_eligibility_modes() {
        let mut graph = board();
        graph.place(1, Cell::new(1, 1)).unwrap();
        graph.place(2, Cell::new(0, 1)).unwrap();
        let rules = chess_rules();
        let dest = Cell::new(1, 0);

        assert!(rules.validate(&graph, &[1, 2], dest, Eligibility::Single).is_none());
        assert!(rules.validate(&graph, &[1, 2], dest, Eligibility::All).is_none());
        assert_eq!(
            rules.validate(&graph, &[1, 2], dest, Eligibility::Any),
            Some(Transition {
                markers: vec![1],
                destination: dest
            })
        );
        assert!(rules.validate(&graph, &[2], Cell::new(2, 2), Eligibility::Any).is_none());
    }
}
