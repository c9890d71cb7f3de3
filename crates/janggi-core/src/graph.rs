//! Node/marker registry shared by grid games.
//!
//! A `Graph` keeps two views of the same placement: which markers sit on a
//! node, and which node holds a marker. The node and marker universes are fixed
//! at construction. Markers start unplaced; every later change goes through
//! [`Graph::place`], [`Graph::move_marker`], [`Graph::relabel`] or
//! [`Graph::load`], each of which updates both views together.
//!
//! Named snapshots record the marker -> node view and restore it later. The
//! `"empty"` snapshot is taken at construction.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;
use tracing::trace;

/// Name of the snapshot taken when the graph is built
pub const EMPTY_SNAPSHOT: &str = "empty";

/// Registry misuse. These signal a caller bug, never a gameplay outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Unknown marker {0}")]
    UnknownMarker(String),

    #[error("Unknown node {0}")]
    UnknownNode(String),

    #[error("Marker {0} is already placed")]
    AlreadyPlaced(String),

    #[error("Marker {0} is not placed")]
    NotPlaced(String),

    #[error("No snapshot named {0:?}")]
    UnknownSnapshot(String),
}

/// A saved marker -> node mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<N, M>
where
    N: Eq + Hash,
    M: Eq + Hash,
{
    placements: HashMap<M, Option<N>>,
}

impl<N, M> Snapshot<N, M>
where
    N: Copy + Eq + Hash,
    M: Copy + Eq + Hash,
{
    /// Where the marker was when the snapshot was taken
    pub fn node_of(&self, marker: &M) -> Option<N> {
        self.placements.get(marker).copied().flatten()
    }
}

/// Bidirectional node <-> marker registry
#[derive(Debug, Clone)]
pub struct Graph<N, M>
where
    N: Eq + Hash,
    M: Eq + Hash,
{
    /// Markers at each node
    nodes: HashMap<N, BTreeSet<M>>,
    /// Node of each marker (`None` while unplaced)
    markers: HashMap<M, Option<N>>,
    node_order: Vec<N>,
    marker_order: Vec<M>,
    saved: HashMap<String, Snapshot<N, M>>,
}

impl<N, M> Graph<N, M>
where
    N: Copy + Eq + Hash + Debug,
    M: Copy + Eq + Hash + Ord + Debug,
{
    /// Build a registry over fixed node and marker universes.
    ///
    /// Duplicates are ignored; the first occurrence fixes the iteration order.
    pub fn new(
        all_nodes: impl IntoIterator<Item = N>,
        all_markers: impl IntoIterator<Item = M>,
    ) -> Self {
        let mut nodes = HashMap::new();
        let mut node_order = Vec::new();
        for node in all_nodes {
            if nodes.insert(node, BTreeSet::new()).is_none() {
                node_order.push(node);
            }
        }

        let mut markers = HashMap::new();
        let mut marker_order = Vec::new();
        for marker in all_markers {
            if markers.insert(marker, None).is_none() {
                marker_order.push(marker);
            }
        }

        let mut graph = Self {
            nodes,
            markers,
            node_order,
            marker_order,
            saved: HashMap::new(),
        };
        graph.save(EMPTY_SNAPSHOT);
        graph
    }

    pub fn all_nodes(&self) -> &[N] {
        &self.node_order
    }

    pub fn all_markers(&self) -> &[M] {
        &self.marker_order
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn contains_marker(&self, marker: &M) -> bool {
        self.markers.contains_key(marker)
    }

    /// Markers currently on `node`, in marker order. Unknown nodes hold nothing.
    pub fn markers_at(&self, node: &N) -> impl Iterator<Item = M> + '_ {
        self.nodes.get(node).into_iter().flatten().copied()
    }

    pub fn occupant_count(&self, node: &N) -> usize {
        self.nodes.get(node).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self, node: &N) -> bool {
        self.occupant_count(node) == 0
    }

    /// Node holding `marker`, or `None` if it is unplaced or unknown
    pub fn node_of(&self, marker: &M) -> Option<N> {
        self.markers.get(marker).copied().flatten()
    }

    pub fn is_placed(&self, marker: &M) -> bool {
        self.node_of(marker).is_some()
    }

    /// All placed markers with their nodes, in marker order
    pub fn placements(&self) -> impl Iterator<Item = (M, N)> + '_ {
        self.marker_order
            .iter()
            .filter_map(|m| self.node_of(m).map(|n| (*m, n)))
    }

    /// Put an unplaced marker on a node
    pub fn place(&mut self, marker: M, node: N) -> Result<(), GraphError> {
        self.check_node(&node)?;
        if self.location(&marker)?.is_some() {
            return Err(GraphError::AlreadyPlaced(format!("{marker:?}")));
        }

        self.markers.insert(marker, Some(node));
        self.occupants_mut(node).insert(marker);
        Ok(())
    }

    /// Move a placed marker to another node
    pub fn move_marker(&mut self, marker: M, node: N) -> Result<(), GraphError> {
        self.check_node(&node)?;
        let from = self
            .location(&marker)?
            .ok_or_else(|| GraphError::NotPlaced(format!("{marker:?}")))?;

        self.occupants_mut(from).remove(&marker);
        self.occupants_mut(node).insert(marker);
        self.markers.insert(marker, Some(node));
        Ok(())
    }

    /// Hand the node of `from` over to the unplaced marker `to`.
    ///
    /// Afterwards `to` sits where `from` was and `from` is unplaced. Used when a
    /// piece changes identity without moving.
    pub fn relabel(&mut self, from: M, to: M) -> Result<(), GraphError> {
        let node = self
            .location(&from)?
            .ok_or_else(|| GraphError::NotPlaced(format!("{from:?}")))?;
        if self.location(&to)?.is_some() {
            return Err(GraphError::AlreadyPlaced(format!("{to:?}")));
        }

        let occupants = self.occupants_mut(node);
        occupants.remove(&from);
        occupants.insert(to);
        self.markers.insert(from, None);
        self.markers.insert(to, Some(node));
        Ok(())
    }

    /// Record the current placement under `name`, replacing any earlier one
    pub fn save(&mut self, name: &str) {
        trace!(snapshot = name, "saving snapshot");
        self.saved.insert(
            name.to_string(),
            Snapshot {
                placements: self.markers.clone(),
            },
        );
    }

    /// Restore the placement recorded under `name`
    pub fn load(&mut self, name: &str) -> Result<(), GraphError> {
        let snapshot = self
            .saved
            .get(name)
            .ok_or_else(|| GraphError::UnknownSnapshot(name.to_string()))?;

        trace!(snapshot = name, "loading snapshot");
        self.markers = snapshot.placements.clone();
        self.nodes = self.infer_nodes();
        Ok(())
    }

    pub fn has_snapshot(&self, name: &str) -> bool {
        self.saved.contains_key(name)
    }

    pub fn snapshot(&self, name: &str) -> Option<&Snapshot<N, M>> {
        self.saved.get(name)
    }

    /// Rebuild the node view from the marker view
    fn infer_nodes(&self) -> HashMap<N, BTreeSet<M>> {
        let mut nodes: HashMap<N, BTreeSet<M>> = self
            .node_order
            .iter()
            .map(|n| (*n, BTreeSet::new()))
            .collect();
        for (marker, node) in &self.markers {
            if let Some(node) = node {
                nodes.entry(*node).or_default().insert(*marker);
            }
        }
        nodes
    }

    fn location(&self, marker: &M) -> Result<Option<N>, GraphError> {
        self.markers
            .get(marker)
            .copied()
            .ok_or_else(|| GraphError::UnknownMarker(format!("{marker:?}")))
    }

    fn check_node(&self, node: &N) -> Result<(), GraphError> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(format!("{node:?}")))
        }
    }

    fn occupants_mut(&mut self, node: N) -> &mut BTreeSet<M> {
        self.nodes.entry(node).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn small_graph() -> Graph<&'static str, u8> {
        Graph::new(["a", "b", "c", "home"], [1, 2, 3])
    }

    /// Both views must describe the same placement
    fn assert_consistent(graph: &Graph<&'static str, u8>) {
        for node in graph.all_nodes() {
            for marker in graph.markers_at(node) {
                assert_eq!(graph.node_of(&marker), Some(*node));
            }
        }
        for (marker, node) in graph.placements() {
            assert!(graph.markers_at(&node).any(|m| m == marker));
        }
    }

    #[test]
    fn test_markers_start_unplaced() {
        let graph = small_graph();
        assert_eq!(graph.all_nodes().len(), 4);
        assert_eq!(graph.all_markers(), &[1, 2, 3]);
        assert_eq!(graph.placements().count(), 0);
        assert!(graph.has_snapshot(EMPTY_SNAPSHOT));
    }

    #[test]
    fn test_place_and_move() {
        let mut graph = small_graph();
        graph.place(1, "a").unwrap();
        graph.place(2, "home").unwrap();
        graph.place(3, "home").unwrap();
        assert_eq!(graph.node_of(&1), Some("a"));
        assert_eq!(graph.occupant_count(&"home"), 2);

        graph.move_marker(1, "b").unwrap();
        assert!(graph.is_empty(&"a"));
        assert_eq!(graph.markers_at(&"b").collect::<Vec<_>>(), vec![1]);
        assert_consistent(&graph);
    }

    #[test]
    fn test_place_twice_fails() {
        let mut graph = small_graph();
        graph.place(1, "a").unwrap();
        assert_eq!(
            graph.place(1, "b"),
            Err(GraphError::AlreadyPlaced("1".to_string()))
        );
        assert_eq!(graph.node_of(&1), Some("a"));
    }

    #[test]
    fn test_move_unplaced_fails() {
        let mut graph = small_graph();
        assert_eq!(
            graph.move_marker(2, "a"),
            Err(GraphError::NotPlaced("2".to_string()))
        );
        assert!(graph.is_empty(&"a"));
    }

    #[test]
    fn test_unknown_marker_and_node() {
        let mut graph = small_graph();
        assert!(matches!(graph.place(9, "a"), Err(GraphError::UnknownMarker(_))));
        assert!(matches!(graph.place(1, "z"), Err(GraphError::UnknownNode(_))));
        assert_eq!(graph.placements().count(), 0);
    }

    #[test]
    fn test_relabel_keeps_node() {
        let mut graph = small_graph();
        graph.place(1, "c").unwrap();
        graph.relabel(1, 2).unwrap();
        assert_eq!(graph.node_of(&1), None);
        assert_eq!(graph.node_of(&2), Some("c"));
        assert_eq!(graph.markers_at(&"c").collect::<Vec<_>>(), vec![2]);
        assert_consistent(&graph);
    }

    #[test]
    fn test_relabel_onto_live_marker_fails() {
        let mut graph = small_graph();
        graph.place(1, "a").unwrap();
        graph.place(2, "b").unwrap();
        assert_eq!(
            graph.relabel(1, 2),
            Err(GraphError::AlreadyPlaced("2".to_string()))
        );
        assert_eq!(graph.node_of(&1), Some("a"));
        assert_eq!(graph.node_of(&2), Some("b"));
    }

    #[test]
    fn test_save_mutate_load_restores_mapping() {
        let mut graph = small_graph();
        graph.place(1, "a").unwrap();
        graph.place(2, "b").unwrap();
        graph.save("x");
        let before: Vec<_> = graph.placements().collect();

        graph.move_marker(1, "home").unwrap();
        graph.move_marker(2, "home").unwrap();
        graph.place(3, "c").unwrap();

        graph.load("x").unwrap();
        let after: Vec<_> = graph.placements().collect();
        assert_eq!(before, after);
        assert!(graph.is_empty(&"home"));
        assert!(graph.is_empty(&"c"));
        assert_consistent(&graph);
    }

    #[test]
    fn test_save_overwrites() {
        let mut graph = small_graph();
        graph.save("x");
        graph.place(1, "a").unwrap();
        graph.save("x");
        graph.load(EMPTY_SNAPSHOT).unwrap();
        assert_eq!(graph.placements().count(), 0);
        graph.load("x").unwrap();
        assert_eq!(graph.node_of(&1), Some("a"));
        assert_eq!(graph.snapshot("x").and_then(|s| s.node_of(&1)), Some("a"));
    }

    #[test]
    fn test_load_unknown_snapshot_fails() {
        let mut graph = small_graph();
        graph.place(1, "a").unwrap();
        assert_eq!(
            graph.load("nope"),
            Err(GraphError::UnknownSnapshot("nope".to_string()))
        );
        assert_eq!(graph.node_of(&1), Some("a"));
    }
}
