//! In-memory graph storage
//!
//! Arena layout: nodes and edges live in dense vectors indexed by their ids,
//! with per-node outgoing/incoming adjacency lists and secondary indices by
//! native key, node kind and edge type.

use super::edge::Edge;
use super::node::{Node, NodeRecord};
use super::types::{EdgeId, EdgeType, NodeId, NodeKind};
use crate::loader::RelationshipRecord;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node key {0:?} already exists")]
    DuplicateKey(String),

    #[error("Unknown node key {0:?}")]
    UnknownKey(String),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A direct neighbor of a node together with the first edge that connects them
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub node: &'a Node,
    pub edge: &'a Edge,
}

/// In-memory directed multigraph
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Node storage (NodeId -> Node)
    nodes: Vec<Node>,

    /// Edge storage (EdgeId -> Edge)
    edges: Vec<Edge>,

    /// Outgoing edges for each node (adjacency list)
    outgoing: Vec<Vec<EdgeId>>,

    /// Incoming edges for each node (adjacency list)
    incoming: Vec<Vec<EdgeId>>,

    /// Native dataset key -> NodeId
    key_index: FxHashMap<String, NodeId>,

    /// Node kind index, in insertion order
    kind_index: HashMap<NodeKind, Vec<NodeId>>,

    /// Edge type index, in insertion order
    edge_type_index: HashMap<EdgeType, Vec<EdgeId>>,

    /// Build generation, shared with indices synthesized from this graph
    generation: u64,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph store stamped with a build generation
    pub fn with_generation(generation: u64) -> Self {
        GraphStore {
            generation,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Add a node. Native keys are unique across all node kinds.
    pub fn add_node(&mut self, record: impl Into<NodeRecord>) -> GraphResult<NodeId> {
        let record = record.into();
        if self.key_index.contains_key(record.key()) {
            return Err(GraphError::DuplicateKey(record.key().to_string()));
        }

        let node_id = NodeId::new(self.nodes.len() as u64);
        let kind = record.kind();
        self.key_index.insert(record.key().to_string(), node_id);
        self.kind_index.entry(kind).or_default().push(node_id);

        self.nodes.push(Node::new(node_id, record));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(node_id)
    }

    /// Create an edge between two existing nodes
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        relationship: &RelationshipRecord,
    ) -> GraphResult<EdgeId> {
        if !self.has_node(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_id = EdgeId::new(self.edges.len() as u64);
        let edge = Edge::from_relationship(edge_id, source, target, relationship);

        self.outgoing[source.index()].push(edge_id);
        self.incoming[target.index()].push(edge_id);
        self.edge_type_index
            .entry(edge.edge_type.clone())
            .or_default()
            .push(edge_id);

        self.edges.push(edge);
        Ok(edge_id)
    }

    /// Create an edge from a relationship record, resolving its native endpoint keys
    pub fn add_relationship(&mut self, relationship: &RelationshipRecord) -> GraphResult<EdgeId> {
        let source = self
            .node_id(&relationship.start_node)
            .ok_or_else(|| GraphError::UnknownKey(relationship.start_node.clone()))?;
        let target = self
            .node_id(&relationship.end_node)
            .ok_or_else(|| GraphError::UnknownKey(relationship.end_node.clone()))?;
        self.add_edge(source, target, relationship)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Resolve a native dataset key
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    pub fn get_node_by_key(&self, key: &str) -> Option<&Node> {
        self.node_id(key).and_then(|id| self.get_node(id))
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.outgoing
            .get(node_id.index())
            .map(|edge_ids| edge_ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Get all incoming edges to a node
    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.incoming
            .get(node_id.index())
            .map(|edge_ids| edge_ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Outgoing edges followed by incoming edges, each in insertion order
    pub fn incident_edges(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        let outgoing = self.outgoing.get(node_id.index()).into_iter().flatten();
        let incoming = self.incoming.get(node_id.index()).into_iter().flatten();
        outgoing
            .chain(incoming)
            .filter_map(move |&id| self.get_edge(id))
    }

    /// All parallel edges between two nodes, in either direction
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Vec<&Edge> {
        self.get_outgoing_edges(a)
            .into_iter()
            .filter(|e| e.target == b)
            .chain(self.get_incoming_edges(a).into_iter().filter(|e| e.source == b && a != b))
            .collect()
    }

    /// Distinct direct neighbors in either direction, each paired with the
    /// first connecting edge (outgoing before incoming, then insertion order).
    ///
    /// Ordered by neighbor display name, then native key. Self-loops are not
    /// neighbors.
    pub fn neighbors(&self, node_id: NodeId) -> Vec<Neighbor<'_>> {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut neighbors = Vec::new();

        for edge in self.incident_edges(node_id) {
            let Some(other) = edge.other_end(node_id) else {
                continue;
            };
            if other == node_id || !seen.insert(other) {
                continue;
            }
            if let Some(node) = self.get_node(other) {
                neighbors.push(Neighbor { node, edge });
            }
        }

        neighbors.sort_by(|a, b| {
            a.node
                .display_name()
                .cmp(b.node.display_name())
                .then_with(|| a.node.key().cmp(b.node.key()))
        });
        neighbors
    }

    /// Number of distinct direct neighbors
    pub fn degree(&self, node_id: NodeId) -> usize {
        self.incident_edges(node_id)
            .filter_map(|edge| edge.other_end(node_id))
            .filter(|&other| other != node_id)
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Nodes of one kind, in insertion order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.kind_index
            .get(&kind)
            .map(|ids| ids.iter().filter_map(|&id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    pub fn count_of_kind(&self, kind: NodeKind) -> usize {
        self.kind_index.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Get all edges of a specific type
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        self.edge_type_index
            .get(edge_type)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All edges in insertion order
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::fixtures;

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(fixtures::entity("e1", "ALPHA LTD", "Samoa", "Panama Papers")).unwrap();
        store.add_node(fixtures::officer("o1", "ZED", "Malta", "Panama Papers")).unwrap();
        store.add_node(fixtures::officer("o2", "ADA", "Cyprus", "Panama Papers")).unwrap();
        store.add_node(fixtures::address("a1", "1 MAIN ST", "Samoa", "Panama Papers")).unwrap();
        store
    }

    #[test]
    fn test_add_and_get_node() {
        let store = sample_store();
        assert_eq!(store.node_count(), 4);

        let node = store.get_node_by_key("o1").unwrap();
        assert_eq!(node.kind(), NodeKind::Officer);
        assert_eq!(node.display_name(), "ZED");
        assert!(store.has_key("a1"));
        assert!(!store.has_key("zzz"));
    }

    #[test]
    fn test_duplicate_key_rejected_across_kinds() {
        let mut store = sample_store();
        let result = store.add_node(fixtures::address("e1", "ELSEWHERE", "X", "Y"));
        assert_eq!(result, Err(GraphError::DuplicateKey("e1".to_string())));
        assert_eq!(store.node_count(), 4);
        assert_eq!(store.get_node_by_key("e1").unwrap().kind(), NodeKind::Entity);
    }

    #[test]
    fn test_relationship_with_unknown_endpoint() {
        let mut store = sample_store();
        let result = store.add_relationship(&fixtures::relationship("o1", "missing", "officer_of"));
        assert_eq!(result, Err(GraphError::UnknownKey("missing".to_string())));
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_edge_validation() {
        let mut store = sample_store();
        let rel = fixtures::relationship("x", "y", "officer_of");
        let valid = NodeId::new(0);
        let invalid = NodeId::new(999);

        assert_eq!(
            store.add_edge(invalid, valid, &rel),
            Err(GraphError::InvalidEdgeSource(invalid))
        );
        assert_eq!(
            store.add_edge(valid, invalid, &rel),
            Err(GraphError::InvalidEdgeTarget(invalid))
        );
    }

    #[test]
    fn test_adjacency_lists() {
        let mut store = sample_store();
        store.add_relationship(&fixtures::relationship("o1", "e1", "officer_of")).unwrap();
        store.add_relationship(&fixtures::relationship("o2", "e1", "shareholder_of")).unwrap();
        store.add_relationship(&fixtures::relationship("e1", "a1", "registered_address")).unwrap();

        let e1 = store.node_id("e1").unwrap();
        assert_eq!(store.get_outgoing_edges(e1).len(), 1);
        assert_eq!(store.get_incoming_edges(e1).len(), 2);
        assert_eq!(store.incident_edges(e1).count(), 3);
    }

    #[test]
    fn test_multiple_edges_between_nodes() {
        let mut store = sample_store();
        store.add_relationship(&fixtures::relationship("o1", "e1", "officer_of")).unwrap();
        store.add_relationship(&fixtures::relationship("o1", "e1", "shareholder_of")).unwrap();
        store.add_relationship(&fixtures::relationship("e1", "o1", "nominee_of")).unwrap();

        let e1 = store.node_id("e1").unwrap();
        let o1 = store.node_id("o1").unwrap();
        assert_eq!(store.edge_count(), 3);
        assert_eq!(store.edges_between(e1, o1).len(), 3);
        assert_eq!(store.edges_between(o1, e1).len(), 3);

        // Parallel edges collapse to one neighbor
        assert_eq!(store.degree(e1), 1);
        let neighbors = store.neighbors(e1);
        assert_eq!(neighbors.len(), 1);
        // First connecting edge: outgoing from e1 comes before incoming
        assert_eq!(neighbors[0].edge.edge_type.as_str(), "nominee_of");
    }

    #[test]
    fn test_neighbors_sorted_by_name() {
        let mut store = sample_store();
        store.add_relationship(&fixtures::relationship("o1", "e1", "officer_of")).unwrap();
        store.add_relationship(&fixtures::relationship("e1", "a1", "registered_address")).unwrap();
        store.add_relationship(&fixtures::relationship("o2", "e1", "officer_of")).unwrap();

        let e1 = store.node_id("e1").unwrap();
        let names: Vec<&str> = store
            .neighbors(e1)
            .iter()
            .map(|n| n.node.display_name())
            .collect();
        assert_eq!(names, vec!["1 MAIN ST", "ADA", "ZED"]);
        assert_eq!(store.degree(e1), 3);
    }

    #[test]
    fn test_self_loop_is_not_a_neighbor() {
        let mut store = sample_store();
        store.add_relationship(&fixtures::relationship("e1", "e1", "same_as")).unwrap();
        let e1 = store.node_id("e1").unwrap();
        assert_eq!(store.degree(e1), 0);
        assert!(store.neighbors(e1).is_empty());
        assert_eq!(store.edges_between(e1, e1).len(), 1);
    }

    #[test]
    fn test_kind_and_type_indices() {
        let mut store = sample_store();
        store.add_relationship(&fixtures::relationship("o1", "e1", "officer_of")).unwrap();
        store.add_relationship(&fixtures::relationship("o2", "e1", "officer_of")).unwrap();

        let officers: Vec<&str> = store
            .nodes_of_kind(NodeKind::Officer)
            .iter()
            .map(|n| n.key())
            .collect();
        assert_eq!(officers, vec!["o1", "o2"]);
        assert_eq!(store.count_of_kind(NodeKind::Address), 1);
        assert_eq!(store.get_edges_by_type(&EdgeType::new("officer_of")).len(), 2);
    }

    #[test]
    fn test_generation() {
        let mut store = GraphStore::with_generation(3);
        assert_eq!(store.generation(), 3);
        store.set_generation(4);
        assert_eq!(store.generation(), 4);
        assert!(store.is_empty());
    }
}
