//! Edge implementation for the leak graph
//!
//! Edges are directed and not unique: several relationships may connect the
//! same pair of nodes.

use super::types::{EdgeId, EdgeType, NodeId};
use crate::loader::RelationshipRecord;
use serde::{Deserialize, Serialize};

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A directed, attributed relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Relationship type (e.g., "officer_of", "shareholder_of")
    pub edge_type: EdgeType,

    /// Free-text link annotation (e.g., "beneficiary of")
    pub link: Option<String>,

    pub status: Option<String>,

    /// Validity window
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    /// Leak the relationship was disclosed in
    pub leak_source: String,
}

impl Edge {
    /// Create a bare edge with only a relationship type
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, edge_type: impl Into<EdgeType>) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            link: None,
            status: None,
            start_date: None,
            end_date: None,
            leak_source: String::new(),
        }
    }

    /// Create an edge carrying the attributes of a relationship record
    pub fn from_relationship(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        relationship: &RelationshipRecord,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: EdgeType::new(relationship.rel_type.as_str()),
            link: non_blank(&relationship.link),
            status: non_blank(&relationship.status),
            start_date: non_blank(&relationship.start_date),
            end_date: non_blank(&relationship.end_date),
            leak_source: relationship.source.clone(),
        }
    }

    /// Relationship label, or `None` when the type is blank
    pub fn relationship_label(&self) -> Option<&str> {
        if self.edge_type.is_blank() {
            None
        } else {
            Some(self.edge_type.as_str())
        }
    }

    /// Check if this edge connects two specific nodes (in either direction)
    pub fn connects(&self, node1: NodeId, node2: NodeId) -> bool {
        (self.source == node1 && self.target == node2)
            || (self.source == node2 && self.target == node1)
    }

    /// Check if this edge goes FROM a specific node
    pub fn starts_from(&self, node: NodeId) -> bool {
        self.source == node
    }

    /// Check if this edge goes TO a specific node
    pub fn ends_at(&self, node: NodeId) -> bool {
        self.target == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint at all
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
