//! Typed property graph over the leak dataset
//!
//! This module implements the graph data model with:
//! - Nodes as a tagged variant per kind (entity, officer, address)
//! - Directed, attributed edges, with multiple edges allowed between the same nodes
//! - In-memory arena storage with hash-based key, kind and type indices
//! - A builder that drops relationships with unresolved endpoints

pub mod builder;
pub mod edge;
pub mod node;
pub mod stats;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::{BuildReport, GraphBuilder};
pub use edge::Edge;
pub use node::{Node, NodeRecord};
pub use stats::GraphStatistics;
pub use store::{GraphError, GraphResult, GraphStore, Neighbor};
pub use types::{EdgeId, EdgeType, NodeId, NodeKind};
