//! Graph construction from a loaded dataset

use super::node::NodeRecord;
use super::store::{GraphError, GraphStore};
use crate::loader::Dataset;
use serde::Serialize;
use tracing::{debug, info};

/// Counts produced by one graph build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub nodes: usize,
    pub edges: usize,
    /// Relationship records offered to the builder
    pub relationships: usize,
    /// Relationships dropped because an endpoint was not loaded
    pub dropped_relationships: usize,
    /// Node records skipped because their key was already taken
    pub duplicate_nodes: usize,
}

/// Builds a [`GraphStore`] from the four loaded collections.
///
/// Nodes are added entities first, then officers, then addresses. A
/// relationship becomes an edge only when both endpoint keys resolve.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    generation: u64,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the built graph with a generation
    pub fn with_generation(generation: u64) -> Self {
        Self { generation }
    }

    pub fn build(&self, dataset: &Dataset) -> (GraphStore, BuildReport) {
        let mut store = GraphStore::with_generation(self.generation);
        let mut report = BuildReport {
            relationships: dataset.relationships.len(),
            ..Default::default()
        };

        let records = dataset
            .entities
            .iter()
            .cloned()
            .map(NodeRecord::from)
            .chain(dataset.officers.iter().cloned().map(NodeRecord::from))
            .chain(dataset.addresses.iter().cloned().map(NodeRecord::from));

        for record in records {
            match store.add_node(record) {
                Ok(_) => {}
                Err(GraphError::DuplicateKey(key)) => {
                    debug!("Skipping duplicate node key {}", key);
                    report.duplicate_nodes += 1;
                }
                Err(e) => debug!("Skipping node: {}", e),
            }
        }

        for relationship in &dataset.relationships {
            if store.add_relationship(relationship).is_err() {
                report.dropped_relationships += 1;
            }
        }

        report.nodes = store.node_count();
        report.edges = store.edge_count();

        info!(
            nodes = report.nodes,
            edges = report.edges,
            dropped = report.dropped_relationships,
            duplicates = report.duplicate_nodes,
            generation = self.generation,
            "Graph built"
        );

        (store, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::fixtures;
    use crate::graph::NodeKind;

    fn dataset() -> Dataset {
        Dataset {
            entities: vec![
                fixtures::entity("e1", "ALPHA LTD", "Samoa", "Panama Papers"),
                fixtures::entity("e2", "BETA INC", "BVI", "Panama Papers"),
            ],
            officers: vec![fixtures::officer("o1", "JOHN SMITH", "UK", "Panama Papers")],
            addresses: vec![fixtures::address("a1", "1 MAIN ST", "Samoa", "Panama Papers")],
            relationships: vec![
                fixtures::relationship("o1", "e1", "officer_of"),
                fixtures::relationship("e1", "a1", "registered_address"),
                fixtures::relationship("o1", "missing", "officer_of"),
                fixtures::relationship("ghost", "e2", "shareholder_of"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_dangling_relationships_dropped() {
        let (store, report) = GraphBuilder::new().build(&dataset());

        assert_eq!(report.nodes, 4);
        assert_eq!(report.edges, 2);
        assert_eq!(report.relationships, 4);
        assert_eq!(report.dropped_relationships, 2);
        assert_eq!(store.edge_count(), 2);
        assert!(store.edge_count() <= report.relationships);
    }

    #[test]
    fn test_duplicate_keys_first_wins() {
        let mut data = dataset();
        data.officers.push(fixtures::officer("e1", "IMPOSTOR", "X", "Y"));

        let (store, report) = GraphBuilder::new().build(&data);
        assert_eq!(report.duplicate_nodes, 1);
        assert_eq!(store.node_count(), 4);
        assert_eq!(store.get_node_by_key("e1").unwrap().kind(), NodeKind::Entity);
    }

    #[test]
    fn test_generation_stamp() {
        let (store, _) = GraphBuilder::with_generation(9).build(&dataset());
        assert_eq!(store.generation(), 9);
    }

    #[test]
    fn test_empty_dataset() {
        let (store, report) = GraphBuilder::new().build(&Dataset::default());
        assert!(store.is_empty());
        assert_eq!(report, BuildReport::default());
    }
}
