//! Read-only aggregate counts over a built graph

use super::store::GraphStore;
use super::types::NodeKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts grouped by key attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_entities: usize,
    pub total_officers: usize,
    pub total_addresses: usize,
    pub entities_by_jurisdiction: BTreeMap<String, usize>,
    pub entities_by_type: BTreeMap<String, usize>,
    pub entities_by_source: BTreeMap<String, usize>,
    pub officers_by_country: BTreeMap<String, usize>,
    /// Relationship types of edges touching an officer
    pub officers_by_role: BTreeMap<String, usize>,
}

impl GraphStatistics {
    pub fn compute(store: &GraphStore) -> Self {
        let mut stats = GraphStatistics {
            total_nodes: store.node_count(),
            total_edges: store.edge_count(),
            total_entities: store.count_of_kind(NodeKind::Entity),
            total_officers: store.count_of_kind(NodeKind::Officer),
            total_addresses: store.count_of_kind(NodeKind::Address),
            ..Default::default()
        };

        for entity in store.nodes_of_kind(NodeKind::Entity).iter().filter_map(|n| n.as_entity()) {
            bump(&mut stats.entities_by_jurisdiction, &entity.jurisdiction);
            bump(&mut stats.entities_by_type, &entity.company_type);
            bump(&mut stats.entities_by_source, &entity.source);
        }

        for node in store.nodes_of_kind(NodeKind::Officer) {
            bump(&mut stats.officers_by_country, node.countries());
            for edge in store.incident_edges(node.id) {
                bump(&mut stats.officers_by_role, edge.edge_type.as_str());
            }
        }

        stats
    }

    /// Top `n` entries of a count map, by count descending then key ascending
    pub fn top(counts: &BTreeMap<String, usize>, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        // BTreeMap iteration is already key-ascending; the sort is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

fn bump(map: &mut BTreeMap<String, usize>, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}
