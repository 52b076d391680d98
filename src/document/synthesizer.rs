//! Projects graph nodes into retrievable documents
//!
//! One document per entity, then one per officer, then one investigation
//! summary per distinct entity source. A global document budget is spent in
//! that order, so entities win over officers and officers over summaries.

use super::{Document, DocumentType};
use crate::graph::{GraphStore, Neighbor, Node, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Caps applied while synthesizing documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Entity and officer documents plus investigation summaries
    pub max_documents: usize,
    pub max_investigations: usize,
    /// Officers listed on an entity document
    pub officer_cap: usize,
    /// Addresses listed on an entity document
    pub address_cap: usize,
    /// Other entities listed on an entity document
    pub entity_cap: usize,
    /// Entities listed on an officer document
    pub officer_entity_cap: usize,
    /// Jurisdictions ranked on an investigation document
    pub jurisdiction_cap: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_documents: 5000,
            max_investigations: 100,
            officer_cap: 5,
            address_cap: 3,
            entity_cap: 5,
            officer_entity_cap: 5,
            jurisdiction_cap: 5,
        }
    }
}

/// Renders documents from a built graph
#[derive(Debug, Clone, Default)]
pub struct DocumentSynthesizer {
    config: SynthesisConfig,
}

impl DocumentSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize the full document set for a graph
    pub fn synthesize(&self, graph: &GraphStore) -> Vec<Document> {
        let budget = self.config.max_documents;
        let mut documents = Vec::new();

        for node in graph.nodes_of_kind(NodeKind::Entity) {
            if documents.len() >= budget {
                break;
            }
            if let Some(doc) = self.entity_document(graph, node) {
                documents.push(doc);
            }
        }
        let entity_docs = documents.len();

        for node in graph.nodes_of_kind(NodeKind::Officer) {
            if documents.len() >= budget {
                break;
            }
            if let Some(doc) = self.officer_document(graph, node) {
                documents.push(doc);
            }
        }
        let officer_docs = documents.len() - entity_docs;

        let remaining = budget.saturating_sub(documents.len());
        let investigations = self.investigation_documents(graph, remaining.min(self.config.max_investigations));
        let investigation_docs = investigations.len();
        documents.extend(investigations);

        info!(
            entities = entity_docs,
            officers = officer_docs,
            investigations = investigation_docs,
            "Synthesized {} documents",
            documents.len()
        );
        documents
    }

    /// Entity document with its officer, address and related-entity neighborhood
    pub fn entity_document(&self, graph: &GraphStore, node: &Node) -> Option<Document> {
        let entity = node.as_entity()?;
        let neighbors = graph.neighbors(node.id);
        let officers = of_kind(&neighbors, NodeKind::Officer);
        let addresses = of_kind(&neighbors, NodeKind::Address);
        let others = of_kind(&neighbors, NodeKind::Entity);

        let mut content = format!("Offshore Entity: {}\n", entity.name);
        content.push_str(&format!("Entity ID: {}\n", entity.entity_id));
        content.push_str(&format!("Jurisdiction: {}\n", entity.jurisdiction));
        if !entity.company_type.is_empty() {
            content.push_str(&format!("Type: {}\n", entity.company_type));
        }
        content.push_str(&format!("Status: {}\n", entity.status));
        if !entity.incorporation_date.is_empty() {
            content.push_str(&format!("Incorporation Date: {}\n", entity.incorporation_date));
        }
        if !entity.address.is_empty() {
            content.push_str(&format!("Address: {}\n", entity.address));
        }
        content.push_str(&format!("Source: {}\n", entity.source));

        if !officers.is_empty() {
            let listed: Vec<String> = officers
                .iter()
                .take(self.config.officer_cap)
                .map(|n| format!("{} ({})", n.node.display_name(), label(n, "connected_to")))
                .collect();
            content.push_str(&format!("\nConnected Officers: {}\n", listed.join(", ")));
        }

        if !addresses.is_empty() {
            let listed: Vec<String> = addresses
                .iter()
                .take(self.config.address_cap)
                .map(|n| format!("{} ({})", n.node.display_name(), label(n, "registered_address")))
                .collect();
            content.push_str(&format!("\nRegistered Addresses: {}\n", listed.join("; ")));
        }

        if !others.is_empty() {
            let listed: Vec<String> = others
                .iter()
                .take(self.config.entity_cap)
                .map(|n| {
                    format!(
                        "{} in {} ({})",
                        n.node.display_name(),
                        n.node.jurisdiction().unwrap_or_default(),
                        label(n, "related_to")
                    )
                })
                .collect();
            content.push_str(&format!("\nOther Entities: {}\n", listed.join(", ")));
        }

        content.push_str(&format!(
            "\nDescription: This is an offshore entity from the {} investigation",
            entity.source
        ));
        if !entity.jurisdiction.is_empty() {
            content.push_str(&format!(" incorporated in {}", entity.jurisdiction));
        }
        content.push_str(&format!(". This entity was revealed in the {} investigation", entity.source));
        if !entity.jurisdiction.is_empty() {
            content.push_str(&format!(" and is incorporated in {}", entity.jurisdiction));
        }
        content.push('.');

        Some(
            Document::new(content, DocumentType::Entity)
                .with("entity_id", entity.entity_id.as_str())
                .with("name", entity.name.as_str())
                .with("jurisdiction", entity.jurisdiction.as_str())
                .with("company_type", entity.company_type.as_str())
                .with("status", entity.status.as_str())
                .with("source", entity.source.as_str())
                .with("countries", entity.countries.as_str())
                .with("title", format!("Entity: {}", entity.name)),
        )
    }

    /// Officer document listing connected entities
    pub fn officer_document(&self, graph: &GraphStore, node: &Node) -> Option<Document> {
        let officer = node.as_officer()?;
        let neighbors = graph.neighbors(node.id);
        let entities = of_kind(&neighbors, NodeKind::Entity);

        let mut content = format!("Individual: {}\n", officer.name);
        content.push_str(&format!("Officer ID: {}\n", officer.officer_id));
        if !officer.countries.is_empty() {
            content.push_str(&format!("Country: {}\n", officer.countries));
        }
        content.push_str(&format!("Source: {}\n", officer.source));

        if !entities.is_empty() {
            let listed: Vec<String> = entities
                .iter()
                .take(self.config.officer_entity_cap)
                .map(|n| {
                    format!(
                        "{} in {} ({})",
                        n.node.display_name(),
                        n.node.jurisdiction().unwrap_or_default(),
                        label(n, "officer_of")
                    )
                })
                .collect();
            content.push_str(&format!("\nConnected Entities: {}\n", listed.join(", ")));
        }

        content.push_str(&format!("\nDescription: {} is an individual", officer.name));
        if !officer.countries.is_empty() {
            content.push_str(&format!(" from {}", officer.countries));
        }
        content.push_str(&format!(" who appears in the {} investigation", officer.source));
        if !entities.is_empty() {
            content.push_str(&format!(" with connections to {} offshore entities", entities.len()));
        }
        content.push('.');

        let mut document = Document::new(content, DocumentType::Officer)
            .with("officer_id", officer.officer_id.as_str())
            .with("name", officer.name.as_str())
            .with("countries", officer.countries.as_str())
            .with("source", officer.source.as_str())
            .with("title", format!("Officer: {}", officer.name));
        // Role is the relationship to the first listed entity
        if let Some(first) = entities.first() {
            document = document.with("role", label(first, "officer_of"));
        }
        Some(document)
    }

    /// One summary per distinct entity source, in first-encounter order, at most `limit`
    pub fn investigation_documents(&self, graph: &GraphStore, limit: usize) -> Vec<Document> {
        let mut sources: IndexMap<&str, HashMap<&str, usize>> = IndexMap::new();
        for entity in graph
            .nodes_of_kind(NodeKind::Entity)
            .into_iter()
            .filter_map(Node::as_entity)
        {
            *sources
                .entry(entity.source.as_str())
                .or_default()
                .entry(entity.jurisdiction.as_str())
                .or_insert(0) += 1;
        }

        sources
            .iter()
            .take(limit)
            .map(|(source, jurisdictions)| self.investigation_document(source, jurisdictions))
            .collect()
    }

    fn investigation_document(&self, source: &str, jurisdictions: &HashMap<&str, usize>) -> Document {
        let entity_count: usize = jurisdictions.values().sum();

        let mut ranked: Vec<(&str, usize)> = jurisdictions.iter().map(|(j, c)| (*j, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let top: Vec<String> = ranked
            .iter()
            .take(self.config.jurisdiction_cap)
            .map(|(j, c)| format!("{} ({} entities)", j, c))
            .collect();

        let mut content = format!("Investigation: {}\n\n", source);
        content.push_str(&format!(
            "The {} investigation revealed {} offshore entities across {} jurisdictions.\n\n",
            source,
            group_thousands(entity_count),
            jurisdictions.len()
        ));
        content.push_str(&format!("Key jurisdictions include: {}.\n\n", top.join(", ")));
        content.push_str(
            "This investigation exposed complex offshore structures and financial networks \
             involving entities, individuals, and intermediaries across multiple jurisdictions.",
        );

        Document::new(content, DocumentType::Investigation)
            .with("source", source)
            .with("title", format!("Investigation: {}", source))
            .with("entity_count", entity_count)
            .with("jurisdiction_count", jurisdictions.len())
    }
}

fn of_kind<'a, 'g>(neighbors: &'a [Neighbor<'g>], kind: NodeKind) -> Vec<&'a Neighbor<'g>> {
    neighbors.iter().filter(|n| n.node.kind() == kind).collect()
}

fn label<'a>(neighbor: &'a Neighbor<'_>, fallback: &'a str) -> &'a str {
    neighbor.edge.relationship_label().unwrap_or(fallback)
}

/// `1234567` -> `1,234,567`
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
