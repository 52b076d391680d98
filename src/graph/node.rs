//! Node implementation for the leak graph
//!
//! A node is one of three fixed variants. Field access is a match over the
//! variant rather than a lookup in a loose attribute map.

use super::types::{NodeId, NodeKind};
use crate::loader::{AddressRecord, EntityRecord, OfficerRecord};
use serde::{Deserialize, Serialize};

/// The typed payload of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeRecord {
    Entity(EntityRecord),
    Officer(OfficerRecord),
    Address(AddressRecord),
}

impl NodeRecord {
    /// The dataset's native identifier
    pub fn key(&self) -> &str {
        match self {
            NodeRecord::Entity(e) => &e.entity_id,
            NodeRecord::Officer(o) => &o.officer_id,
            NodeRecord::Address(a) => &a.address_id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRecord::Entity(_) => NodeKind::Entity,
            NodeRecord::Officer(_) => NodeKind::Officer,
            NodeRecord::Address(_) => NodeKind::Address,
        }
    }
}

impl From<EntityRecord> for NodeRecord {
    fn from(record: EntityRecord) -> Self {
        NodeRecord::Entity(record)
    }
}

impl From<OfficerRecord> for NodeRecord {
    fn from(record: OfficerRecord) -> Self {
        NodeRecord::Officer(record)
    }
}

impl From<AddressRecord> for NodeRecord {
    fn from(record: AddressRecord) -> Self {
        NodeRecord::Address(record)
    }
}

/// A node in the leak graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Dense internal identifier
    pub id: NodeId,

    /// Typed attributes
    pub record: NodeRecord,
}

impl Node {
    pub fn new(id: NodeId, record: impl Into<NodeRecord>) -> Self {
        Node {
            id,
            record: record.into(),
        }
    }

    /// Native identifier from the dataset
    pub fn key(&self) -> &str {
        self.record.key()
    }

    pub fn kind(&self) -> NodeKind {
        self.record.kind()
    }

    /// Identifier prefixed with the node kind, e.g. `entity:10000001`
    pub fn qualified_id(&self) -> String {
        format!("{}:{}", self.kind(), self.key())
    }

    /// Human-readable label: the name for entities and officers, the address text for addresses
    pub fn display_name(&self) -> &str {
        match &self.record {
            NodeRecord::Entity(e) => &e.name,
            NodeRecord::Officer(o) => &o.name,
            NodeRecord::Address(a) => &a.address,
        }
    }

    /// Leak or investigation label
    pub fn source(&self) -> &str {
        match &self.record {
            NodeRecord::Entity(e) => &e.source,
            NodeRecord::Officer(o) => &o.source,
            NodeRecord::Address(a) => &a.source,
        }
    }

    pub fn countries(&self) -> &str {
        match &self.record {
            NodeRecord::Entity(e) => &e.countries,
            NodeRecord::Officer(o) => &o.countries,
            NodeRecord::Address(a) => &a.countries,
        }
    }

    /// Jurisdiction, only defined for entities
    pub fn jurisdiction(&self) -> Option<&str> {
        match &self.record {
            NodeRecord::Entity(e) => Some(&e.jurisdiction),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRecord> {
        match &self.record {
            NodeRecord::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_officer(&self) -> Option<&OfficerRecord> {
        match &self.record {
            NodeRecord::Officer(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&AddressRecord> {
        match &self.record {
            NodeRecord::Address(a) => Some(a),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::loader::{AddressRecord, EntityRecord, OfficerRecord, RelationshipRecord};

    pub fn entity(id: &str, name: &str, jurisdiction: &str, source: &str) -> EntityRecord {
        EntityRecord {
            entity_id: id.to_string(),
            name: name.to_string(),
            original_name: name.to_string(),
            former_name: String::new(),
            jurisdiction: jurisdiction.to_string(),
            jurisdiction_description: String::new(),
            company_type: "Company".to_string(),
            address: String::new(),
            internal_id: String::new(),
            incorporation_date: String::new(),
            inactivation_date: String::new(),
            struck_off_date: String::new(),
            status: "Active".to_string(),
            service_provider: "Unknown".to_string(),
            country_codes: String::new(),
            countries: String::new(),
            source: source.to_string(),
            valid_until: String::new(),
            note: String::new(),
        }
    }

    pub fn officer(id: &str, name: &str, countries: &str, source: &str) -> OfficerRecord {
        OfficerRecord {
            officer_id: id.to_string(),
            name: name.to_string(),
            countries: countries.to_string(),
            country_codes: String::new(),
            source: source.to_string(),
            valid_until: String::new(),
            note: String::new(),
        }
    }

    pub fn address(id: &str, address: &str, countries: &str, source: &str) -> AddressRecord {
        AddressRecord {
            address_id: id.to_string(),
            address: address.to_string(),
            name: String::new(),
            countries: countries.to_string(),
            country_codes: String::new(),
            source: source.to_string(),
            valid_until: String::new(),
            note: String::new(),
        }
    }

    pub fn relationship(start: &str, end: &str, rel_type: &str) -> RelationshipRecord {
        RelationshipRecord {
            start_node: start.to_string(),
            end_node: end.to_string(),
            rel_type: rel_type.to_string(),
            link: String::new(),
            status: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            source: "Panama Papers".to_string(),
        }
    }
}
