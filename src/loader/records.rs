//! Typed records for the four dataset categories
//!
//! Each category has a private row type mirroring the CSV columns and a public
//! record type with sentinel defaults applied. Empty cells never fail a row;
//! only a missing identifier does.

use serde::{Deserialize, Serialize};

const UNKNOWN: &str = "Unknown";

/// Return `value` unless it is blank, in which case return `fallback`.
fn or_default(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Split a `;`-separated country cell into its parts.
fn split_countries(countries: &str) -> Vec<&str> {
    countries
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// An offshore legal vehicle (company, trust, foundation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_id: String,
    pub name: String,
    pub original_name: String,
    pub former_name: String,
    pub jurisdiction: String,
    pub jurisdiction_description: String,
    pub company_type: String,
    pub address: String,
    pub internal_id: String,
    pub incorporation_date: String,
    pub inactivation_date: String,
    pub struck_off_date: String,
    pub status: String,
    pub service_provider: String,
    pub country_codes: String,
    pub countries: String,
    /// Leak or investigation the entity was disclosed in
    pub source: String,
    pub valid_until: String,
    pub note: String,
}

impl EntityRecord {
    pub fn country_list(&self) -> Vec<&str> {
        split_countries(&self.countries)
    }
}

/// An individual associated with one or more entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRecord {
    pub officer_id: String,
    pub name: String,
    pub countries: String,
    pub country_codes: String,
    pub source: String,
    pub valid_until: String,
    pub note: String,
}

impl OfficerRecord {
    pub fn country_list(&self) -> Vec<&str> {
        split_countries(&self.countries)
    }
}

/// A registered or associated physical address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address_id: String,
    pub address: String,
    pub name: String,
    pub countries: String,
    pub country_codes: String,
    pub source: String,
    pub valid_until: String,
    pub note: String,
}

impl AddressRecord {
    pub fn country_list(&self) -> Vec<&str> {
        split_countries(&self.countries)
    }
}

/// A directed relationship between two node ids.
///
/// Endpoints are not validated here; the graph builder drops relationships
/// whose endpoints were not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub start_node: String,
    pub end_node: String,
    pub rel_type: String,
    pub link: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub source: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EntityRow {
    node_id: String,
    name: String,
    original_name: String,
    former_name: String,
    jurisdiction: String,
    jurisdiction_description: String,
    company_type: String,
    address: String,
    internal_id: String,
    incorporation_date: String,
    inactivation_date: String,
    struck_off_date: String,
    status: String,
    service_provider: String,
    country_codes: String,
    countries: String,
    #[serde(rename = "sourceID")]
    source_id: String,
    valid_until: String,
    note: String,
}

impl EntityRow {
    pub(crate) fn into_record(self) -> Option<EntityRecord> {
        let entity_id = self.node_id.trim().to_string();
        if entity_id.is_empty() {
            return None;
        }
        let name = or_default(self.name, "Unknown Entity");
        let original_name = or_default(self.original_name, &name);
        Some(EntityRecord {
            entity_id,
            name,
            original_name,
            former_name: self.former_name,
            jurisdiction: or_default(self.jurisdiction, UNKNOWN),
            jurisdiction_description: self.jurisdiction_description,
            company_type: or_default(self.company_type, UNKNOWN),
            address: self.address,
            internal_id: self.internal_id,
            incorporation_date: self.incorporation_date,
            inactivation_date: self.inactivation_date,
            struck_off_date: self.struck_off_date,
            status: or_default(self.status, UNKNOWN),
            service_provider: or_default(self.service_provider, UNKNOWN),
            country_codes: self.country_codes,
            countries: self.countries,
            source: or_default(self.source_id, UNKNOWN),
            valid_until: self.valid_until,
            note: self.note,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OfficerRow {
    node_id: String,
    name: String,
    countries: String,
    country_codes: String,
    #[serde(rename = "sourceID")]
    source_id: String,
    valid_until: String,
    note: String,
}

impl OfficerRow {
    pub(crate) fn into_record(self) -> Option<OfficerRecord> {
        let officer_id = self.node_id.trim().to_string();
        if officer_id.is_empty() {
            return None;
        }
        Some(OfficerRecord {
            officer_id,
            name: or_default(self.name, "Unknown Person"),
            countries: or_default(self.countries, UNKNOWN),
            country_codes: self.country_codes,
            source: or_default(self.source_id, UNKNOWN),
            valid_until: self.valid_until,
            note: self.note,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AddressRow {
    node_id: String,
    address: String,
    name: String,
    countries: String,
    country_codes: String,
    #[serde(rename = "sourceID")]
    source_id: String,
    valid_until: String,
    note: String,
}

impl AddressRow {
    pub(crate) fn into_record(self) -> Option<AddressRecord> {
        let address_id = self.node_id.trim().to_string();
        if address_id.is_empty() {
            return None;
        }
        Some(AddressRecord {
            address_id,
            address: or_default(self.address, "Unknown Address"),
            name: self.name,
            countries: or_default(self.countries, UNKNOWN),
            country_codes: self.country_codes,
            source: or_default(self.source_id, UNKNOWN),
            valid_until: self.valid_until,
            note: self.note,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RelationshipRow {
    node_id_start: String,
    node_id_end: String,
    rel_type: String,
    link: String,
    status: String,
    start_date: String,
    end_date: String,
    #[serde(rename = "sourceID")]
    source_id: String,
}

impl RelationshipRow {
    pub(crate) fn into_record(self) -> Option<RelationshipRecord> {
        let start_node = self.node_id_start.trim().to_string();
        let end_node = self.node_id_end.trim().to_string();
        if start_node.is_empty() || end_node.is_empty() {
            return None;
        }
        Some(RelationshipRecord {
            start_node,
            end_node,
            rel_type: or_default(self.rel_type, "connected_to"),
            link: self.link,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            source: or_default(self.source_id, UNKNOWN),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_defaults() {
        let row = EntityRow {
            node_id: "10000001".to_string(),
            ..Default::default()
        };
        let record = row.into_record().unwrap();
        assert_eq!(record.name, "Unknown Entity");
        assert_eq!(record.original_name, "Unknown Entity");
        assert_eq!(record.jurisdiction, "Unknown");
        assert_eq!(record.company_type, "Unknown");
        assert_eq!(record.source, "Unknown");
        assert_eq!(record.address, "");
        assert_eq!(record.incorporation_date, "");
    }

    #[test]
    fn test_original_name_falls_back_to_name() {
        let row = EntityRow {
            node_id: "1".to_string(),
            name: "ACME HOLDINGS LTD".to_string(),
            ..Default::default()
        };
        let record = row.into_record().unwrap();
        assert_eq!(record.original_name, "ACME HOLDINGS LTD");
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let row = OfficerRow {
            name: "JOHN DOE".to_string(),
            ..Default::default()
        };
        assert!(row.into_record().is_none());

        let rel = RelationshipRow {
            node_id_start: "1".to_string(),
            ..Default::default()
        };
        assert!(rel.into_record().is_none());
    }

    #[test]
    fn test_relationship_defaults() {
        let rel = RelationshipRow {
            node_id_start: "1".to_string(),
            node_id_end: "2".to_string(),
            ..Default::default()
        };
        let record = rel.into_record().unwrap();
        assert_eq!(record.rel_type, "connected_to");
        assert_eq!(record.source, "Unknown");
        assert_eq!(record.link, "");
    }

    #[test]
    fn test_country_list() {
        let row = AddressRow {
            node_id: "3".to_string(),
            countries: "Panama; Hong Kong;".to_string(),
            ..Default::default()
        };
        let record = row.into_record().unwrap();
        assert_eq!(record.country_list(), vec!["Panama", "Hong Kong"]);
        assert_eq!(record.address, "Unknown Address");
    }
}
