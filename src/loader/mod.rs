//! Dataset loader for offshore-leaks CSV dumps
//!
//! Reads entities, officers, addresses and relationships into typed records.
//! A category that cannot be read degrades to an empty collection and is
//! logged; it never aborts the rest of the load.

pub mod records;

pub use records::{AddressRecord, EntityRecord, OfficerRecord, RelationshipRecord};

use records::{AddressRow, EntityRow, OfficerRow, RelationshipRow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Loader errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Dataset directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// The four record categories of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Entities,
    Officers,
    Addresses,
    Relationships,
}

impl Category {
    /// File name of this category inside the dataset directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Entities => "nodes-entities.csv",
            Category::Officers => "nodes-officers.csv",
            Category::Addresses => "nodes-addresses.csv",
            Category::Relationships => "relationships.csv",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entities => "entities",
            Category::Officers => "officers",
            Category::Addresses => "addresses",
            Category::Relationships => "relationships",
        }
    }
}

/// Per-category row caps.
///
/// A cap keeps the first N rows in file order. It bounds work; it is not a
/// representative sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadLimits {
    pub entities: Option<usize>,
    pub officers: Option<usize>,
    pub addresses: Option<usize>,
    pub relationships: Option<usize>,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            entities: Some(10_000),
            officers: Some(5_000),
            addresses: Some(5_000),
            relationships: Some(20_000),
        }
    }
}

impl LoadLimits {
    /// No caps on any category
    pub fn unlimited() -> Self {
        Self {
            entities: None,
            officers: None,
            addresses: None,
            relationships: None,
        }
    }

    pub fn for_category(&self, category: Category) -> Option<usize> {
        match category {
            Category::Entities => self.entities,
            Category::Officers => self.officers,
            Category::Addresses => self.addresses,
            Category::Relationships => self.relationships,
        }
    }
}

/// Outcome of loading one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    /// Rows kept
    pub loaded: usize,
    /// Rows skipped because they could not be parsed or had no id
    pub skipped: usize,
    /// True when the whole category fell back to empty
    pub degraded: bool,
}

/// Summary of a full dataset load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub entities: CategoryReport,
    pub officers: CategoryReport,
    pub addresses: CategoryReport,
    pub relationships: CategoryReport,
}

/// All four collections of a loaded dataset, in file order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub entities: Vec<EntityRecord>,
    pub officers: Vec<OfficerRecord>,
    pub addresses: Vec<AddressRecord>,
    pub relationships: Vec<RelationshipRecord>,
    pub report: LoadReport,
}

impl Dataset {
    /// Load a dataset from one reader per category.
    ///
    /// `None` stands for a missing file and degrades that category.
    pub fn from_readers<E, O, A, R>(
        entities: Option<E>,
        officers: Option<O>,
        addresses: Option<A>,
        relationships: Option<R>,
        limits: &LoadLimits,
    ) -> Self
    where
        E: Read,
        O: Read,
        A: Read,
        R: Read,
    {
        let (entities, entity_report) = load_category(
            Category::Entities,
            entities,
            limits.entities,
            EntityRow::into_record,
        );
        let (officers, officer_report) = load_category(
            Category::Officers,
            officers,
            limits.officers,
            OfficerRow::into_record,
        );
        let (addresses, address_report) = load_category(
            Category::Addresses,
            addresses,
            limits.addresses,
            AddressRow::into_record,
        );
        let (relationships, relationship_report) = load_category(
            Category::Relationships,
            relationships,
            limits.relationships,
            RelationshipRow::into_record,
        );

        let dataset = Dataset {
            entities,
            officers,
            addresses,
            relationships,
            report: LoadReport {
                entities: entity_report,
                officers: officer_report,
                addresses: address_report,
                relationships: relationship_report,
            },
        };
        dataset.log_summary();
        dataset
    }

    pub fn entity(&self, entity_id: &str) -> Option<&EntityRecord> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }

    pub fn officer(&self, officer_id: &str) -> Option<&OfficerRecord> {
        self.officers.iter().find(|o| o.officer_id == officer_id)
    }

    /// Case-insensitive substring search over entity names, first `limit` in file order
    pub fn search_entities_by_name(&self, name: &str, limit: usize) -> Vec<&EntityRecord> {
        let needle = name.to_lowercase();
        self.entities
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    /// Case-insensitive substring search over officer names, first `limit` in file order
    pub fn search_officers_by_name(&self, name: &str, limit: usize) -> Vec<&OfficerRecord> {
        let needle = name.to_lowercase();
        self.officers
            .iter()
            .filter(|o| o.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.officers.is_empty()
            && self.addresses.is_empty()
            && self.relationships.is_empty()
    }

    fn log_summary(&self) {
        info!(
            entities = self.entities.len(),
            officers = self.officers.len(),
            addresses = self.addresses.len(),
            relationships = self.relationships.len(),
            "Dataset loaded"
        );

        for (source, count) in ranked_counts(self.entities.iter().map(|e| e.source.as_str()), usize::MAX) {
            info!("Entity source {}: {} entities", source, count);
        }
        for (jurisdiction, count) in ranked_counts(self.entities.iter().map(|e| e.jurisdiction.as_str()), 10) {
            info!("Jurisdiction {}: {} entities", jurisdiction, count);
        }
        for (country, count) in ranked_counts(self.officers.iter().map(|o| o.countries.as_str()), 10) {
            info!("Officer country {}: {} officers", country, count);
        }
    }
}

/// Count occurrences and rank by count descending, then key ascending
fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(&'a str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);
    ranked
}

/// Reads dataset categories from a directory of CSV files
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    data_dir: PathBuf,
}

impl DatasetLoader {
    /// Open a dataset directory. Fails only if the directory itself is missing.
    pub fn open(data_dir: impl AsRef<Path>) -> LoadResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            return Err(LoadError::DirectoryNotFound(data_dir));
        }
        info!("Dataset directory: {:?}", data_dir);
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load all four categories with the given caps
    pub fn load_all(&self, limits: &LoadLimits) -> Dataset {
        Dataset::from_readers(
            self.open_category(Category::Entities),
            self.open_category(Category::Officers),
            self.open_category(Category::Addresses),
            self.open_category(Category::Relationships),
            limits,
        )
    }

    pub fn load_entities(&self, limit: Option<usize>) -> Vec<EntityRecord> {
        load_category(
            Category::Entities,
            self.open_category(Category::Entities),
            limit,
            EntityRow::into_record,
        )
        .0
    }

    pub fn load_officers(&self, limit: Option<usize>) -> Vec<OfficerRecord> {
        load_category(
            Category::Officers,
            self.open_category(Category::Officers),
            limit,
            OfficerRow::into_record,
        )
        .0
    }

    pub fn load_addresses(&self, limit: Option<usize>) -> Vec<AddressRecord> {
        load_category(
            Category::Addresses,
            self.open_category(Category::Addresses),
            limit,
            AddressRow::into_record,
        )
        .0
    }

    pub fn load_relationships(&self, limit: Option<usize>) -> Vec<RelationshipRecord> {
        load_category(
            Category::Relationships,
            self.open_category(Category::Relationships),
            limit,
            RelationshipRow::into_record,
        )
        .0
    }

    fn open_category(&self, category: Category) -> Option<File> {
        let path = self.data_dir.join(category.file_name());
        match File::open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Cannot open {} file {:?}: {}", category.as_str(), path, e);
                None
            }
        }
    }
}

/// Load one category, degrading to empty on any file-level failure
fn load_category<R, Row, T>(
    category: Category,
    reader: Option<R>,
    limit: Option<usize>,
    convert: fn(Row) -> Option<T>,
) -> (Vec<T>, CategoryReport)
where
    R: Read,
    Row: DeserializeOwned,
{
    let Some(reader) = reader else {
        return (Vec::new(), CategoryReport { degraded: true, ..Default::default() });
    };

    match read_rows(reader, limit, convert) {
        Ok((records, skipped)) => {
            if skipped > 0 {
                warn!("Skipped {} malformed {} rows", skipped, category.as_str());
            }
            debug!("Loaded {} {}", records.len(), category.as_str());
            let report = CategoryReport {
                loaded: records.len(),
                skipped,
                degraded: false,
            };
            (records, report)
        }
        Err(e) => {
            warn!("Failed to load {}: {}", category.as_str(), e);
            (Vec::new(), CategoryReport { degraded: true, ..Default::default() })
        }
    }
}

fn read_rows<R, Row, T>(
    reader: R,
    limit: Option<usize>,
    convert: fn(Row) -> Option<T>,
) -> LoadResult<(Vec<T>, usize)>
where
    R: Read,
    Row: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    // Header-level failures degrade the whole category
    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let mut records = Vec::new();
    let mut skipped = 0;
    let limit = limit.unwrap_or(usize::MAX);

    for row in csv_reader.deserialize::<Row>() {
        if records.len() >= limit {
            break;
        }
        match row {
            Ok(row) => match convert(row) {
                Some(record) => records.push(record),
                None => skipped += 1,
            },
            Err(e) => {
                debug!("Skipping row: {}", e);
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITIES: &str = "node_id,name,jurisdiction,company_type,status,sourceID,countries\n\
        1,ALPHA LTD,SAM,Company,Active,Panama Papers,Samoa\n\
        2,BETA INC,BVI,,Defaulted,Panama Papers,\n\
        3,\"GAMMA, S.A.\",PAN,Trust,Active,Paradise Papers,Panama\n";

    fn no_file() -> Option<&'static [u8]> {
        None
    }

    #[test]
    fn test_load_entities_with_quoted_commas() {
        let dataset = Dataset::from_readers(
            Some(ENTITIES.as_bytes()),
            no_file(),
            no_file(),
            no_file(),
            &LoadLimits::unlimited(),
        );

        assert_eq!(dataset.entities.len(), 3);
        assert_eq!(dataset.entities[2].name, "GAMMA, S.A.");
        assert_eq!(dataset.entities[1].company_type, "Unknown");
        assert_eq!(dataset.entities[0].source, "Panama Papers");
        assert!(!dataset.report.entities.degraded);
    }

    #[test]
    fn test_limit_keeps_first_rows_in_file_order() {
        let limits = LoadLimits {
            entities: Some(2),
            ..LoadLimits::unlimited()
        };
        let dataset = Dataset::from_readers(
            Some(ENTITIES.as_bytes()),
            no_file(),
            no_file(),
            no_file(),
            &limits,
        );

        let ids: Vec<&str> = dataset.entities.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_missing_category_degrades_to_empty() {
        let dataset = Dataset::from_readers(
            Some(ENTITIES.as_bytes()),
            no_file(),
            no_file(),
            no_file(),
            &LoadLimits::default(),
        );

        assert!(dataset.officers.is_empty());
        assert!(dataset.report.officers.degraded);
        assert_eq!(dataset.report.entities.loaded, 3);
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let officers = "node_id,name,countries,sourceID\n\
            ,NOBODY,,Panama Papers\n\
            10,JOHN SMITH,United Kingdom,Panama Papers\n";
        let dataset = Dataset::from_readers(
            no_file(),
            Some(officers.as_bytes()),
            no_file(),
            no_file(),
            &LoadLimits::unlimited(),
        );

        assert_eq!(dataset.officers.len(), 1);
        assert_eq!(dataset.report.officers.skipped, 1);
        assert_eq!(dataset.officers[0].officer_id, "10");
    }

    #[test]
    fn test_unreadable_header_degrades_category() {
        let entities: &[u8] = b"node_id,\xff\xfename,sourceID\n1,ALPHA LTD,Panama Papers\n";
        let dataset = Dataset::from_readers(
            Some(entities),
            Some(ENTITIES.as_bytes()),
            no_file(),
            no_file(),
            &LoadLimits::unlimited(),
        );

        assert!(dataset.entities.is_empty());
        assert!(dataset.report.entities.degraded);
        assert_eq!(dataset.report.entities.loaded, 0);
        assert!(!dataset.report.officers.degraded);
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let officers: &[u8] = b"node_id,name,countries,sourceID\n\
            10,\xff\xfe,Malta,Panama Papers\n\
            11,JANE DOE,Malta,Panama Papers\n";
        let dataset = Dataset::from_readers(
            no_file(),
            Some(officers),
            no_file(),
            no_file(),
            &LoadLimits::unlimited(),
        );

        assert_eq!(dataset.officers.len(), 1);
        assert_eq!(dataset.officers[0].officer_id, "11");
        assert_eq!(dataset.report.officers.skipped, 1);
        assert!(!dataset.report.officers.degraded);
    }

    #[test]
    fn test_search_by_name() {
        let dataset = Dataset::from_readers(
            Some(ENTITIES.as_bytes()),
            no_file(),
            no_file(),
            no_file(),
            &LoadLimits::unlimited(),
        );

        let hits = dataset.search_entities_by_name("ltd", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity_id, "1");
        assert!(dataset.entity("3").is_some());
        assert!(dataset.entity("99").is_none());
    }

    #[test]
    fn test_open_missing_directory() {
        let result = DatasetLoader::open("/definitely/not/here");
        assert!(matches!(result, Err(LoadError::DirectoryNotFound(_))));
    }
}
