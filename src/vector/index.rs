//! Document vector index
//!
//! Below `ann_threshold` entries every search is an exact cosine scan. Larger
//! indices carry an HNSW graph (hnsw_rs): it over-fetches candidates, which
//! are then ranked by exact cosine distance. That path is approximate, and
//! because HNSW layers are assigned at random, results may differ between
//! rebuilds. When HNSW returns too few candidates the search falls back to
//! the scan.

use crate::document::Document;
use crate::embed::{EmbedError, Embedder};
use hnsw_rs::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info};

/// Vector index errors
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Document/vector count mismatch: {documents} documents, {vectors} vectors")]
    CountMismatch { documents: usize, vectors: usize },

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedError),
}

pub type VectorResult<T> = Result<T, VectorError>;

/// Index construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Entry count at which an HNSW graph is built alongside the flat scan
    pub ann_threshold: usize,
    pub max_connections: usize,
    pub ef_construction: usize,
    /// Lower bound on the HNSW search beam and candidate count
    pub ef_search: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            ann_threshold: 10_000,
            max_connections: 16,
            ef_construction: 200,
            ef_search: 64,
        }
    }
}

/// Cosine distance implementation for hnsw_rs
#[derive(Clone, Copy, Debug, Default)]
pub struct CosineDistance;

impl Distance<f32> for CosineDistance {
    fn eval(&self, va: &[f32], vb: &[f32]) -> f32 {
        let mut dot = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;

        for (a, b) in va.iter().zip(vb.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        if norm_a <= 0.0 || norm_b <= 0.0 {
            return 1.0;
        }

        // Cosine distance = 1.0 - cosine similarity
        let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
        1.0 - sim
    }
}

/// A document with its embedding
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub document: Document,
    pub vector: Vec<f32>,
}

/// One search result
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub document: &'a Document,
    /// Cosine similarity to the query
    pub score: f32,
    /// Insertion position in the index
    pub position: usize,
}

/// Read-only, build-once document index
pub struct VectorIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
    hnsw: Option<Hnsw<'static, f32, CosineDistance>>,
    config: IndexConfig,
    /// Generation of the graph the documents were synthesized from
    generation: u64,
}

// Implement Debug manually because Hnsw doesn't implement it
impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("dimensions", &self.dimensions)
            .field("entries", &self.entries.len())
            .field("ann", &self.hnsw.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

impl VectorIndex {
    /// An index with no entries; every search returns nothing
    pub fn empty(dimensions: usize, generation: u64) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
            hnsw: None,
            config: IndexConfig::default(),
            generation,
        }
    }

    /// Embed `documents` and index them. Zero documents yields an empty index
    /// without calling the embedder.
    pub async fn build(
        documents: Vec<Document>,
        embedder: &dyn Embedder,
        config: &IndexConfig,
        generation: u64,
    ) -> VectorResult<Self> {
        if documents.is_empty() {
            info!("No documents to index");
            return Ok(Self::empty(embedder.dimensions(), generation));
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = embedder.embed_documents(&texts).await?;
        Self::from_embeddings(documents, vectors, embedder.dimensions(), config, generation)
    }

    /// Index pre-computed embeddings, one per document in order
    pub fn from_embeddings(
        documents: Vec<Document>,
        vectors: Vec<Vec<f32>>,
        dimensions: usize,
        config: &IndexConfig,
        generation: u64,
    ) -> VectorResult<Self> {
        if documents.len() != vectors.len() {
            return Err(VectorError::CountMismatch {
                documents: documents.len(),
                vectors: vectors.len(),
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(VectorError::DimensionMismatch {
                expected: dimensions,
                got: bad.len(),
            });
        }

        let entries: Vec<IndexEntry> = documents
            .into_iter()
            .zip(vectors)
            .map(|(document, vector)| IndexEntry { document, vector })
            .collect();

        let hnsw = if entries.len() >= config.ann_threshold {
            let hnsw = Hnsw::new(
                config.max_connections,
                entries.len(),
                16,
                config.ef_construction,
                CosineDistance,
            );
            for (position, entry) in entries.iter().enumerate() {
                hnsw.insert((&entry.vector, position));
            }
            Some(hnsw)
        } else {
            None
        };

        info!(
            documents = entries.len(),
            dimensions,
            ann = hnsw.is_some(),
            generation,
            "Vector index built"
        );

        Ok(Self {
            dimensions,
            entries,
            hnsw,
            config: *config,
            generation,
        })
    }

    /// Embed `query` and return the `k` most similar documents
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> VectorResult<Vec<SearchHit<'_>>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let vector = embedder.embed_query(query).await?;
        self.search_vector(&vector, k)
    }

    /// Most similar documents first, ties broken by insertion order.
    /// Returns `min(k, len)` hits.
    pub fn search_vector(&self, query: &[f32], k: usize) -> VectorResult<Vec<SearchHit<'_>>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimensions,
                got: query.len(),
            });
        }

        let wanted = k.min(self.entries.len());
        if let Some(hits) = self.ann_candidates(query, wanted) {
            return Ok(hits);
        }
        Ok(self.exact_search(query, wanted))
    }

    fn ann_candidates(&self, query: &[f32], wanted: usize) -> Option<Vec<SearchHit<'_>>> {
        let hnsw = self.hnsw.as_ref()?;
        let candidates = self
            .config
            .ef_search
            .max(wanted.saturating_mul(4))
            .min(self.entries.len());
        let neighbours = hnsw.search(query, candidates, self.config.ef_search.max(candidates));

        let mut positions: Vec<usize> = neighbours
            .iter()
            .map(|n| n.d_id)
            .filter(|&p| p < self.entries.len())
            .collect();
        positions.sort_unstable();
        positions.dedup();

        if positions.len() < wanted {
            debug!(
                "HNSW returned {} of {} candidates, falling back to exact scan",
                positions.len(),
                wanted
            );
            return None;
        }

        Some(self.rank(query, positions.into_iter(), wanted))
    }

    fn exact_search(&self, query: &[f32], wanted: usize) -> Vec<SearchHit<'_>> {
        self.rank(query, 0..self.entries.len(), wanted)
    }

    fn rank(
        &self,
        query: &[f32],
        positions: impl Iterator<Item = usize>,
        wanted: usize,
    ) -> Vec<SearchHit<'_>> {
        let mut scored: Vec<(usize, f32)> = positions
            .map(|p| (p, CosineDistance.eval(query, &self.entries[p].vector)))
            .collect();
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(wanted);

        scored
            .into_iter()
            .map(|(position, distance)| SearchHit {
                document: &self.entries[position].document,
                score: 1.0 - distance,
                position,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_ann(&self) -> bool {
        self.hnsw.is_some()
    }

    /// Indexed documents in insertion order
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().map(|e| &e.document)
    }
}
