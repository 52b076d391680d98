//! Hybrid graph + vector retrieval
//!
//! [`HybridRetriever`] owns the current graph and document index. Queries run
//! a similarity search with overfetch, then enrich entity hits with live
//! neighborhood facts from the graph. Rebuilds swap the graph or index
//! wholesale, so a query always sees a fully materialized snapshot.

use crate::config::Config;
use crate::document::{Document, DocumentSynthesizer, DocumentType, MetaValue, Metadata, SynthesisConfig};
use crate::embed::{build_embedder, EmbedError, Embedder};
use crate::graph::{GraphStatistics, GraphStore, NodeKind};
use crate::vector::{IndexConfig, SearchHit, VectorError, VectorIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Vector index error: {0}")]
    Vector(#[from] VectorError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbedError),
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Query-time parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Result count when the caller does not give one
    pub default_k: usize,
    /// Candidates fetched per requested result
    pub overfetch: usize,
    /// Neighbors considered for `connected_to`
    pub neighbor_summary_cap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: 4,
            overfetch: 2,
            neighbor_summary_cap: 5,
        }
    }
}

/// A retrieval result: a copy of the indexed document plus enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub metadata: Metadata,
    /// Cosine similarity to the query
    pub score: f32,
}

impl RetrievedDocument {
    fn from_hit(hit: &SearchHit<'_>) -> Self {
        Self {
            content: hit.document.content.clone(),
            metadata: hit.document.metadata.clone(),
            score: hit.score,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetaValue::as_str)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(MetaValue::as_i64)
    }

    pub fn doc_type(&self) -> Option<DocumentType> {
        self.text("type").and_then(DocumentType::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Readiness signal for orchestration layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub total_entities: usize,
    pub total_officers: usize,
    pub indexed_documents: usize,
    pub index_ready: bool,
    /// The index was built from an older graph generation
    pub index_stale: bool,
}

#[derive(Debug, Clone)]
struct Snapshot {
    graph: Arc<GraphStore>,
    index: Option<Arc<VectorIndex>>,
}

/// Retrieval context shared by every request handler
pub struct HybridRetriever {
    state: RwLock<Snapshot>,
    /// Serializes index builds
    build_lock: Mutex<()>,
    embedder: Arc<dyn Embedder>,
    synthesizer: DocumentSynthesizer,
    index_config: IndexConfig,
    config: RetrievalConfig,
}

impl std::fmt::Debug for HybridRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridRetriever")
            .field("embedding_dimensions", &self.embedder.dimensions())
            .field("config", &self.config)
            .finish()
    }
}

impl HybridRetriever {
    /// Create a retriever with default synthesis, index and query settings
    pub fn new(graph: GraphStore, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            state: RwLock::new(Snapshot {
                graph: Arc::new(graph),
                index: None,
            }),
            build_lock: Mutex::new(()),
            embedder,
            synthesizer: DocumentSynthesizer::default(),
            index_config: IndexConfig::default(),
            config: RetrievalConfig::default(),
        }
    }

    /// Create a retriever with every setting and the embedder taken from `config`
    pub fn from_config(graph: GraphStore, config: &Config) -> RetrievalResult<Self> {
        let embedder = build_embedder(&config.embedding)?;
        Ok(Self::new(graph, embedder)
            .with_synthesis(config.synthesis)
            .with_index_config(config.index)
            .with_config(config.retrieval))
    }

    pub fn with_synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesizer = DocumentSynthesizer::new(synthesis);
        self
    }

    pub fn with_index_config(mut self, index_config: IndexConfig) -> Self {
        self.index_config = index_config;
        self
    }

    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub async fn graph(&self) -> Arc<GraphStore> {
        self.state.read().await.graph.clone()
    }

    pub async fn index(&self) -> Option<Arc<VectorIndex>> {
        self.state.read().await.index.clone()
    }

    /// Swap in a new graph. The graph is stamped with the next generation, so
    /// an existing index is treated as stale until [`rebuild_index`] runs.
    ///
    /// [`rebuild_index`]: HybridRetriever::rebuild_index
    pub async fn replace_graph(&self, mut graph: GraphStore) {
        let mut state = self.state.write().await;
        let generation = state.graph.generation() + 1;
        graph.set_generation(generation);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            generation,
            "Graph replaced"
        );
        state.graph = Arc::new(graph);
    }

    /// Synthesize documents from the current graph and replace the index.
    /// Returns the number of indexed documents.
    pub async fn rebuild_index(&self) -> RetrievalResult<usize> {
        let _build = self.build_lock.lock().await;
        self.build_index_locked().await
    }

    async fn build_index_locked(&self) -> RetrievalResult<usize> {
        let graph = self.graph().await;
        let documents = self.synthesizer.synthesize(&graph);
        let index = VectorIndex::build(
            documents,
            self.embedder.as_ref(),
            &self.index_config,
            graph.generation(),
        )
        .await?;
        let count = index.len();

        self.state.write().await.index = Some(Arc::new(index));
        Ok(count)
    }

    /// Build the index if none exists yet
    async fn ensure_index(&self) -> RetrievalResult<Arc<VectorIndex>> {
        if let Some(index) = self.index().await {
            return Ok(index);
        }

        let _build = self.build_lock.lock().await;
        // Another caller may have finished the build while we waited
        if let Some(index) = self.index().await {
            return Ok(index);
        }
        warn!("Vector index not built, building now");
        self.build_index_locked().await?;

        Ok(self
            .index()
            .await
            .unwrap_or_else(|| Arc::new(VectorIndex::empty(self.embedder.dimensions(), 0))))
    }

    /// Retrieve up to `k` documents for `query`, entity hits enriched with
    /// `network_degree` and `connected_to`
    pub async fn retrieve(&self, query: &str, k: usize) -> RetrievalResult<Vec<RetrievedDocument>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let index = self.ensure_index().await?;
        let graph = self.graph().await;

        let candidates = k.saturating_mul(self.config.overfetch.max(1));
        let hits = index.search(query, candidates, self.embedder.as_ref()).await?;
        debug!("Query {:?}: {} candidates", query, hits.len());

        let enrich = index.generation() == graph.generation();
        if !enrich && !hits.is_empty() {
            warn!(
                index_generation = index.generation(),
                graph_generation = graph.generation(),
                "Index is stale, skipping graph enrichment"
            );
        }

        let mut results: Vec<RetrievedDocument> = hits
            .iter()
            .map(|hit| {
                let mut doc = RetrievedDocument::from_hit(hit);
                if enrich {
                    self.enrich(&graph, &mut doc);
                }
                doc
            })
            .collect();
        results.truncate(k);
        Ok(results)
    }

    fn enrich(&self, graph: &GraphStore, doc: &mut RetrievedDocument) {
        if doc.doc_type() != Some(DocumentType::Entity) {
            return;
        }
        let Some(node_id) = doc.text("entity_id").and_then(|key| graph.node_id(key)) else {
            return;
        };

        let summary: Vec<String> = graph
            .neighbors(node_id)
            .iter()
            .take(self.config.neighbor_summary_cap)
            .filter_map(|n| match n.node.kind() {
                NodeKind::Officer => Some(format!("Officer: {}", n.node.display_name())),
                NodeKind::Address => Some(format!("Address: {}", n.node.countries())),
                NodeKind::Entity => None,
            })
            .collect();

        doc.metadata
            .insert("network_degree".to_string(), MetaValue::from(graph.degree(node_id)));
        doc.metadata
            .insert("connected_to".to_string(), MetaValue::from(summary.join("; ")));
    }

    /// Indexed documents in index order, building the index if needed
    pub async fn documents(&self, limit: usize) -> RetrievalResult<Vec<Document>> {
        let index = self.ensure_index().await?;
        Ok(index.documents().take(limit).cloned().collect())
    }

    pub async fn statistics(&self) -> GraphStatistics {
        let graph = self.graph().await;
        GraphStatistics::compute(&graph)
    }

    pub async fn health(&self) -> HealthReport {
        let state = self.state.read().await;
        let graph = &state.graph;
        let indexed_documents = state.index.as_ref().map(|i| i.len()).unwrap_or(0);
        let index_ready = state.index.is_some();
        let index_stale = state
            .index
            .as_ref()
            .is_some_and(|i| i.generation() != graph.generation());

        let status = if graph.node_count() > 0 && index_ready && !index_stale {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        HealthReport {
            status,
            graph_nodes: graph.node_count(),
            graph_edges: graph.edge_count(),
            total_entities: graph.count_of_kind(NodeKind::Entity),
            total_officers: graph.count_of_kind(NodeKind::Officer),
            indexed_documents,
            index_ready,
            index_stale,
        }
    }
}

/// Render results into a context block for a language model prompt
pub fn format_context(documents: &[RetrievedDocument]) -> String {
    let mut out = String::new();
    for doc in documents {
        let title = doc.text("title").unwrap_or("Document");
        let header = match doc.doc_type() {
            Some(DocumentType::Entity) => format!(
                "[{} - {} in {}] ",
                doc.text("source").unwrap_or("Unknown"),
                title,
                doc.text("jurisdiction").unwrap_or("Unknown")
            ),
            Some(DocumentType::Officer) => format!(
                "[Individual: {} - {} from {}] ",
                title,
                doc.text("role").unwrap_or("Unknown"),
                doc.text("countries").unwrap_or("Unknown")
            ),
            Some(DocumentType::Investigation) => {
                format!("[Investigation: {}] ", doc.text("source").unwrap_or("Unknown"))
            }
            None => format!("[{}] ", title),
        };
        out.push_str(&header);
        out.push_str(&doc.content);
        out.push_str("\n\n");
    }
    out
}
