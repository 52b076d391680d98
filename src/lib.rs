//! Leakgraph
//!
//! Graph-augmented retrieval over offshore-leaks datasets.
//!
//! # Architecture
//!
//! Data flows leaf-first through five components:
//!
//! - [`loader`]: parses the entity, officer, address and relationship CSV
//!   files into typed records, with optional per-category row caps
//! - [`graph`]: builds a directed multigraph of typed nodes and attributed
//!   edges, dropping relationships whose endpoints were not loaded
//! - [`document`]: renders one document per node from its neighborhood, plus
//!   per-source investigation summaries
//! - [`vector`]: embeds documents and answers similarity queries
//! - [`retriever`]: runs the similarity search and enriches entity hits with
//!   live graph facts
//!
//! ## Example Usage
//!
//! ```rust
//! use leakgraph::embed::HashingEmbedder;
//! use leakgraph::graph::GraphBuilder;
//! use leakgraph::loader::{Dataset, LoadLimits};
//! use leakgraph::retriever::HybridRetriever;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let entities = "node_id,name,jurisdiction,sourceID\n1,ALPHA LTD,Samoa,Panama Papers\n";
//! let officers = "node_id,name,countries,sourceID\n2,JOHN SMITH,United Kingdom,Panama Papers\n";
//! let relationships = "node_id_start,node_id_end,rel_type,sourceID\n2,1,officer_of,Panama Papers\n";
//!
//! let dataset = Dataset::from_readers(
//!     Some(entities.as_bytes()),
//!     Some(officers.as_bytes()),
//!     None::<&[u8]>,
//!     Some(relationships.as_bytes()),
//!     &LoadLimits::default(),
//! );
//! let (graph, report) = GraphBuilder::new().build(&dataset);
//! assert_eq!(report.edges, 1);
//!
//! let retriever = HybridRetriever::new(graph, Arc::new(HashingEmbedder::new(256).unwrap()));
//! let results = retriever.retrieve("companies in Samoa", 2).await.unwrap();
//! assert!(results.len() <= 2);
//! # }
//! ```

pub mod config;
pub mod document;
pub mod embed;
pub mod graph;
pub mod loader;
pub mod retriever;
pub mod vector;

// Re-export main types for convenience
pub use config::{Config, ConfigError};
pub use document::{Document, DocumentSynthesizer, DocumentType, MetaValue, SynthesisConfig};
pub use embed::{Embedder, EmbedError, EmbeddingClient, EmbeddingConfig, HashingEmbedder};
pub use graph::{BuildReport, GraphBuilder, GraphError, GraphStatistics, GraphStore, NodeKind};
pub use loader::{Dataset, DatasetLoader, LoadError, LoadLimits};
pub use retriever::{
    format_context, HealthReport, HealthStatus, HybridRetriever, RetrievalConfig, RetrievalError,
    RetrievedDocument,
};
pub use vector::{IndexConfig, VectorError, VectorIndex};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
