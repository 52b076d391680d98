//! Vector search over synthesized documents
//!
//! This module embeds documents and supports nearest-neighbor similarity
//! search, using an exact scan backed by HNSW for large indices.

pub mod index;

pub use index::{
    CosineDistance, IndexConfig, IndexEntry, SearchHit, VectorError, VectorIndex, VectorResult,
};
