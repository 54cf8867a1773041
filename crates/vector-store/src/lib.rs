//! # LexRAG Vector Store
//!
//! In-memory nearest-neighbor index over `(id, vector, text, attributes)`
//! tuples with cosine distance, scalar attribute filters, and JSON
//! snapshot persistence. Two instances back the retrieval engine: one for
//! folder-level embeddings and one for document chunks.
//!
//! Also hosts the [`Embedder`] seam. The same embedder must serve both
//! indexing and query time; mixing models silently degrades recall.

mod attributes;
mod embedder;
mod error;
mod store;

pub use attributes::{AttributeFilter, AttributeMap, AttributeValue};
pub use embedder::{Embedder, HashingEmbedder};
pub use error::{Result, VectorStoreError};
pub use store::{GetRequest, QueryMatch, StoredRecord, VectorIndex, SNAPSHOT_SCHEMA_VERSION};
