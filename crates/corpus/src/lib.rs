//! # LexRAG Corpus Model
//!
//! Data model for the hierarchical legal corpus: folder records built
//! from on-disk `meta.json` descriptors, document chunk records, and the
//! content-addressed ids tying them together.
//!
//! This crate also owns the single serialization boundary between typed
//! records and the vector store's scalar attribute maps. Keyword lists
//! flatten to one `", "`-joined scalar and absent optionals store as
//! empty strings; decoding a map with a missing key is a typed error.

mod descriptor;
mod error;
mod records;

pub use descriptor::{FolderDescriptor, META_FILE};
pub use error::{CorpusError, Result};
pub use records::{
    chunk_id, document_id, folder_id, join_keywords, split_keywords, ChunkRecord, FolderRecord,
};
