//! # LexRAG Indexer
//!
//! Builds the two-level retrieval index from a corpus directory.
//!
//! ## Pipeline
//!
//! ```text
//! Corpus root
//!     │
//!     ├──> Folder walk (meta.json descriptors)
//!     │      └─> Folder records + folder index
//!     │
//!     └──> Document pass (extract → split → embed)
//!            └─> Chunk records + chunk index
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lexrag_indexer::{CorpusIndexer, IndexSet};
//! use lexrag_vector_store::HashingEmbedder;
//!
//! #[tokio::main]
//! async fn main() -> lexrag_indexer::Result<()> {
//!     let embedder = Arc::new(HashingEmbedder::default());
//!     let mut indexer =
//!         CorpusIndexer::new("/path/to/corpus", IndexSet::create(), embedder)?;
//!     let report = indexer.build_index(false).await?;
//!
//!     println!(
//!         "Indexed {} folders, {} chunks",
//!         report.folders_indexed, report.chunks_indexed
//!     );
//!     Ok(())
//! }
//! ```

mod error;
mod extract;
mod folder_store;
mod index_set;
mod indexer;

pub use error::{IndexerError, Result};
pub use extract::{FsExtractor, TextExtractor};
pub use folder_store::FolderStore;
pub use index_set::{IndexSet, CHUNK_SNAPSHOT, FOLDER_SNAPSHOT};
pub use indexer::{BuildStatus, CorpusIndexer, IndexReport};
