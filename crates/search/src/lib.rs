//! # LexRAG Search
//!
//! Two-stage retrieval over the folder and chunk indices, with re-ranking,
//! per-document diversity and bounded context assembly.
//!
//! ## Pipeline
//!
//! ```text
//! query
//!   │
//!   ├─> folder index ──> top folders ──┬─> folder_id filter
//!   │                                  └─> query enrichment
//!   │                                            │
//!   └────────────────────────────────────────────┴─> chunk index
//!                                                        │
//!                re-rank (doc + folder + authority) <────┘
//!                        │
//!                diversity cap ──> top-k ──> context assembly
//! ```

mod assembler;
mod engine;
mod error;
mod rerank;
mod retriever;

pub use assembler::{
    AssembledContext, ContextAssembler, ContextBlock, DEFAULT_CONTEXT_BUDGET,
};
pub use engine::{
    FolderContext, FolderOverview, QueryEngine, SearchHit, SearchResponse, SourceRef,
};
pub use error::{Result, SearchError};
pub use rerank::authority_score;
pub use retriever::{
    FolderMatch, HybridRetriever, RankedChunk, RetrieverConfig, SearchFilters,
};
