//! # LexRAG Text Chunker
//!
//! Splits extracted document text into overlapping windows before
//! embedding. Splitting prefers structural boundaries (paragraphs, then
//! lines, then sentence punctuation) and only falls back to hard
//! character cuts when no boundary fits the window.
//!
//! ## Example
//!
//! ```
//! use lexrag_text_chunker::{SplitterConfig, TextSplitter};
//!
//! let splitter = TextSplitter::new(SplitterConfig::default()).unwrap();
//! let chunks = splitter.split("First paragraph.\n\nSecond paragraph.");
//! assert_eq!(chunks.len(), 1);
//! ```

mod error;
mod splitter;

pub use error::{ChunkerError, Result};
pub use splitter::{token_estimate, SplitterConfig, TextSplitter};
