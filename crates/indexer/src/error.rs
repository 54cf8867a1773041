use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corpus error: {0}")]
    CorpusError(#[from] lexrag_corpus::CorpusError),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] lexrag_text_chunker::ChunkerError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] lexrag_vector_store::VectorStoreError),

    #[error("Invalid corpus path: {0}")]
    InvalidPath(String),

    #[error("Extraction failed for {path}: {reason}")]
    ExtractionFailed { path: String, reason: String },
}
