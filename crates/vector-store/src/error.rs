use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Snapshot not found: {0}")]
    SnapshotMissing(String),

    #[error("Unsupported snapshot schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("Vector dimension mismatch: index holds {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Embedding error: {0}")]
    EmbeddingError(String),
}
