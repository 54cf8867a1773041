use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid folder descriptor {path}: {source}")]
    InvalidDescriptor {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Attribute '{key}' missing from stored {record} record")]
    MissingAttribute { record: &'static str, key: String },

    #[error("Attribute '{key}' has unexpected type in stored {record} record")]
    InvalidAttribute { record: &'static str, key: String },
}
