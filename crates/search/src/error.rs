use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] lexrag_vector_store::VectorStoreError),

    #[error("Corpus error: {0}")]
    CorpusError(#[from] lexrag_corpus::CorpusError),
}
