use crate::assembler::{AssembledContext, ContextAssembler};
use crate::error::Result;
use crate::retriever::{HybridRetriever, RankedChunk, RetrieverConfig, SearchFilters};
use lexrag_corpus::{chunk_id, ChunkRecord, FolderRecord};
use lexrag_indexer::{FolderStore, IndexSet};
use lexrag_vector_store::{AttributeFilter, Embedder, GetRequest};
use serde::Serialize;
use std::sync::Arc;

/// Results fetched for question-answering context assembly.
const ANSWER_TOP_K: usize = 10;

/// Sample chunks returned by a folder overview.
const OVERVIEW_SAMPLES: usize = 5;

/// Leading characters of a chunk used as the related-documents query.
const RELATED_QUERY_CHARS: usize = 500;

/// Where a hit came from, formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub folder: String,
    pub file: String,
    /// One-based position, `"2/7"`.
    pub chunk_position: String,
}

/// Folder context attached to a hit.
#[derive(Debug, Clone, Serialize)]
pub struct FolderContext {
    pub legal_domain: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub record: ChunkRecord,
    pub relevance_score: f32,
    pub source: SourceRef,
    pub folder_context: Option<FolderContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderOverview {
    pub folder: FolderRecord,
    pub samples: Vec<ChunkRecord>,
    pub sampled: usize,
}

/// Public query surface: retrieval plus presentation.
///
/// Wraps the [`HybridRetriever`] and [`ContextAssembler`] behind the
/// operations a caller actually wants: formatted search, bounded
/// answer context, folder overviews and related-document lookups.
pub struct QueryEngine {
    retriever: HybridRetriever,
    assembler: ContextAssembler,
}

impl QueryEngine {
    #[must_use]
    pub fn new(indices: IndexSet, folders: FolderStore, embedder: Arc<dyn Embedder>) -> Self {
        Self::with_config(indices, folders, embedder, RetrieverConfig::default())
    }

    #[must_use]
    pub fn with_config(
        indices: IndexSet,
        folders: FolderStore,
        embedder: Arc<dyn Embedder>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            retriever: HybridRetriever::with_config(
                indices.folders,
                indices.chunks,
                folders,
                embedder,
                config,
            ),
            assembler: ContextAssembler::default(),
        }
    }

    #[must_use]
    pub fn retriever(&self) -> &HybridRetriever {
        &self.retriever
    }

    /// Retrieve and format the best chunks for `query`.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: &SearchFilters,
    ) -> Result<SearchResponse> {
        let results = self.retriever.retrieve(query, top_k, filters).await?;
        let hits = results.into_iter().map(|r| self.hit(r)).collect();
        Ok(SearchResponse {
            query: query.to_string(),
            hits,
        })
    }

    /// Bounded context for answering `question`. `budget` in characters,
    /// defaulting to the assembler's standard budget.
    pub async fn answer_context(
        &self,
        question: &str,
        budget: Option<usize>,
    ) -> Result<AssembledContext> {
        let results = self
            .retriever
            .retrieve(question, ANSWER_TOP_K, &SearchFilters::default())
            .await?;
        let assembler = match budget {
            Some(budget) => ContextAssembler::new(budget),
            None => self.assembler.clone(),
        };
        Ok(assembler.assemble(&results))
    }

    /// Folder record plus a few sample chunks. Unknown ids are `None`.
    pub fn folder_overview(&self, folder_id: &str) -> Result<Option<FolderOverview>> {
        let Some(folder) = self.retriever.folder_store().get(folder_id) else {
            return Ok(None);
        };

        let stored = self.retriever.chunk_index().get(&GetRequest {
            filter: Some(AttributeFilter::new().eq("folder_id", folder_id)),
            limit: Some(OVERVIEW_SAMPLES),
            ..GetRequest::default()
        });
        let samples = stored
            .into_iter()
            .map(|record| ChunkRecord::from_attributes(record.text, &record.attributes))
            .collect::<lexrag_corpus::Result<Vec<_>>>()?;

        Ok(Some(FolderOverview {
            folder: folder.clone(),
            sampled: samples.len(),
            samples,
        }))
    }

    /// Chunks similar to the given document, excluding the document
    /// itself. An unknown document id yields an empty list.
    pub async fn related_documents(
        &self,
        document_id: &str,
        top_k: usize,
    ) -> Result<Vec<RankedChunk>> {
        let stored = self.retriever.chunk_index().get(&GetRequest {
            ids: Some(vec![chunk_id(document_id, 0)]),
            ..GetRequest::default()
        });
        let Some(first_chunk) = stored.into_iter().next() else {
            log::debug!("No chunks stored for document {document_id}");
            return Ok(Vec::new());
        };

        let query: String = first_chunk.text.chars().take(RELATED_QUERY_CHARS).collect();
        let results = self
            .retriever
            .retrieve(&query, top_k + self.retriever.config().max_per_doc, &SearchFilters::default())
            .await?;

        let mut related: Vec<RankedChunk> = results
            .into_iter()
            .filter(|r| r.record.document_id != document_id)
            .collect();
        related.truncate(top_k);
        Ok(related)
    }

    fn hit(&self, result: RankedChunk) -> SearchHit {
        let folder_context = self
            .retriever
            .folder_store()
            .get(&result.record.folder_id)
            .map(|folder| FolderContext {
                legal_domain: folder.legal_domain.clone(),
                description: folder.description.clone(),
            });
        SearchHit {
            content: result.record.text.clone(),
            source: SourceRef {
                folder: result.record.folder_name.clone(),
                file: result.record.file_name.clone(),
                chunk_position: format!(
                    "{}/{}",
                    result.record.chunk_index + 1,
                    result.record.total_chunks
                ),
            },
            relevance_score: result.combined_score,
            folder_context,
            record: result.record,
        }
    }
}
