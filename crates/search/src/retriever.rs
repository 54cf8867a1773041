use crate::error::{Result, SearchError};
use crate::rerank::{authority_score, diversity_filter, rank};
use lexrag_corpus::{ChunkRecord, FolderRecord};
use lexrag_indexer::FolderStore;
use lexrag_vector_store::{AttributeFilter, Embedder, VectorIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Tuning knobs for the two-stage retrieval pipeline.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Folders fetched in the first stage.
    pub folder_top_k: usize,

    /// Folder contexts prepended to the chunk-stage query.
    pub enrichment_folders: usize,

    /// Chunk-stage over-fetch multiplier, leaving headroom for the
    /// diversity filter.
    pub overfetch_factor: usize,

    /// Maximum results kept per source document.
    pub max_per_doc: usize,

    /// Weight of the chunk's own similarity in the combined score.
    pub doc_weight: f32,

    /// Weight of the owning folder's first-stage similarity.
    pub folder_weight: f32,

    /// Weight of the authority score.
    pub authority_weight: f32,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            folder_top_k: 5,
            enrichment_folders: 3,
            overfetch_factor: 2,
            max_per_doc: 3,
            doc_weight: 0.7,
            folder_weight: 0.2,
            authority_weight: 0.1,
        }
    }
}

/// Caller-supplied result restrictions. Both fields optional and
/// conjoined.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Allow-list of folder ids; intersected with the first-stage
    /// candidates.
    pub folder_ids: Option<Vec<String>>,

    /// Exact legal category match.
    pub legal_category: Option<String>,
}

/// First-stage hit: a folder and its similarity to the raw query.
#[derive(Debug, Clone)]
pub struct FolderMatch {
    pub record: FolderRecord,
    pub similarity: f32,
}

/// Fully scored retrieval result.
#[derive(Debug, Clone, Serialize)]
pub struct RankedChunk {
    pub record: ChunkRecord,
    pub doc_similarity: f32,
    pub folder_similarity: f32,
    pub authority_score: f32,
    pub combined_score: f32,
}

/// Two-stage retriever over the folder and chunk indices.
///
/// Stage one finds the folders closest to the raw query; their ids
/// narrow the chunk search and their descriptions enrich the chunk-stage
/// query. Stage two ranks chunks by a weighted blend of chunk
/// similarity, owning-folder similarity and document authority.
///
/// Stateless across queries; all methods take `&self`.
pub struct HybridRetriever {
    folder_index: VectorIndex,
    chunk_index: VectorIndex,
    folder_store: FolderStore,
    embedder: Arc<dyn Embedder>,
    config: RetrieverConfig,
}

impl HybridRetriever {
    #[must_use]
    pub fn new(
        folder_index: VectorIndex,
        chunk_index: VectorIndex,
        folder_store: FolderStore,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self::with_config(
            folder_index,
            chunk_index,
            folder_store,
            embedder,
            RetrieverConfig::default(),
        )
    }

    #[must_use]
    pub fn with_config(
        folder_index: VectorIndex,
        chunk_index: VectorIndex,
        folder_store: FolderStore,
        embedder: Arc<dyn Embedder>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            folder_index,
            chunk_index,
            folder_store,
            embedder,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    #[must_use]
    pub fn folder_store(&self) -> &FolderStore {
        &self.folder_store
    }

    #[must_use]
    pub fn chunk_index(&self) -> &VectorIndex {
        &self.chunk_index
    }

    /// First stage: rank folders against the raw query.
    pub async fn search_folders(&self, query: &str, k: usize) -> Result<Vec<FolderMatch>> {
        let vector = self.embedder.embed(query).await?;
        let matches = self.folder_index.query(&vector, k, None)?;
        matches
            .into_iter()
            .map(|m| {
                Ok(FolderMatch {
                    record: FolderRecord::from_attributes(&m.attributes)?,
                    similarity: 1.0 - m.distance,
                })
            })
            .collect()
    }

    /// Full retrieval pipeline: folder stage, filter, query enrichment,
    /// chunk stage, re-rank, diversity cap, truncate.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<RankedChunk>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        log::debug!("Retrieve: query='{query}', top_k={top_k}");

        let folder_matches = self
            .search_folders(query, self.config.folder_top_k)
            .await?;
        log::debug!("Folder stage: {} candidates", folder_matches.len());

        let filter = chunk_filter(&folder_matches, filters);
        let enriched = enrich_query(query, &folder_matches, self.config.enrichment_folders);

        let vector = self.embedder.embed(&enriched).await?;
        let fetch = top_k.max(1) * self.config.overfetch_factor.max(1);
        let candidates = self.chunk_index.query(&vector, fetch, filter.as_ref())?;
        log::debug!("Chunk stage: {} candidates", candidates.len());

        let folder_similarity: HashMap<String, f32> = folder_matches
            .iter()
            .map(|m| (m.record.folder_id.clone(), m.similarity))
            .collect();

        let scored = candidates
            .into_iter()
            .map(|m| {
                let record = ChunkRecord::from_attributes(m.text, &m.attributes)?;
                let doc_similarity = 1.0 - m.distance;
                let folder_similarity = folder_similarity
                    .get(&record.folder_id)
                    .copied()
                    .unwrap_or(0.0);
                let authority_score = authority_score(&record);
                let combined_score = self.config.doc_weight * doc_similarity
                    + self.config.folder_weight * folder_similarity
                    + self.config.authority_weight * authority_score;
                Ok(RankedChunk {
                    record,
                    doc_similarity,
                    folder_similarity,
                    authority_score,
                    combined_score,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut results = diversity_filter(rank(scored), self.config.max_per_doc);
        results.truncate(top_k);
        log::info!("Retrieve completed: {} results", results.len());
        Ok(results)
    }
}

/// Chunk-stage filter from the first-stage folders and caller filters.
///
/// Folder ids are intersected with the allow-list; when that leaves
/// nothing, the folder clause is dropped so weak first-stage matches
/// never block chunk retrieval outright.
fn chunk_filter(
    folder_matches: &[FolderMatch],
    filters: &SearchFilters,
) -> Option<AttributeFilter> {
    let mut ids: Vec<String> = folder_matches
        .iter()
        .map(|m| m.record.folder_id.clone())
        .collect();
    if let Some(allow) = &filters.folder_ids {
        ids.retain(|id| allow.contains(id));
    }

    let mut filter = AttributeFilter::new();
    if ids.is_empty() {
        log::warn!("No folder candidates after filtering, searching all chunks");
    } else {
        filter = filter.is_in("folder_id", ids);
    }
    if let Some(category) = &filters.legal_category {
        filter = filter.eq("legal_category", category.as_str());
    }

    if filter.is_empty() {
        None
    } else {
        Some(filter)
    }
}

/// Prefix the query with the best folder contexts so the chunk-stage
/// embedding leans toward the right part of the corpus.
fn enrich_query(query: &str, folder_matches: &[FolderMatch], take: usize) -> String {
    if folder_matches.is_empty() {
        return query.to_string();
    }
    let contexts: Vec<String> = folder_matches
        .iter()
        .take(take)
        .map(|m| format!("{} - {}", m.record.legal_domain, m.record.description))
        .collect();
    format!("{}\n\n{query}", contexts.join(" | "))
}
