use crate::error::{IndexerError, Result};
use crate::extract::{FsExtractor, TextExtractor};
use crate::folder_store::FolderStore;
use crate::index_set::IndexSet;
use lexrag_corpus::{
    document_id, folder_id, ChunkRecord, FolderDescriptor, FolderRecord, META_FILE,
};
use lexrag_text_chunker::{token_estimate, SplitterConfig, TextSplitter};
use lexrag_vector_store::{Embedder, GetRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Outcome of [`CorpusIndexer::build_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Indices already held data and `force_rebuild` was off.
    LoadedExisting,
    /// A full walk-extract-embed pass ran.
    NewlyBuilt,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexReport {
    pub status: BuildStatus,
    pub folders_indexed: usize,
    pub chunks_indexed: usize,
}

/// Builds the folder and chunk indices from a corpus directory tree.
///
/// Indexing is a two-pass pipeline: a folder walk collects `meta.json`
/// descriptors into [`FolderRecord`]s, then a document pass extracts,
/// splits and embeds every file inside the cached folders. Per-folder
/// and per-file failures are logged and skipped so one bad document
/// cannot sink a build.
pub struct CorpusIndexer {
    root: PathBuf,
    indices: IndexSet,
    folders: FolderStore,
    embedder: Arc<dyn Embedder>,
    extractor: Box<dyn TextExtractor>,
    splitter: TextSplitter,
    snapshot_dir: Option<PathBuf>,
}

impl CorpusIndexer {
    pub fn new(
        root: impl Into<PathBuf>,
        indices: IndexSet,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(root.display().to_string()));
        }
        let splitter = TextSplitter::new(SplitterConfig::default())?;
        Ok(Self {
            root,
            indices,
            folders: FolderStore::new(),
            embedder,
            extractor: Box::new(FsExtractor),
            splitter,
            snapshot_dir: None,
        })
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Persist snapshots under `dir` after every successful build.
    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn indices(&self) -> &IndexSet {
        &self.indices
    }

    #[must_use]
    pub fn folder_store(&self) -> &FolderStore {
        &self.folders
    }

    /// Hand the built artifacts to a query engine.
    #[must_use]
    pub fn into_parts(self) -> (IndexSet, FolderStore, Arc<dyn Embedder>) {
        (self.indices, self.folders, self.embedder)
    }

    /// Walk every directory below the root and index those carrying a
    /// parseable `meta.json`. Returns the number of folders indexed.
    pub async fn index_folders(&mut self) -> Result<usize> {
        let mut indexed = 0;

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
        {
            let descriptor = match FolderDescriptor::load(entry.path()) {
                Ok(Some(descriptor)) => descriptor,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Skipping folder {}: {e}", entry.path().display());
                    continue;
                }
            };

            let record = folder_record(entry.path(), entry.depth(), descriptor);
            let vector = self.embedder.embed(&record.embedding_text()).await?;
            self.indices.folders.upsert(
                record.folder_id.clone(),
                vector,
                record.embedding_text(),
                record.to_attributes(),
            )?;
            log::info!(
                "Indexed folder '{}' ({} documents)",
                record.folder_name,
                record.total_documents
            );
            self.folders.insert(record);
            indexed += 1;
        }

        Ok(indexed)
    }

    /// Extract, split and embed every document inside the cached
    /// folders. Returns the number of chunks actually indexed.
    pub async fn index_documents(&mut self) -> Result<usize> {
        let folders: Vec<FolderRecord> = self.folders.iter().cloned().collect();
        let mut indexed = 0;

        for folder in &folders {
            let paths = match document_paths(Path::new(&folder.folder_path)) {
                Ok(paths) => paths,
                Err(e) => {
                    log::warn!("Skipping folder {}: {e}", folder.folder_path);
                    continue;
                }
            };
            for path in paths {
                let text = match self.extractor.extract(&path).await {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("Skipping document {}: {e}", path.display());
                        continue;
                    }
                };
                if text.trim().is_empty() {
                    log::debug!("No text in {}, skipping", path.display());
                    continue;
                }
                indexed += self.index_document(folder, &path, &text).await?;
            }
        }

        Ok(indexed)
    }

    async fn index_document(
        &mut self,
        folder: &FolderRecord,
        path: &Path,
        text: &str,
    ) -> Result<usize> {
        let chunks = self.splitter.split(text);
        let total_chunks = chunks.len();
        let document_id = document_id(path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_type = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("")
            .to_lowercase();

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .enumerate()
            .map(|(chunk_index, chunk)| ChunkRecord {
                document_id: document_id.clone(),
                folder_id: folder.folder_id.clone(),
                folder_name: folder.folder_name.clone(),
                file_name: file_name.clone(),
                file_type: file_type.clone(),
                chunk_index,
                total_chunks,
                chunk_length: chunk.chars().count(),
                token_count: token_estimate(&chunk),
                folder_summary: folder.description.clone(),
                legal_category: folder.legal_domain.clone(),
                folder_keywords: folder.keywords.clone(),
                status: Some("active".to_string()),
                effective_date: None,
                text: chunk,
            })
            .collect();

        let enhanced: Vec<String> = records.iter().map(ChunkRecord::enhanced_text).collect();
        let vectors = self.embedder.embed_batch(&enhanced).await?;

        for (record, vector) in records.into_iter().zip(vectors) {
            self.indices.chunks.upsert(
                record.id(),
                vector,
                record.text.clone(),
                record.to_attributes(),
            )?;
        }

        log::info!(
            "Indexed {} ({total_chunks} chunks)",
            path.display()
        );
        Ok(total_chunks)
    }

    /// Full build entry point.
    ///
    /// With data already cached and `force_rebuild` off this is a no-op
    /// reporting current counts; otherwise everything is cleared and
    /// rebuilt from disk, and snapshots are written when a snapshot
    /// directory is configured.
    pub async fn build_index(&mut self, force_rebuild: bool) -> Result<IndexReport> {
        if !force_rebuild && !self.folders.is_empty() {
            log::info!("Using existing index, skipping rebuild");
            return Ok(IndexReport {
                status: BuildStatus::LoadedExisting,
                folders_indexed: self.indices.folders.count(),
                chunks_indexed: self.indices.chunks.count(),
            });
        }

        self.folders.clear();
        self.indices.clear();

        let folders_indexed = self.index_folders().await?;
        let chunks_indexed = self.index_documents().await?;

        if let Some(dir) = self.snapshot_dir.clone() {
            self.indices.save(&dir).await?;
        }

        log::info!("Build complete: {folders_indexed} folders, {chunks_indexed} chunks");
        Ok(IndexReport {
            status: BuildStatus::NewlyBuilt,
            folders_indexed,
            chunks_indexed,
        })
    }

    #[must_use]
    pub fn has_existing_data(&self) -> bool {
        self.indices.has_existing_data()
    }

    /// Rebuild the folder cache from folder-index records, e.g. after
    /// opening snapshots from a previous build. Undecodable records are
    /// logged and skipped. Returns the number of folders cached.
    pub fn warm_cache(&mut self) -> usize {
        self.folders.clear();
        for stored in self.indices.folders.get(&GetRequest::default()) {
            match FolderRecord::from_attributes(&stored.attributes) {
                Ok(record) => self.folders.insert(record),
                Err(e) => log::warn!("Skipping cached folder record {}: {e}", stored.id),
            }
        }
        log::debug!("Warmed folder cache with {} records", self.folders.len());
        self.folders.len()
    }
}

fn folder_record(path: &Path, depth: usize, descriptor: FolderDescriptor) -> FolderRecord {
    FolderRecord {
        folder_id: folder_id(path),
        folder_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        folder_path: path.display().to_string(),
        description: descriptor.description,
        legal_domain: descriptor.legal_domain,
        total_documents: count_documents(path),
        last_updated: descriptor.last_updated,
        keywords: descriptor.keywords,
        hierarchy_level: depth as u32,
        parent_folder: descriptor.parent_folder,
    }
}

/// Regular files directly in `folder`, descriptor excluded, sorted by
/// name so chunk ids come out the same on every build.
fn document_paths(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| path.file_name().is_none_or(|n| n != META_FILE))
        .collect();
    paths.sort();
    Ok(paths)
}

fn count_documents(folder: &Path) -> usize {
    document_paths(folder).map(|paths| paths.len()).unwrap_or(0)
}
