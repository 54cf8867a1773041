use crate::error::Result;
use lexrag_vector_store::{VectorIndex, VectorStoreError};
use std::path::Path;

pub const FOLDER_SNAPSHOT: &str = "folders.json";
pub const CHUNK_SNAPSHOT: &str = "chunks.json";

/// The two coupled indices a corpus build produces: one over folder
/// summaries, one over document chunks. They always persist and load
/// together so a snapshot directory is either complete or absent.
#[derive(Debug)]
pub struct IndexSet {
    pub folders: VectorIndex,
    pub chunks: VectorIndex,
}

impl IndexSet {
    /// Fresh, empty pair.
    #[must_use]
    pub fn create() -> Self {
        Self {
            folders: VectorIndex::new("legal_folders"),
            chunks: VectorIndex::new("legal_chunks"),
        }
    }

    /// Load both indices from `dir`. A missing snapshot file yields an
    /// empty index in its place; an unreadable one is an error.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            folders: open_one(dir.join(FOLDER_SNAPSHOT), "legal_folders").await?,
            chunks: open_one(dir.join(CHUNK_SNAPSHOT), "legal_chunks").await?,
        })
    }

    /// Write both snapshots under `dir`.
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        self.folders.save(dir.join(FOLDER_SNAPSHOT)).await?;
        self.chunks.save(dir.join(CHUNK_SNAPSHOT)).await?;
        Ok(())
    }

    /// True when a previous build left data in both indices.
    #[must_use]
    pub fn has_existing_data(&self) -> bool {
        !self.folders.is_empty() && !self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.folders.clear();
        self.chunks.clear();
    }
}

async fn open_one(path: std::path::PathBuf, name: &str) -> Result<VectorIndex> {
    match VectorIndex::load(&path).await {
        Ok(index) => Ok(index),
        Err(VectorStoreError::SnapshotMissing(_)) => {
            log::debug!("No snapshot at {}, starting empty", path.display());
            Ok(VectorIndex::new(name))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrag_vector_store::AttributeMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_and_open_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut set = IndexSet::create();
        set.folders
            .upsert("f1", vec![1.0, 0.0], "tax folder", AttributeMap::new())
            .unwrap();
        set.chunks
            .upsert("c1", vec![0.0, 1.0], "chunk text", AttributeMap::new())
            .unwrap();
        set.save(temp.path()).await.unwrap();

        let reopened = IndexSet::open(temp.path()).await.unwrap();
        assert_eq!(reopened.folders.count(), 1);
        assert_eq!(reopened.chunks.count(), 1);
        assert!(reopened.has_existing_data());
    }

    #[tokio::test]
    async fn missing_snapshots_open_empty() {
        let temp = TempDir::new().unwrap();
        let set = IndexSet::open(temp.path()).await.unwrap();
        assert!(set.folders.is_empty());
        assert!(set.chunks.is_empty());
        assert!(!set.has_existing_data());
    }

    #[tokio::test]
    async fn one_populated_index_is_not_existing_data() {
        let mut set = IndexSet::create();
        set.folders
            .upsert("f1", vec![1.0], "only folders", AttributeMap::new())
            .unwrap();
        assert!(!set.has_existing_data());
    }
}
