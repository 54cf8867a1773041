use lexrag_corpus::FolderRecord;
use std::collections::BTreeMap;

/// Owned, injectable cache of folder records keyed by folder id.
///
/// Populated once per build (or warmed from a loaded folder index) and
/// read-only at query time. Ordered by id so indexing passes iterate
/// deterministically.
#[derive(Debug, Default, Clone)]
pub struct FolderStore {
    records: BTreeMap<String, FolderRecord>,
}

impl FolderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: FolderRecord) {
        self.records.insert(record.folder_id.clone(), record);
    }

    #[must_use]
    pub fn get(&self, folder_id: &str) -> Option<&FolderRecord> {
        self.records.get(folder_id)
    }

    #[must_use]
    pub fn contains(&self, folder_id: &str) -> bool {
        self.records.contains_key(folder_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FolderRecord> {
        self.records.values()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
