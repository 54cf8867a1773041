use crate::attributes::{AttributeFilter, AttributeMap};
use crate::error::{Result, VectorStoreError};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// A stored tuple without its vector, as returned by [`VectorIndex::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub text: String,
    pub attributes: AttributeMap,
}

/// A nearest-neighbor hit. `distance` is cosine distance in `[0, 2]`;
/// callers derive similarity as `1 - distance`.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub id: String,
    pub text: String,
    pub attributes: AttributeMap,
    pub distance: f32,
}

/// Lookup request for [`VectorIndex::get`]. All fields optional; `ids`
/// and `filter` are conjoined, `limit` truncates the result.
#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    pub ids: Option<Vec<String>>,
    pub filter: Option<AttributeFilter>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordEntry {
    vector: Vec<f32>,
    text: String,
    attributes: AttributeMap,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    schema_version: u32,
    name: String,
    dimensions: Option<usize>,
    records: BTreeMap<String, RecordEntry>,
}

/// In-memory cosine nearest-neighbor index with JSON snapshot
/// persistence.
///
/// Reads (`query`, `get`, `count`) take `&self` and are safe to run
/// concurrently; writes (`upsert`, `clear`) take `&mut self`, so builds
/// and queries cannot interleave within one process.
#[derive(Debug)]
pub struct VectorIndex {
    name: String,
    dimensions: Option<usize>,
    records: BTreeMap<String, RecordEntry>,
}

impl VectorIndex {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: None,
            records: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace the tuple stored under `id`.
    ///
    /// The first upsert fixes the index dimension; later vectors must
    /// match it.
    pub fn upsert(
        &mut self,
        id: impl Into<String>,
        vector: Vec<f32>,
        text: impl Into<String>,
        attributes: AttributeMap,
    ) -> Result<()> {
        self.check_dimensions(vector.len())?;
        self.dimensions.get_or_insert(vector.len());
        self.records.insert(
            id.into(),
            RecordEntry {
                vector,
                text: text.into(),
                attributes,
            },
        );
        Ok(())
    }

    /// Rank all records matching `filter` by cosine distance to `vector`
    /// and return the closest `k`. An empty index yields an empty list.
    pub fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&AttributeFilter>,
    ) -> Result<Vec<QueryMatch>> {
        if self.records.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dimensions(vector.len())?;

        let mut matches: Vec<QueryMatch> = self
            .records
            .iter()
            .filter(|(_, entry)| filter.is_none_or(|f| f.matches(&entry.attributes)))
            .map(|(id, entry)| QueryMatch {
                id: id.clone(),
                text: entry.text.clone(),
                attributes: entry.attributes.clone(),
                distance: cosine_distance(vector, &entry.vector),
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }

    /// Direct lookup by ids and/or attribute filter, vector-free.
    #[must_use]
    pub fn get(&self, request: &GetRequest) -> Vec<StoredRecord> {
        let mut records: Vec<StoredRecord> = match &request.ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| {
                    self.records.get(id).map(|entry| (id.clone(), entry))
                })
                .filter(|(_, entry)| {
                    request
                        .filter
                        .as_ref()
                        .is_none_or(|f| f.matches(&entry.attributes))
                })
                .map(|(id, entry)| StoredRecord {
                    id,
                    text: entry.text.clone(),
                    attributes: entry.attributes.clone(),
                })
                .collect(),
            None => self
                .records
                .iter()
                .filter(|(_, entry)| {
                    request
                        .filter
                        .as_ref()
                        .is_none_or(|f| f.matches(&entry.attributes))
                })
                .map(|(id, entry)| StoredRecord {
                    id: id.clone(),
                    text: entry.text.clone(),
                    attributes: entry.attributes.clone(),
                })
                .collect(),
        };

        if let Some(limit) = request.limit {
            records.truncate(limit);
        }
        records
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.dimensions = None;
    }

    /// Write a JSON snapshot of the full index.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = Snapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            name: self.name.clone(),
            dimensions: self.dimensions,
            records: self.records.clone(),
        };
        let json = serde_json::to_string(&snapshot)?;
        if let Some(parent) = path.as_ref().parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path.as_ref(), json).await?;
        log::debug!(
            "Saved index '{}' ({} records) to {}",
            self.name,
            self.records.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Load a snapshot. A missing file is a typed error so callers can
    /// tell "no data yet" apart from "snapshot unreadable".
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VectorStoreError::SnapshotMissing(
                path.display().to_string(),
            ));
        }
        let json = tokio::fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(VectorStoreError::SchemaVersion {
                found: snapshot.schema_version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        log::info!(
            "Loaded index '{}' with {} records",
            snapshot.name,
            snapshot.records.len()
        );
        Ok(Self {
            name: snapshot.name,
            dimensions: snapshot.dimensions,
            records: snapshot.records,
        })
    }

    fn check_dimensions(&self, found: usize) -> Result<()> {
        match self.dimensions {
            Some(expected) if expected != found => {
                Err(VectorStoreError::DimensionMismatch { expected, found })
            }
            _ => Ok(()),
        }
    }
}

/// Cosine distance in `[0, 2]`; zero vectors are maximally distant from
/// everything.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let similarity = (a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0);
    1.0 - similarity
}
