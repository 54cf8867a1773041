use crate::error::{CorpusError, Result};
use lexrag_vector_store::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Separator used when flattening keyword lists into one scalar
/// attribute, and when parsing them back.
const KEYWORD_SEPARATOR: &str = ", ";

/// Stable content-addressed folder id derived from the folder path.
/// Re-indexing the same path yields the same id.
#[must_use]
pub fn folder_id(path: &Path) -> String {
    blake3::hash(path.to_string_lossy().as_bytes())
        .to_hex()
        .to_string()
}

/// Stable content-addressed document id derived from the file path.
#[must_use]
pub fn document_id(path: &Path) -> String {
    blake3::hash(path.to_string_lossy().as_bytes())
        .to_hex()
        .to_string()
}

/// Chunk id: `{document_id}_chunk_{index}`.
#[must_use]
pub fn chunk_id(document_id: &str, index: usize) -> String {
    format!("{document_id}_chunk_{index}")
}

/// Flatten a keyword list to the scalar the vector store can hold.
#[must_use]
pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(KEYWORD_SEPARATOR)
}

/// Parse a flattened keyword scalar back into a list. Blank input and
/// blank entries disappear.
#[must_use]
pub fn split_keywords(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Folder-level record stored in the folder index and cached in the
/// folder store for the process lifetime. Never mutated after creation;
/// a full rebuild replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub folder_id: String,
    pub folder_name: String,
    pub folder_path: String,
    pub description: String,
    pub legal_domain: String,
    pub total_documents: usize,
    pub last_updated: String,
    pub keywords: Vec<String>,
    /// Distance from the corpus root; always at least 1 for an indexed
    /// folder since the root itself is skipped.
    pub hierarchy_level: u32,
    pub parent_folder: Option<String>,
}

impl FolderRecord {
    /// Text embedded for folder-level semantic search.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.description, self.keywords.join(" "))
    }

    /// Encode for storage. List values flatten, `None` becomes empty.
    #[must_use]
    pub fn to_attributes(&self) -> AttributeMap {
        let mut map = AttributeMap::new();
        map.insert("folder_id".into(), self.folder_id.as_str().into());
        map.insert("folder_name".into(), self.folder_name.as_str().into());
        map.insert("folder_path".into(), self.folder_path.as_str().into());
        map.insert("description".into(), self.description.as_str().into());
        map.insert("legal_domain".into(), self.legal_domain.as_str().into());
        map.insert(
            "total_documents".into(),
            AttributeValue::Int(self.total_documents as i64),
        );
        map.insert("last_updated".into(), self.last_updated.as_str().into());
        map.insert("keywords".into(), join_keywords(&self.keywords).into());
        map.insert(
            "hierarchy_level".into(),
            AttributeValue::Int(i64::from(self.hierarchy_level)),
        );
        map.insert(
            "parent_folder".into(),
            self.parent_folder.clone().unwrap_or_default().into(),
        );
        map
    }

    /// Decode a stored attribute map back into a typed record.
    pub fn from_attributes(attributes: &AttributeMap) -> Result<Self> {
        const RECORD: &str = "folder";
        Ok(Self {
            folder_id: require_str(RECORD, attributes, "folder_id")?,
            folder_name: require_str(RECORD, attributes, "folder_name")?,
            folder_path: require_str(RECORD, attributes, "folder_path")?,
            description: require_str(RECORD, attributes, "description")?,
            legal_domain: require_str(RECORD, attributes, "legal_domain")?,
            total_documents: require_count(RECORD, attributes, "total_documents")?,
            last_updated: require_str(RECORD, attributes, "last_updated")?,
            keywords: split_keywords(&require_str(RECORD, attributes, "keywords")?),
            hierarchy_level: require_count(RECORD, attributes, "hierarchy_level")? as u32,
            parent_folder: optional(require_str(RECORD, attributes, "parent_folder")?),
        })
    }
}

/// One embedded passage of a source document, denormalized with its
/// folder context so ranking needs no join at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub document_id: String,
    pub folder_id: String,
    pub folder_name: String,
    pub file_name: String,
    pub file_type: String,
    pub text: String,
    /// Zero-based, contiguous within a document.
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub chunk_length: usize,
    pub token_count: usize,
    /// Denormalized copy of the owning folder's description.
    pub folder_summary: String,
    /// Denormalized copy of the owning folder's legal domain.
    pub legal_category: String,
    pub folder_keywords: Vec<String>,
    pub status: Option<String>,
    pub effective_date: Option<String>,
}

impl ChunkRecord {
    /// Id under which this chunk is stored.
    #[must_use]
    pub fn id(&self) -> String {
        chunk_id(&self.document_id, self.chunk_index)
    }

    /// Text embedded for chunk-level search: legal category, folder
    /// description and keywords ahead of the chunk's own text, each on
    /// its own line, biasing similarity toward topical context.
    #[must_use]
    pub fn enhanced_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n\n{}",
            self.legal_category,
            self.folder_summary,
            self.folder_keywords.join(" "),
            self.text
        )
    }

    /// Human-readable source tag, `folder/file`.
    #[must_use]
    pub fn source(&self) -> String {
        format!("{}/{}", self.folder_name, self.file_name)
    }

    /// Encode for storage; the chunk text itself is stored as the
    /// record's document text, not as an attribute.
    #[must_use]
    pub fn to_attributes(&self) -> AttributeMap {
        let mut map = AttributeMap::new();
        map.insert("document_id".into(), self.document_id.as_str().into());
        map.insert("folder_id".into(), self.folder_id.as_str().into());
        map.insert("folder_name".into(), self.folder_name.as_str().into());
        map.insert("file_name".into(), self.file_name.as_str().into());
        map.insert("file_type".into(), self.file_type.as_str().into());
        map.insert(
            "chunk_index".into(),
            AttributeValue::Int(self.chunk_index as i64),
        );
        map.insert(
            "total_chunks".into(),
            AttributeValue::Int(self.total_chunks as i64),
        );
        map.insert(
            "chunk_length".into(),
            AttributeValue::Int(self.chunk_length as i64),
        );
        map.insert(
            "token_count".into(),
            AttributeValue::Int(self.token_count as i64),
        );
        map.insert("folder_summary".into(), self.folder_summary.as_str().into());
        map.insert("legal_category".into(), self.legal_category.as_str().into());
        map.insert(
            "folder_keywords".into(),
            join_keywords(&self.folder_keywords).into(),
        );
        map.insert(
            "status".into(),
            self.status.clone().unwrap_or_default().into(),
        );
        map.insert(
            "effective_date".into(),
            self.effective_date.clone().unwrap_or_default().into(),
        );
        map
    }

    /// Decode a stored chunk. `text` comes from the record body.
    pub fn from_attributes(text: impl Into<String>, attributes: &AttributeMap) -> Result<Self> {
        const RECORD: &str = "chunk";
        Ok(Self {
            document_id: require_str(RECORD, attributes, "document_id")?,
            folder_id: require_str(RECORD, attributes, "folder_id")?,
            folder_name: require_str(RECORD, attributes, "folder_name")?,
            file_name: require_str(RECORD, attributes, "file_name")?,
            file_type: require_str(RECORD, attributes, "file_type")?,
            text: text.into(),
            chunk_index: require_count(RECORD, attributes, "chunk_index")?,
            total_chunks: require_count(RECORD, attributes, "total_chunks")?,
            chunk_length: require_count(RECORD, attributes, "chunk_length")?,
            token_count: require_count(RECORD, attributes, "token_count")?,
            folder_summary: require_str(RECORD, attributes, "folder_summary")?,
            legal_category: require_str(RECORD, attributes, "legal_category")?,
            folder_keywords: split_keywords(&require_str(RECORD, attributes, "folder_keywords")?),
            status: optional(require_str(RECORD, attributes, "status")?),
            effective_date: optional(require_str(RECORD, attributes, "effective_date")?),
        })
    }
}

fn require_str(record: &'static str, map: &AttributeMap, key: &str) -> Result<String> {
    let value = map.get(key).ok_or_else(|| CorpusError::MissingAttribute {
        record,
        key: key.to_string(),
    })?;
    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| CorpusError::InvalidAttribute {
            record,
            key: key.to_string(),
        })
}

fn require_count(record: &'static str, map: &AttributeMap, key: &str) -> Result<usize> {
    let value = map.get(key).ok_or_else(|| CorpusError::MissingAttribute {
        record,
        key: key.to_string(),
    })?;
    value
        .as_i64()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| CorpusError::InvalidAttribute {
            record,
            key: key.to_string(),
        })
}

/// Empty strings round-trip back to `None` at the decode boundary.
fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn folder_record() -> FolderRecord {
        FolderRecord {
            folder_id: folder_id(&PathBuf::from("/corpus/Tax")),
            folder_name: "Tax".to_string(),
            folder_path: "/corpus/Tax".to_string(),
            description: "Văn bản thuế GTGT".to_string(),
            legal_domain: "VAT".to_string(),
            total_documents: 4,
            last_updated: "2024-11-02".to_string(),
            keywords: vec!["thuế".to_string(), "GTGT".to_string()],
            hierarchy_level: 1,
            parent_folder: None,
        }
    }

    fn chunk_record() -> ChunkRecord {
        ChunkRecord {
            document_id: document_id(&PathBuf::from("/corpus/Tax/law-01.txt")),
            folder_id: folder_record().folder_id,
            folder_name: "Tax".to_string(),
            file_name: "law-01.txt".to_string(),
            file_type: "txt".to_string(),
            text: "Điều 1. Thuế suất 10%.".to_string(),
            chunk_index: 0,
            total_chunks: 2,
            chunk_length: 22,
            token_count: 6,
            folder_summary: "Văn bản thuế GTGT".to_string(),
            legal_category: "VAT".to_string(),
            folder_keywords: vec!["thuế".to_string(), "GTGT".to_string()],
            status: Some("active".to_string()),
            effective_date: None,
        }
    }

    #[test]
    fn ids_are_deterministic_and_distinct() {
        let a = folder_id(&PathBuf::from("/corpus/Tax"));
        let b = folder_id(&PathBuf::from("/corpus/Tax"));
        let c = folder_id(&PathBuf::from("/corpus/Labor"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(chunk_id("doc", 3), "doc_chunk_3");
    }

    #[test]
    fn folder_record_round_trips() {
        let record = folder_record();
        let decoded = FolderRecord::from_attributes(&record.to_attributes()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn chunk_record_round_trips() {
        let record = chunk_record();
        let attributes = record.to_attributes();
        let decoded = ChunkRecord::from_attributes(record.text.clone(), &attributes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn keywords_flatten_to_scalar() {
        let attributes = chunk_record().to_attributes();
        assert_eq!(
            attributes.get("folder_keywords").unwrap().as_str(),
            Some("thuế, GTGT")
        );
        assert_eq!(
            split_keywords("thuế, GTGT, , hoá đơn"),
            vec!["thuế", "GTGT", "hoá đơn"]
        );
    }

    #[test]
    fn absent_optionals_store_as_empty() {
        let attributes = chunk_record().to_attributes();
        assert_eq!(attributes.get("effective_date").unwrap().as_str(), Some(""));
        let decoded = ChunkRecord::from_attributes("x", &attributes).unwrap();
        assert_eq!(decoded.effective_date, None);
        assert_eq!(decoded.status.as_deref(), Some("active"));
    }

    #[test]
    fn missing_attribute_is_a_typed_error() {
        let mut attributes = chunk_record().to_attributes();
        attributes.remove("document_id");
        assert!(matches!(
            ChunkRecord::from_attributes("x", &attributes),
            Err(CorpusError::MissingAttribute { key, .. }) if key == "document_id"
        ));
    }

    #[test]
    fn enhanced_text_orders_context_before_content() {
        let text = chunk_record().enhanced_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "VAT");
        assert_eq!(lines[1], "Văn bản thuế GTGT");
        assert_eq!(lines[2], "thuế GTGT");
        assert_eq!(lines[3], "");
        assert!(lines[4].starts_with("Điều 1."));
    }

    #[test]
    fn source_is_folder_slash_file() {
        assert_eq!(chunk_record().source(), "Tax/law-01.txt");
    }
}
