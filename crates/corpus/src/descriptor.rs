use crate::error::{CorpusError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the per-folder metadata descriptor file.
pub const META_FILE: &str = "meta.json";

/// On-disk folder metadata, one `meta.json` per topic folder.
///
/// ```json
/// {
///   "description": "Văn bản về thuế giá trị gia tăng",
///   "legal_domain": "VAT",
///   "keywords": ["thuế", "GTGT"],
///   "last_updated": "2024-11-02"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FolderDescriptor {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub legal_domain: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub last_updated: String,

    #[serde(default)]
    pub parent_folder: Option<String>,
}

impl FolderDescriptor {
    /// Load the descriptor from `folder/meta.json`.
    ///
    /// A folder without a descriptor is not part of the indexed corpus
    /// and not an error, so the absent case is `Ok(None)`.
    /// A present but unparseable descriptor is a typed error.
    pub fn load(folder: &Path) -> Result<Option<Self>> {
        let path = folder.join(META_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        let descriptor =
            serde_json::from_str(&json).map_err(|source| CorpusError::InvalidDescriptor {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Some(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_descriptor_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(FolderDescriptor::load(temp.path()).unwrap(), None);
    }

    #[test]
    fn loads_full_descriptor() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(META_FILE),
            r#"{
                "description": "Quy định về thuế GTGT",
                "legal_domain": "VAT",
                "keywords": ["thuế", "GTGT", "hoá đơn"],
                "last_updated": "2024-11-02",
                "parent_folder": "Tax"
            }"#,
        )
        .unwrap();

        let descriptor = FolderDescriptor::load(temp.path()).unwrap().unwrap();
        assert_eq!(descriptor.legal_domain, "VAT");
        assert_eq!(descriptor.keywords.len(), 3);
        assert_eq!(descriptor.parent_folder.as_deref(), Some("Tax"));
    }

    #[test]
    fn missing_fields_default() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(META_FILE), r#"{"description": "x"}"#).unwrap();

        let descriptor = FolderDescriptor::load(temp.path()).unwrap().unwrap();
        assert_eq!(descriptor.description, "x");
        assert!(descriptor.keywords.is_empty());
        assert_eq!(descriptor.parent_folder, None);
    }

    #[test]
    fn corrupt_descriptor_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(META_FILE), "{broken").unwrap();
        assert!(matches!(
            FolderDescriptor::load(temp.path()),
            Err(CorpusError::InvalidDescriptor { .. })
        ));
    }
}
