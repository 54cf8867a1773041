use crate::error::{IndexerError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Text extraction seam. Heterogeneous file formats live behind this
/// trait; the indexer only ever sees plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of `path`. Unsupported files yield an empty
    /// string (the indexer skips them); unreadable files are errors.
    async fn extract(&self, path: &Path) -> Result<String>;
}

/// Filesystem extractor: UTF-8 reads for `.txt`/`.md`, `pdf-extract`
/// for `.pdf`. Editor temp and office lock files are skipped outright.
#[derive(Debug, Default)]
pub struct FsExtractor;

#[async_trait]
impl TextExtractor for FsExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if file_name.starts_with("~$") || file_name.starts_with("._") {
            log::debug!("Skipping temp/hidden file: {}", path.display());
            return Ok(String::new());
        }

        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" | "md" => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| IndexerError::ExtractionFailed {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })
            }
            "pdf" => pdf_extract::extract_text(path).map_err(|e| {
                IndexerError::ExtractionFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }),
            _ => {
                log::debug!(
                    "Skipping unsupported extension '.{extension}': {}",
                    path.display()
                );
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_plain_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("law.txt");
        tokio::fs::write(&path, "Điều 1. Nội dung.").await.unwrap();

        let text = FsExtractor.extract(&path).await.unwrap();
        assert_eq!(text, "Điều 1. Nội dung.");
    }

    #[tokio::test]
    async fn unsupported_extension_yields_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scan.docx");
        tokio::fs::write(&path, b"binary").await.unwrap();

        assert!(FsExtractor.extract(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lock_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("~$draft.txt");
        tokio::fs::write(&path, "ignored").await.unwrap();

        assert!(FsExtractor.extract(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.txt");
        assert!(matches!(
            FsExtractor.extract(&path).await,
            Err(IndexerError::ExtractionFailed { .. })
        ));
    }
}
