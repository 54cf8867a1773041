use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory under the corpus root holding index snapshots.
pub const DEFAULT_SNAPSHOT_DIR: &str = ".lexrag";

/// Optional TOML configuration. Every field has a default, and
/// command-line flags override whatever the file says.
///
/// ```toml
/// corpus_dir = "/data/legal-corpus"
/// top_k = 5
/// context_budget = 5000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub corpus_dir: PathBuf,
    /// Defaults to `<corpus_dir>/.lexrag` when unset.
    pub snapshot_dir: Option<PathBuf>,
    pub top_k: usize,
    pub context_budget: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("."),
            snapshot_dir: None,
            top_k: 5,
            context_budget: 5000,
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    #[must_use]
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir
            .clone()
            .unwrap_or_else(|| self.corpus_dir.join(DEFAULT_SNAPSHOT_DIR))
    }
}
