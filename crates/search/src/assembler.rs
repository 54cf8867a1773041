use crate::retriever::RankedChunk;
use serde::Serialize;

/// Default context budget in characters.
pub const DEFAULT_CONTEXT_BUDGET: usize = 5000;

/// One chunk admitted into the assembled context.
#[derive(Debug, Clone, Serialize)]
pub struct ContextBlock {
    pub text: String,
    /// `folder/file` provenance tag.
    pub source: String,
    pub relevance: f32,
}

/// Ranked, deduplicated, length-bounded context for a downstream
/// answerer.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledContext {
    pub blocks: Vec<ContextBlock>,
    /// Distinct sources in first-appearance order.
    pub sources: Vec<String>,
    /// Characters across all blocks, never above the budget.
    pub total_length: usize,
    pub results_considered: usize,
    pub results_used: usize,
}

impl AssembledContext {
    /// Block texts joined by blank lines, ready for a prompt.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Packs ranked chunks into a character budget.
///
/// Admission is greedy in rank order and stops at the first chunk that
/// would overflow, so the used chunks are always a prefix of the
/// ranking. No bin packing: a later, smaller chunk never jumps an
/// earlier oversized one.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    budget: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            budget: DEFAULT_CONTEXT_BUDGET,
        }
    }
}

impl ContextAssembler {
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    #[must_use]
    pub fn budget(&self) -> usize {
        self.budget
    }

    #[must_use]
    pub fn assemble(&self, results: &[RankedChunk]) -> AssembledContext {
        let mut blocks = Vec::new();
        let mut sources = Vec::new();
        let mut total_length = 0;

        for result in results {
            let length = result.record.text.chars().count();
            if total_length + length > self.budget {
                break;
            }
            let source = result.record.source();
            if !sources.contains(&source) {
                sources.push(source.clone());
            }
            blocks.push(ContextBlock {
                text: result.record.text.clone(),
                source,
                relevance: result.combined_score,
            });
            total_length += length;
        }

        log::debug!(
            "Assembled {}/{} chunks into {total_length} chars",
            blocks.len(),
            results.len()
        );
        AssembledContext {
            results_used: blocks.len(),
            results_considered: results.len(),
            blocks,
            sources,
            total_length,
        }
    }
}
