use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the recursive character splitter.
///
/// `separators` is a priority list: the splitter breaks oversized text on
/// the first separator that occurs in it and recurses with the remaining
/// ones. The trailing empty string means "cut anywhere".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,

    /// Characters carried over from the end of one chunk into the next.
    pub chunk_overlap: usize,

    /// Separator priority list, most structural first.
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5000,
            chunk_overlap: 500,
            separators: ["\n\n", "\n", ". ", "! ", "? ", "; ", ": ", " ", ""]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl SplitterConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkerError::InvalidConfig(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChunkerError::InvalidConfig(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Recursive character splitter with overlapping windows.
///
/// Deterministic for identical input and configuration: the same text
/// always yields the same chunk boundaries.
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    pub fn new(config: SplitterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split `text` into chunks of at most `chunk_size` characters.
    ///
    /// Blank input yields no chunks.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut fragments = Vec::new();
        self.fragment(text, &self.config.separators, &mut fragments);
        let chunks = self.merge(fragments);
        log::debug!(
            "Split {} chars into {} chunks",
            text.chars().count(),
            chunks.len()
        );
        chunks
    }

    /// Break `text` into fragments no longer than `chunk_size`, keeping
    /// separators attached to the preceding fragment.
    fn fragment(&self, text: &str, separators: &[String], out: &mut Vec<String>) {
        if text.is_empty() {
            return;
        }
        if char_len(text) <= self.config.chunk_size {
            out.push(text.to_string());
            return;
        }

        let Some((separator, rest)) = separators.split_first() else {
            self.hard_cut(text, out);
            return;
        };

        if separator.is_empty() {
            self.hard_cut(text, out);
        } else if text.contains(separator.as_str()) {
            for piece in text.split_inclusive(separator.as_str()) {
                self.fragment(piece, rest, out);
            }
        } else {
            self.fragment(text, rest, out);
        }
    }

    /// Last resort: cut on character boundaries every `chunk_size` chars.
    fn hard_cut(&self, text: &str, out: &mut Vec<String>) {
        let mut current = String::with_capacity(self.config.chunk_size);
        let mut len = 0;
        for ch in text.chars() {
            current.push(ch);
            len += 1;
            if len == self.config.chunk_size {
                out.push(std::mem::take(&mut current));
                len = 0;
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }

    /// Merge fragments into windows of at most `chunk_size` characters,
    /// carrying `chunk_overlap` trailing characters into the next window.
    fn merge(&self, fragments: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for fragment in fragments {
            let fragment_len = char_len(&fragment);
            if current_len > 0 && current_len + fragment_len > self.config.chunk_size {
                let tail = char_suffix(&current, self.config.chunk_overlap);
                chunks.push(current);
                current = tail;
                current_len = char_len(&current);
                if current_len + fragment_len > self.config.chunk_size {
                    // Overlap plus an oversized fragment would bust the
                    // window; start clean instead.
                    current.clear();
                    current_len = 0;
                }
            }
            current.push_str(&fragment);
            current_len += fragment_len;
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

/// Rough token count for diagnostics (~4 characters per token).
#[must_use]
pub fn token_estimate(text: &str) -> usize {
    let chars = text.chars().count();
    if chars == 0 {
        0
    } else {
        chars.div_ceil(4)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Suffix of `text` containing at most `max_chars` characters.
fn char_suffix(text: &str, max_chars: usize) -> String {
    let len = char_len(text);
    if len <= max_chars {
        return text.to_string();
    }
    let skip = len - max_chars;
    let start = text
        .char_indices()
        .nth(skip)
        .map_or(text.len(), |(idx, _)| idx);
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            ..SplitterConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = splitter(100, 10).split("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(splitter(100, 10).split("   \n\n  ").is_empty());
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = "aaaa aaaa.\n\nbbbb bbbb.\n\ncccc cccc.";
        let chunks = splitter(14, 0).split(text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 14));
        assert!(chunks[0].starts_with("aaaa"));
        assert!(chunks.iter().any(|c| c.contains("bbbb")));
        assert!(chunks.last().unwrap().contains("cccc"));
    }

    #[test]
    fn respects_chunk_size() {
        let text = "word ".repeat(500);
        for chunk in splitter(64, 16).split(&text) {
            assert!(chunk.chars().count() <= 64, "oversized chunk: {chunk:?}");
        }
    }

    #[test]
    fn overlap_carries_tail_forward() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = splitter(20, 8).split(text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let skip = pair[0].chars().count().saturating_sub(4);
            let tail: String = pair[0].chars().skip(skip).collect();
            assert!(
                pair[1].contains(tail.trim()) || tail.trim().is_empty(),
                "expected overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn hard_cuts_unbroken_text() {
        let text = "x".repeat(250);
        let chunks = splitter(100, 0).split(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn deterministic_boundaries() {
        let text = "Điều 1. Phạm vi điều chỉnh.\n\nĐiều 2. Đối tượng áp dụng. "
            .repeat(40);
        let a = splitter(200, 20).split(&text);
        let b = splitter(200, 20).split(&text);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let config = SplitterConfig {
            chunk_size: 10,
            chunk_overlap: 10,
            ..SplitterConfig::default()
        };
        assert!(TextSplitter::new(config).is_err());
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(token_estimate(""), 0);
        assert_eq!(token_estimate("abc"), 1);
        assert_eq!(token_estimate("abcde"), 2);
    }
}
