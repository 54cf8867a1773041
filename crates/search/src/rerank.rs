use crate::retriever::RankedChunk;
use lexrag_corpus::ChunkRecord;
use std::collections::HashMap;

/// Heuristic document authority in `[0, 1]`.
///
/// Base 0.5, plus 0.2 for an active document, 0.1 for a known effective
/// date, and up to 0.2 from folder keyword richness (0.05 per keyword).
#[must_use]
pub fn authority_score(record: &ChunkRecord) -> f32 {
    let mut score = 0.5;
    if record.status.as_deref() == Some("active") {
        score += 0.2;
    }
    if record.effective_date.is_some() {
        score += 0.1;
    }
    score += (0.05 * record.folder_keywords.len() as f32).min(0.2);
    score.clamp(0.0, 1.0)
}

/// Order candidates by combined score, highest first. The sort is
/// stable, so equal scores keep their index-distance order.
#[must_use]
pub(crate) fn rank(mut candidates: Vec<RankedChunk>) -> Vec<RankedChunk> {
    candidates.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

/// Cap results per source document, preserving rank order.
#[must_use]
pub(crate) fn diversity_filter(
    ranked: Vec<RankedChunk>,
    max_per_doc: usize,
) -> Vec<RankedChunk> {
    let mut per_doc: HashMap<String, usize> = HashMap::new();
    ranked
        .into_iter()
        .filter(|candidate| {
            let seen = per_doc
                .entry(candidate.record.document_id.clone())
                .or_insert(0);
            *seen += 1;
            *seen <= max_per_doc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(document_id: &str, keywords: usize) -> ChunkRecord {
        ChunkRecord {
            document_id: document_id.to_string(),
            folder_id: "f1".to_string(),
            folder_name: "Tax".to_string(),
            file_name: format!("{document_id}.txt"),
            file_type: "txt".to_string(),
            text: "text".to_string(),
            chunk_index: 0,
            total_chunks: 1,
            chunk_length: 4,
            token_count: 1,
            folder_summary: String::new(),
            legal_category: "VAT".to_string(),
            folder_keywords: (0..keywords).map(|i| format!("k{i}")).collect(),
            status: Some("active".to_string()),
            effective_date: Some("2024-01-01".to_string()),
        }
    }

    fn ranked(document_id: &str, combined_score: f32) -> RankedChunk {
        RankedChunk {
            record: chunk(document_id, 0),
            doc_similarity: combined_score,
            folder_similarity: 0.0,
            authority_score: 0.0,
            combined_score,
        }
    }

    #[test]
    fn authority_saturates_at_one() {
        // 0.5 base + 0.2 active + 0.1 dated + 0.2 keyword cap.
        let record = chunk("doc", 6);
        assert_eq!(authority_score(&record), 1.0);
    }

    #[test]
    fn authority_components_add_up() {
        let mut record = chunk("doc", 2);
        assert!((authority_score(&record) - 0.9).abs() < 1e-6);

        record.status = Some("expired".to_string());
        assert!((authority_score(&record) - 0.7).abs() < 1e-6);

        record.effective_date = None;
        assert!((authority_score(&record) - 0.6).abs() < 1e-6);

        record.folder_keywords.clear();
        assert!((authority_score(&record) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn keyword_bonus_is_capped() {
        let four = authority_score(&chunk("doc", 4));
        let forty = authority_score(&chunk("doc", 40));
        assert_eq!(four, forty);
    }

    #[test]
    fn rank_orders_descending() {
        let ordered = rank(vec![ranked("a", 0.2), ranked("b", 0.9), ranked("c", 0.5)]);
        let ids: Vec<&str> = ordered
            .iter()
            .map(|r| r.record.document_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn diversity_keeps_at_most_max_per_document() {
        let candidates = vec![
            ranked("a", 0.9),
            ranked("a", 0.8),
            ranked("b", 0.7),
            ranked("a", 0.6),
            ranked("a", 0.5),
            ranked("b", 0.4),
        ];
        let kept = diversity_filter(candidates, 3);
        let a_count = kept
            .iter()
            .filter(|r| r.record.document_id == "a")
            .count();
        assert_eq!(kept.len(), 5);
        assert_eq!(a_count, 3);
        // Order preserved after filtering.
        assert!(kept
            .windows(2)
            .all(|w| w[0].combined_score >= w[1].combined_score));
    }
}
