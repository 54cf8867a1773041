//! End-to-end splitting over document-shaped text.

use lexrag_text_chunker::{token_estimate, SplitterConfig, TextSplitter};

fn legal_text(paragraphs: usize) -> String {
    (1..=paragraphs)
        .map(|i| {
            format!(
                "Điều {i}. Quy định chung về nghĩa vụ thuế. Người nộp thuế \
                 có trách nhiệm kê khai đầy đủ và đúng hạn theo quy định \
                 của pháp luật hiện hành."
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[test]
fn chunk_boundaries_are_stable_across_runs() {
    let text = legal_text(40);
    let splitter = TextSplitter::new(SplitterConfig::default()).unwrap();

    let first = splitter.split(&text);
    let second = splitter.split(&text);

    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn default_config_respects_size_budget() {
    let text = legal_text(120);
    let splitter = TextSplitter::new(SplitterConfig::default()).unwrap();

    for chunk in splitter.split(&text) {
        assert!(chunk.chars().count() <= 5000);
        assert!(token_estimate(&chunk) > 0);
    }
}

#[test]
fn every_paragraph_survives_splitting() {
    let text = legal_text(30);
    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size: 400,
        chunk_overlap: 40,
        ..SplitterConfig::default()
    })
    .unwrap();

    let joined = splitter.split(&text).join("");
    for i in 1..=30 {
        assert!(
            joined.contains(&format!("Điều {i}.")),
            "paragraph {i} missing from chunk output"
        );
    }
}
