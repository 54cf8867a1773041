//! Snapshot persistence behavior.

use lexrag_vector_store::{
    AttributeMap, AttributeValue, Embedder, GetRequest, HashingEmbedder, VectorIndex,
    VectorStoreError,
};
use tempfile::TempDir;

fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), AttributeValue::from(*v)))
        .collect()
}

#[tokio::test]
async fn save_and_load_preserve_records_and_ranking() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("chunks.json");
    let embedder = HashingEmbedder::new(64);

    let mut index = VectorIndex::new("chunks");
    for (id, text) in [
        ("c1", "corporate income tax declaration"),
        ("c2", "annual leave and overtime rules"),
        ("c3", "value added tax refund procedure"),
    ] {
        let vector = embedder.embed(text).await.unwrap();
        index
            .upsert(id, vector, text, attrs(&[("document_id", id)]))
            .unwrap();
    }
    index.save(&path).await.unwrap();

    let restored = VectorIndex::load(&path).await.unwrap();
    assert_eq!(restored.count(), 3);

    let query = embedder.embed("tax refund").await.unwrap();
    let before = index.query(&query, 3, None).unwrap();
    let after = restored.query(&query, 3, None).unwrap();
    let ids = |hits: &[lexrag_vector_store::QueryMatch]| {
        hits.iter().map(|m| m.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&before), ids(&after));

    let record = restored.get(&GetRequest {
        ids: Some(vec!["c2".to_string()]),
        ..GetRequest::default()
    });
    assert_eq!(record[0].text, "annual leave and overtime rules");
}

#[tokio::test]
async fn loading_missing_snapshot_is_a_typed_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent.json");
    let err = VectorIndex::load(&missing).await.unwrap_err();
    assert!(matches!(err, VectorStoreError::SnapshotMissing(_)));
}

#[tokio::test]
async fn loading_corrupt_snapshot_is_a_typed_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    tokio::fs::write(&path, "{not json").await.unwrap();
    let err = VectorIndex::load(&path).await.unwrap_err();
    assert!(matches!(err, VectorStoreError::JsonError(_)));
}
