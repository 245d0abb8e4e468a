//! Store lifecycle, persistence, and concurrency tests.

use std::sync::Arc;

use ragkit_core::document::{Chunk, ChunkMetadata, StoreStatus};
use ragkit_core::mock::MockEmbedding;
use ragkit_core::store::StoreManager;
use tempfile::TempDir;

const DIM: usize = 32;

fn chunk(source: &str, ordinal: usize, content: &str) -> Chunk {
    Chunk {
        content: content.to_string(),
        metadata: ChunkMetadata {
            source_file: source.to_string(),
            chunk_id: format!("{source}_{ordinal}"),
        },
    }
}

async fn open_store(dir: &TempDir) -> StoreManager {
    StoreManager::open(Arc::new(MockEmbedding::new(DIM)), dir.path().join("store.json")).await
}

#[tokio::test]
async fn fresh_store_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let stats = store.stats().await;
    assert_eq!(stats.status, StoreStatus::Empty);
    assert_eq!(stats.document_count, 0);
    assert_eq!(stats.total_chunks, 0);
    assert!(store.list_documents().await.is_empty());
    assert!(store.search("anything", 5).await.is_empty());
}

#[tokio::test]
async fn inserted_chunks_are_self_retrievable() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let chunks = vec![
        chunk("a.txt", 0, "the first passage about widgets"),
        chunk("a.txt", 1, "the second passage about gadgets"),
        chunk("b.txt", 0, "a completely different topic entirely"),
    ];
    assert!(store.insert(chunks.clone()).await);

    for expected in &chunks {
        let results = store.search(&expected.content, 3).await;
        assert!(!results.is_empty());
        assert_eq!(results[0].chunk.metadata.chunk_id, expected.metadata.chunk_id);
        assert!(results[0].distance < 1e-5, "self distance was {}", results[0].distance);
    }
}

#[tokio::test]
async fn insert_empty_batch_is_rejected_without_state_change() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert!(!store.insert(Vec::new()).await);
    assert!(!store.insert(Vec::new()).await);

    let stats = store.stats().await;
    assert_eq!(stats.status, StoreStatus::Empty);
    assert_eq!(stats.total_chunks, 0);
}

#[tokio::test]
async fn insert_makes_store_active() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert!(store.insert(vec![chunk("a.txt", 0, "alpha"), chunk("a.txt", 1, "beta")]).await);

    let stats = store.stats().await;
    assert_eq!(stats.status, StoreStatus::Active);
    assert_eq!(stats.document_count, 1);
    assert_eq!(stats.total_chunks, 2);
}

#[tokio::test]
async fn list_documents_aggregates_per_source_in_filename_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .insert(vec![
            chunk("zebra.txt", 0, "12345"),
            chunk("apple.txt", 0, "abc"),
            chunk("zebra.txt", 1, "678"),
        ])
        .await;

    let summaries = store.list_documents().await;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].filename, "apple.txt");
    assert_eq!(summaries[0].chunk_count, 1);
    assert_eq!(summaries[0].total_characters, 3);
    assert_eq!(summaries[1].filename, "zebra.txt");
    assert_eq!(summaries[1].chunk_count, 2);
    assert_eq!(summaries[1].total_characters, 8);
}

#[tokio::test]
async fn delete_removes_only_the_named_source() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.insert(vec![chunk("keep.txt", 0, "kept one"), chunk("keep.txt", 1, "kept two")]).await;
    store
        .insert(vec![
            chunk("drop.txt", 0, "dropped one"),
            chunk("drop.txt", 1, "dropped two"),
            chunk("drop.txt", 2, "dropped three"),
        ])
        .await;
    assert_eq!(store.stats().await.total_chunks, 5);

    assert!(store.delete_by_source("drop.txt").await);

    let summaries = store.list_documents().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].filename, "keep.txt");
    let stats = store.stats().await;
    assert_eq!(stats.total_chunks, 2);
    assert_eq!(stats.status, StoreStatus::Active);
}

#[tokio::test]
async fn deleting_last_source_returns_store_to_empty() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let path = dir.path().join("store.json");

    store.insert(vec![chunk("only.txt", 0, "solitary chunk")]).await;
    assert!(path.exists());
    assert_eq!(store.stats().await.status, StoreStatus::Active);

    assert!(store.delete_by_source("only.txt").await);

    let stats = store.stats().await;
    assert_eq!(stats.status, StoreStatus::Empty);
    assert_eq!(stats.document_count, 0);
    assert_eq!(stats.total_chunks, 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn delete_unknown_source_returns_false() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert!(!store.delete_by_source("missing.txt").await);

    store.insert(vec![chunk("present.txt", 0, "content")]).await;
    assert!(!store.delete_by_source("missing.txt").await);
    assert_eq!(store.stats().await.total_chunks, 1);
}

#[tokio::test]
async fn persisted_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir).await;
        assert!(
            store
                .insert(vec![
                    chunk("a.txt", 0, "durable first chunk"),
                    chunk("a.txt", 1, "durable second chunk"),
                ])
                .await
        );
    }

    let reopened = open_store(&dir).await;
    let stats = reopened.stats().await;
    assert_eq!(stats.status, StoreStatus::Active);
    assert_eq!(stats.total_chunks, 2);

    let results = reopened.search("durable first chunk", 1).await;
    assert_eq!(results[0].chunk.metadata.chunk_id, "a.txt_0");
}

#[tokio::test]
async fn corrupt_artifact_degrades_to_error_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "definitely not json").unwrap();

    let store = open_store(&dir).await;
    let stats = store.stats().await;
    assert_eq!(stats.status, StoreStatus::Error);
    assert_eq!(stats.total_chunks, 0);
    assert!(store.search("anything", 3).await.is_empty());

    // A successful insert overwrites the bad artifact and recovers.
    assert!(store.insert(vec![chunk("new.txt", 0, "fresh content")]).await);
    assert_eq!(store.stats().await.status, StoreStatus::Active);
}

#[tokio::test]
async fn failed_embedding_leaves_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let store =
        StoreManager::open(Arc::new(MockEmbedding::failing(DIM)), dir.path().join("store.json"))
            .await;

    assert!(!store.insert(vec![chunk("a.txt", 0, "will not embed")]).await);

    let stats = store.stats().await;
    assert_eq!(stats.status, StoreStatus::Empty);
    assert_eq!(stats.total_chunks, 0);
    assert!(!dir.path().join("store.json").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_disjoint_inserts_both_appear() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir).await);

    let left = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .insert(vec![chunk("left.txt", 0, "left chunk one"), chunk("left.txt", 1, "left chunk two")])
                .await
        })
    };
    let right = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .insert(vec![chunk("right.txt", 0, "right chunk one")])
                .await
        })
    };

    assert!(left.await.unwrap());
    assert!(right.await.unwrap());

    let summaries = store.list_documents().await;
    let filenames: Vec<&str> = summaries.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(filenames, vec!["left.txt", "right.txt"]);
    assert_eq!(store.stats().await.total_chunks, 3);
}

#[tokio::test]
async fn search_respects_top_k() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let chunks: Vec<Chunk> =
        (0..5).map(|i| chunk("many.txt", i, &format!("passage number {i}"))).collect();
    store.insert(chunks).await;

    assert_eq!(store.search("passage number 0", 2).await.len(), 2);
    assert_eq!(store.search("passage number 0", 10).await.len(), 5);
}
