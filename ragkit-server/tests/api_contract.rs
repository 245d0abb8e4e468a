use std::sync::Arc;

use ragkit_core::{MockCompletion, MockEmbedding, RagService};
use ragkit_server::{AppState, app_router};
use serde_json::{Value, json};
use tempfile::TempDir;

const CANNED_ANSWER: &str = "The notes describe the rollout plan.";

const NOTES_TEXT: &str = "The rollout starts with the staging cluster. Every service is \
                          deployed behind the feature flag first.\n\nProduction traffic \
                          shifts over in ten percent increments while error budgets are \
                          watched.";

async fn spawn_server() -> (String, TempDir, tokio::task::JoinHandle<()>) {
    let store_dir = TempDir::new().expect("create temp store dir");
    let service = RagService::builder()
        .embedding_provider(Arc::new(MockEmbedding::new(32)))
        .completion_model(Arc::new(MockCompletion::replying(CANNED_ANSWER)))
        .store_path(store_dir.path().join("store.json"))
        .build()
        .await
        .expect("build service");

    let app = app_router(AppState { service: Arc::new(service) });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    (format!("http://{}", addr), store_dir, handle)
}

#[tokio::test]
async fn health_reports_healthy() {
    let (base, _store_dir, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{}/health", base)).send().await.expect("health response");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("health json");
    assert_eq!(body.get("status").and_then(Value::as_str), Some("healthy"));
    assert!(body.get("version").and_then(Value::as_str).is_some());

    handle.abort();
}

#[tokio::test]
async fn upload_list_delete_roundtrip() {
    let (base, _store_dir, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let upload = client
        .post(format!("{}/api/v1/documents", base))
        .json(&json!({"filename": "notes.txt", "text": NOTES_TEXT}))
        .send()
        .await
        .expect("upload response");
    assert!(upload.status().is_success());

    let uploaded: Value = upload.json().await.expect("upload json");
    assert_eq!(uploaded.get("status").and_then(Value::as_str), Some("success"));
    assert_eq!(
        uploaded.get("message").and_then(Value::as_str),
        Some("Document 'notes.txt' successfully uploaded and processed"),
    );

    let listing: Value = client
        .get(format!("{}/api/v1/documents", base))
        .send()
        .await
        .expect("list response")
        .json()
        .await
        .expect("list json");
    assert_eq!(listing.get("total_documents").and_then(Value::as_u64), Some(1));
    let document = &listing.get("documents").and_then(Value::as_array).expect("documents")[0];
    assert_eq!(document.get("filename").and_then(Value::as_str), Some("notes.txt"));
    assert_eq!(document.get("chunk_count").and_then(Value::as_u64), Some(1));
    assert_eq!(
        document.get("total_characters").and_then(Value::as_u64),
        Some(NOTES_TEXT.len() as u64),
    );

    let stats: Value = client
        .get(format!("{}/api/v1/store/stats", base))
        .send()
        .await
        .expect("stats response")
        .json()
        .await
        .expect("stats json");
    assert_eq!(stats.get("status").and_then(Value::as_str), Some("active"));

    let deleted: Value = client
        .delete(format!("{}/api/v1/documents/notes.txt", base))
        .send()
        .await
        .expect("delete response")
        .json()
        .await
        .expect("delete json");
    assert_eq!(deleted.get("success").and_then(Value::as_bool), Some(true));
    assert_eq!(
        deleted.get("message").and_then(Value::as_str),
        Some("Document 'notes.txt' successfully deleted from vector store"),
    );

    let stats_after: Value = client
        .get(format!("{}/api/v1/store/stats", base))
        .send()
        .await
        .expect("stats response")
        .json()
        .await
        .expect("stats json");
    assert_eq!(stats_after.get("status").and_then(Value::as_str), Some("empty"));
    assert_eq!(stats_after.get("total_chunks").and_then(Value::as_u64), Some(0));

    handle.abort();
}

#[tokio::test]
async fn chat_returns_model_message() {
    let (base, _store_dir, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/v1/chat", base))
        .json(&json!({"message": "What does the plan say?"}))
        .send()
        .await
        .expect("chat response");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("chat json");
    assert_eq!(body.get("message").and_then(Value::as_str), Some(CANNED_ANSWER));

    handle.abort();
}

#[tokio::test]
async fn chat_with_blank_message_answers_with_fallback() {
    let (base, _store_dir, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/v1/chat", base))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .expect("chat response");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("chat json");
    let message = body.get("message").and_then(Value::as_str).expect("message field");
    assert!(message.starts_with("I'm sorry, I'm having trouble processing your question"));
    assert!(message.contains("Invalid question: empty or whitespace only"));

    handle.abort();
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (base, _store_dir, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let upload = client
        .post(format!("{}/api/v1/documents", base))
        .json(&json!({"filename": "rollout.txt", "text": NOTES_TEXT}))
        .send()
        .await
        .expect("upload response");
    assert!(upload.status().is_success());

    let response = client
        .get(format!("{}/api/v1/search", base))
        .query(&[("q", "staging cluster rollout"), ("k", "3")])
        .send()
        .await
        .expect("search response");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("search json");
    assert_eq!(body.get("results_found").and_then(Value::as_u64), Some(1));
    let result = &body.get("results").and_then(Value::as_array).expect("results")[0];
    assert_eq!(result.get("rank").and_then(Value::as_u64), Some(1));
    assert_eq!(result.get("source_file").and_then(Value::as_str), Some("rollout.txt"));
    assert!(result.get("distance").and_then(Value::as_f64).is_some());

    handle.abort();
}

#[tokio::test]
async fn upload_with_blank_text_is_rejected() {
    let (base, _store_dir, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/v1/documents", base))
        .json(&json!({"filename": "empty.txt", "text": "   \n  "}))
        .send()
        .await
        .expect("upload response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    handle.abort();
}

#[tokio::test]
async fn delete_unknown_document_reports_not_found() {
    let (base, _store_dir, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("{}/api/v1/documents/ghost.pdf", base))
        .send()
        .await
        .expect("delete response");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("delete json");
    assert_eq!(body.get("success").and_then(Value::as_bool), Some(false));
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Document 'ghost.pdf' not found in vector store"),
    );

    handle.abort();
}
