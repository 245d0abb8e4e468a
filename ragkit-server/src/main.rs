use std::sync::Arc;

use anyhow::Context;
use ragkit_core::{
    CompletionModel, EmbeddingProvider, MockCompletion, MockEmbedding, RagService,
    openai::{OpenAICompletionModel, OpenAIEmbeddingProvider},
};
use ragkit_server::server::run_server;
use ragkit_server::settings::Settings;
use tracing::{info, warn};

/// Embedding width used when no real provider is configured.
const MOCK_DIMENSIONS: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env();
    let config = settings.rag_config().context("invalid RAGKIT_* configuration")?;
    let (embedding_provider, completion_model) = select_providers()?;

    let service = RagService::builder()
        .config(config)
        .embedding_provider(embedding_provider)
        .completion_model(completion_model)
        .store_path(settings.store_path.clone())
        .build()
        .await
        .context("failed to initialize the document QA service")?;

    run_server(Arc::new(service), settings).await
}

/// Pick real providers when an API key is present, mocks otherwise. The
/// mocks are deterministic, so a keyless server still ingests and searches.
fn select_providers() -> anyhow::Result<(Arc<dyn EmbeddingProvider>, Arc<dyn CompletionModel>)> {
    if std::env::var("OPENAI_API_KEY").is_ok() {
        let embedding = OpenAIEmbeddingProvider::from_env()?;
        let completion = OpenAICompletionModel::from_env()?;
        info!(model = completion.name(), "using OpenAI providers");
        return Ok((Arc::new(embedding), Arc::new(completion)));
    }

    warn!("OPENAI_API_KEY not set, answering with deterministic mock providers");
    Ok((
        Arc::new(MockEmbedding::new(MOCK_DIMENSIONS)),
        Arc::new(MockCompletion::replying(
            "No completion model is configured. Set OPENAI_API_KEY to enable real answers.",
        )),
    ))
}
