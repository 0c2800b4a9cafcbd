//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::{serve, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{Config, StoreConfig};
use crate::rag::RecommendationEngine;
use crate::server::routing::{create_router, AppState};
use crate::server::services::embeddings::OpenAiEmbeddings;
use crate::server::services::generation::OpenAiChat;
use crate::server::services::store::{FirestoreStore, MemoryStore, RecordStore};

/// Wire the configured services into a recommendation engine
pub async fn build_engine(config: &Config) -> Result<RecommendationEngine> {
  let embedder = OpenAiEmbeddings::new(&config.openai, config.http_timeout)?;
  let generator = OpenAiChat::new(&config.openai, config.retrieval.generation_timeout)?;

  let store: Arc<dyn RecordStore> = match &config.store {
    StoreConfig::Fixture(path) => Arc::new(MemoryStore::from_fixture(path).await?),
    StoreConfig::Firestore { base_url, project, token } => {
      tracing::info!(project = %project, "using Firestore record store");
      Arc::new(FirestoreStore::new(base_url, project, token, config.http_timeout)?)
    }
  };

  Ok(RecommendationEngine::new(Arc::new(embedder), Arc::new(generator), store, config.retrieval.clone()))
}

/// Router with the HTTP layers applied
pub fn create_app(engine: RecommendationEngine) -> Router {
  create_router(Arc::new(AppState::new(engine)))
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
}

/// Start the REST server
pub async fn start_server(config: Config) -> Result<()> {
  tracing::info!(
    menu = %config.retrieval.menu_corpus.display(),
    research = %config.retrieval.research_corpus.display(),
    chat_model = %config.openai.chat_model,
    "starting recommendation server"
  );

  let engine = build_engine(&config).await.context("failed to initialise services")?;
  let app = create_app(engine);

  let listener = TcpListener::bind(config.bind)
    .await
    .with_context(|| format!("failed to bind {}", config.bind))?;
  tracing::info!(addr = %config.bind, "server listening");

  serve(listener, app).await.context("server error")?;
  tracing::info!("server shutdown gracefully");
  Ok(())
}
