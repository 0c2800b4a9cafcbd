//! End-to-end recommendation flow

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::context;
use super::corpus::Corpus;
use super::enrich::{enrich_all, EnrichedItem};
use super::index::SimilarityIndex;
use super::output;
use super::prompt;
use super::sanitize::sanitize_all;
use crate::config::RetrievalSettings;
use crate::document::Field;
use crate::error::{RecommendError, Result};
use crate::server::services::embeddings::EmbeddingProvider;
use crate::server::services::generation::GenerationClient;
use crate::server::services::store::RecordStore;

/// What the caller feels and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationRequest {
  /// Short mood phrase, e.g. "sad" or "stressed"
  pub mood: String,

  /// Free-text elaboration of the mood
  #[serde(default)]
  pub description: String,

  /// Exact number of foods to ask for; at least ten when absent
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub result_count: Option<usize>,
}

impl RecommendationRequest {
  pub fn new(mood: impl Into<String>, description: impl Into<String>) -> Self {
    Self { mood: mood.into(), description: description.into(), result_count: None }
  }

  pub fn with_result_count(mut self, count: usize) -> Self {
    self.result_count = Some(count);
    self
  }
}

/// Owns the external services and retrieval policy. Built once at startup
/// and shared across requests.
pub struct RecommendationEngine {
  embedder: Arc<dyn EmbeddingProvider>,
  generator: Arc<dyn GenerationClient>,
  store: Arc<dyn RecordStore>,
  settings: RetrievalSettings,
}

impl RecommendationEngine {
  pub fn new(
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationClient>,
    store: Arc<dyn RecordStore>,
    settings: RetrievalSettings,
  ) -> Self {
    Self { embedder, generator, store, settings }
  }

  pub fn settings(&self) -> &RetrievalSettings {
    &self.settings
  }

  /// Run the whole pipeline and return sanitized, enriched items in model
  /// order. Any stage failure aborts the request; unknown ids are dropped.
  pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Field>> {
    let started = Instant::now();
    let question = prompt::user_question(&request.mood, &request.description, request.result_count);
    tracing::debug!(%question, "built user question");

    let query = Arc::new(self.embed_query(&question).await?);
    tracing::debug!(dimension = query.len(), "embedded question");

    let (menu, research) = tokio::try_join!(
      Corpus::load(&self.settings.menu_corpus),
      Corpus::load(&self.settings.research_corpus),
    )?;
    tracing::debug!(menu = menu.len(), research = research.len(), "loaded corpora");

    let (menu_chunks, research_chunks) = tokio::try_join!(
      retrieve(menu, Arc::clone(&query), self.settings.menu_top_k),
      retrieve(research, query, self.settings.research_top_k),
    )?;
    tracing::debug!(menu = menu_chunks.len(), research = research_chunks.len(), "retrieved context");

    let system_prompt = prompt::system_prompt(
      &context::menu_context(&menu_chunks),
      &context::research_context(&research_chunks),
      request.result_count,
    );

    let raw = self.generate(&question, &system_prompt).await?;
    let recommendations = output::parse(&raw)?;
    tracing::debug!(count = recommendations.len(), "parsed model output");

    let items = enrich_all(&recommendations, self.store.as_ref(), &self.settings.food_collection).await?;
    let enriched: Vec<Field> = items.into_iter().map(EnrichedItem::into_field).collect();
    let results = sanitize_all(&enriched);

    tracing::info!(
      mood = %request.mood,
      recommended = recommendations.len(),
      returned = results.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "recommendation complete"
    );
    Ok(results)
  }

  async fn embed_query(&self, question: &str) -> Result<Vec<f32>> {
    let mut vectors = self.embedder.embed(&[question.to_string()]).await?;
    if vectors.len() != 1 {
      return Err(RecommendError::embedding_service(format!(
        "expected 1 embedding for the question, got {}",
        vectors.len()
      )));
    }
    Ok(vectors.remove(0))
  }

  async fn generate(&self, question: &str, system_prompt: &str) -> Result<String> {
    let timeout = self.settings.generation_timeout;
    tokio::time::timeout(timeout, self.generator.generate(question, system_prompt))
      .await
      .map_err(|_| RecommendError::generation_service(format!("timed out after {}s", timeout.as_secs_f32())))?
  }
}

/// Build an index over `corpus` and return the chunks of its `k` nearest
/// records. CPU-bound, so it runs on the blocking pool.
async fn retrieve(corpus: Corpus, query: Arc<Vec<f32>>, k: usize) -> Result<Vec<String>> {
  tokio::task::spawn_blocking(move || {
    let index = SimilarityIndex::build(&corpus.vectors())?;
    let hits = index.search(&query, k)?;
    let positions: Vec<usize> = hits.iter().map(|hit| hit.position).collect();
    Ok(corpus.chunks_at(&positions))
  })
  .await
  .map_err(|e| RecommendError::index_build(format!("search task failed: {e}")))?
}
