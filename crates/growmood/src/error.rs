//! Error taxonomy for the recommendation pipeline

use thiserror::Error;

pub type Result<T, E = RecommendError> = std::result::Result<T, E>;

/// Fatal pipeline failures. Per-item store misses are not errors; they are
/// logged and dropped during enrichment.
#[derive(Error, Debug)]
pub enum RecommendError {
  #[error("Embedding service failed: {message}")]
  EmbeddingService { message: String },

  #[error("Failed to load corpus '{path}': {message}")]
  CorpusLoad { path: String, message: String },

  #[error("Failed to build similarity index: {message}")]
  IndexBuild { message: String },

  #[error("Generation service failed: {message}")]
  GenerationService { message: String },

  #[error("Malformed model output: {message}")]
  MalformedOutput { message: String },

  #[error("Record store failed: {message}")]
  Store { message: String },
}

impl RecommendError {
  pub fn embedding_service(message: impl Into<String>) -> Self {
    Self::EmbeddingService { message: message.into() }
  }

  pub fn corpus_load(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self::CorpusLoad { path: path.into(), message: message.into() }
  }

  pub fn index_build(message: impl Into<String>) -> Self {
    Self::IndexBuild { message: message.into() }
  }

  pub fn generation_service(message: impl Into<String>) -> Self {
    Self::GenerationService { message: message.into() }
  }

  pub fn malformed_output(message: impl Into<String>) -> Self {
    Self::MalformedOutput { message: message.into() }
  }

  pub fn store(message: impl Into<String>) -> Self {
    Self::Store { message: message.into() }
  }

  /// Stable key used in API error payloads
  pub fn key(&self) -> &'static str {
    match self {
      Self::EmbeddingService { .. } => "embedding_service_failed",
      Self::CorpusLoad { .. } => "corpus_load_failed",
      Self::IndexBuild { .. } => "index_build_failed",
      Self::GenerationService { .. } => "generation_service_failed",
      Self::MalformedOutput { .. } => "malformed_model_output",
      Self::Store { .. } => "record_store_failed",
    }
  }

  /// Whether the failure came from an upstream collaborator rather than local data
  pub fn is_upstream(&self) -> bool {
    matches!(
      self,
      Self::EmbeddingService { .. }
        | Self::GenerationService { .. }
        | Self::MalformedOutput { .. }
        | Self::Store { .. }
    )
  }
}
