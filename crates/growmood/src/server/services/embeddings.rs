//! Query embedding provider
//!
//! The corpora are embedded offline; at request time only the user question
//! needs a vector, produced by the same model the corpora were built with.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{RecommendError, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
  /// One vector per input, in input order. Any failure fails the whole batch.
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embeddings client for OpenAI-compatible endpoints
#[derive(Clone)]
pub struct OpenAiEmbeddings {
  client: Client,
  endpoint: String,
  model: String,
  dimensions: Option<usize>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a [String],
  #[serde(skip_serializing_if = "Option::is_none")]
  dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
  index: usize,
}

impl OpenAiEmbeddings {
  pub fn new(config: &OpenAiConfig, timeout: Duration) -> Result<Self> {
    let client = build_client(&config.api_key, timeout).map_err(RecommendError::embedding_service)?;
    let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));
    Ok(Self {
      client,
      endpoint,
      model: config.embedding_model.clone(),
      dimensions: config.embedding_dimensions,
    })
  }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
      return Ok(Vec::new());
    }

    let request = EmbeddingRequest { model: &self.model, input: texts, dimensions: self.dimensions };
    let response = self
      .client
      .post(&self.endpoint)
      .json(&request)
      .send()
      .await
      .map_err(|e| RecommendError::embedding_service(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
      return Err(RecommendError::embedding_service(format!("endpoint returned {status}: {body}")));
    }

    let mut parsed: EmbeddingResponse = response
      .json()
      .await
      .map_err(|e| RecommendError::embedding_service(format!("failed to parse response: {e}")))?;

    if parsed.data.len() != texts.len() {
      return Err(RecommendError::embedding_service(format!(
        "returned {} embeddings for {} inputs",
        parsed.data.len(),
        texts.len()
      )));
    }

    parsed.data.sort_by_key(|entry| entry.index);
    Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
  }
}

/// HTTP client with bearer auth shared by the OpenAI-compatible services
pub(crate) fn build_client(api_key: &str, timeout: Duration) -> std::result::Result<Client, String> {
  if api_key.trim().is_empty() {
    return Err("missing OpenAI API key".to_string());
  }

  let mut headers = HeaderMap::new();
  let auth = format!("Bearer {}", api_key.trim());
  headers.insert(
    AUTHORIZATION,
    HeaderValue::from_str(&auth).map_err(|_| "invalid OpenAI API key".to_string())?,
  );
  headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

  Client::builder()
    .timeout(timeout)
    .default_headers(headers)
    .build()
    .map_err(|e| format!("failed to build HTTP client: {e}"))
}
