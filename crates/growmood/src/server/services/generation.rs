//! Chat-completion generation client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::embeddings::build_client;
use crate::config::OpenAiConfig;
use crate::error::{RecommendError, Result};

/// Sampling is pinned so that repeated requests stay as close as possible
pub const TEMPERATURE: f32 = 0.0;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
  /// Send the system instructions and the user question; return the raw completion text
  async fn generate(&self, question: &str, system_prompt: &str) -> Result<String>;
}

pub struct OpenAiChat {
  client: Client,
  endpoint: String,
  model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  temperature: f32,
  messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
  content: Option<String>,
}

impl OpenAiChat {
  pub fn new(config: &OpenAiConfig, timeout: Duration) -> Result<Self> {
    let client = build_client(&config.api_key, timeout).map_err(RecommendError::generation_service)?;
    let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
    Ok(Self { client, endpoint, model: config.chat_model.clone() })
  }
}

#[async_trait]
impl GenerationClient for OpenAiChat {
  async fn generate(&self, question: &str, system_prompt: &str) -> Result<String> {
    let body = ChatRequest {
      model: &self.model,
      temperature: TEMPERATURE,
      messages: [
        ChatMessage { role: "system", content: system_prompt },
        ChatMessage { role: "user", content: question },
      ],
    };

    let response = self
      .client
      .post(&self.endpoint)
      .json(&body)
      .send()
      .await
      .map_err(|e| RecommendError::generation_service(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
      return Err(RecommendError::generation_service(format!("endpoint returned {status}: {text}")));
    }

    let parsed: ChatResponse = response
      .json()
      .await
      .map_err(|e| RecommendError::generation_service(format!("failed to parse response: {e}")))?;

    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or_else(|| RecommendError::generation_service("response contained no completion"))
  }
}
