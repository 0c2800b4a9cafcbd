use async_trait::async_trait;
use axum::{
  body::{self, Body},
  http::{Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use growmood::config::RetrievalSettings;
use growmood::document::{Field, Record};
use growmood::rag::RecommendationEngine;
use growmood::server::create_app;
use growmood::server::services::embeddings::EmbeddingProvider;
use growmood::server::services::generation::GenerationClient;
use growmood::server::services::store::MemoryStore;
use growmood::Result;

struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
  }
}

struct ScriptedGenerator(&'static str);

#[async_trait]
impl GenerationClient for ScriptedGenerator {
  async fn generate(&self, _question: &str, _system_prompt: &str) -> Result<String> {
    Ok(self.0.to_string())
  }
}

const TWO_FOODS: &str = r#"{"foods": [
  {"id": "F1", "name": "Tomato Soup", "reasoning": "Warm and soothing"},
  {"id": "F2", "reasoning": "Not in the store"}
]}"#;

fn corpora(dir: &TempDir) -> RetrievalSettings {
  let menu = dir.path().join("menu.jsonl");
  let research = dir.path().join("research.jsonl");
  std::fs::write(
    &menu,
    "{\"embedding\": [1.0, 0.0], \"chunk\": \"id: F1\"}\n{\"embedding\": [0.0, 1.0], \"chunk\": \"id: F2\"}\n",
  )
  .unwrap();
  std::fs::write(&research, "{\"embedding\": [0.6, 0.8], \"chunk\": \"Tomatoes and mood\"}\n").unwrap();
  RetrievalSettings { menu_corpus: menu, research_corpus: research, ..RetrievalSettings::default() }
}

fn store() -> MemoryStore {
  let record: Record = [
    ("name", Field::from("Tomato Soup")),
    ("rating", Field::Float(f64::NAN)),
    ("rating_count", Field::Integer(42)),
    ("restaurant_name", Field::from("Cafe X")),
    ("restaurant_latitude", Field::Float(-6.2)),
  ]
  .into_iter()
  .map(|(k, v)| (k.to_string(), v))
  .collect();
  MemoryStore::new().with_record("Food", "F1", record)
}

fn app(settings: RetrievalSettings, reply: &'static str) -> Router {
  let engine = RecommendationEngine::new(
    Arc::new(FixedEmbedder),
    Arc::new(ScriptedGenerator(reply)),
    Arc::new(store()),
    settings,
  );
  create_app(engine)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
  let response = app.oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

fn post_json(body: &str) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/recommendation")
    .header("content-type", "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

#[tokio::test]
async fn test_root_greets() {
  let dir = TempDir::new().unwrap();
  let request = Request::builder().uri("/").body(Body::empty()).unwrap();
  let (status, body) = send(app(corpora(&dir), TWO_FOODS), request).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"msg": "Hello World!"}));
}

#[tokio::test]
async fn test_status_and_version() {
  let dir = TempDir::new().unwrap();

  let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
  let (status, body) = send(app(corpora(&dir), TWO_FOODS), request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["food_collection"], "Food");

  let request = Request::builder().uri("/version").body(Body::empty()).unwrap();
  let (status, body) = send(app(corpora(&dir), TWO_FOODS), request).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_recommendation_end_to_end() {
  let dir = TempDir::new().unwrap();
  let request = post_json(r#"{"mood": "sad", "description": "it is raining"}"#);
  let (status, body) = send(app(corpora(&dir), TWO_FOODS), request).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 1);
  assert!(body["transaction_id"].is_string());
  assert!(body.get("errors").is_none());

  let item = &body["recommendation"][0];
  assert_eq!(item["id"], "F1");
  assert_eq!(item["reasoning"], "Warm and soothing");
  assert_eq!(item["name"], "Tomato Soup");
  assert_eq!(item["rating"], Value::Null);
  assert_eq!(item["rating_count"], 42);
  assert!(item.get("restaurant_name").is_none());
  assert_eq!(
    item["restaurant"],
    json!({
      "name": "Cafe X",
      "description": null,
      "image": null,
      "address": null,
      "latitude": -6.2,
      "longitude": null
    })
  );
}

#[tokio::test]
async fn test_empty_recommendation_list() {
  let dir = TempDir::new().unwrap();
  let request = post_json(r#"{"mood": "bored", "description": ""}"#);
  let (status, body) = send(app(corpora(&dir), r#"{"foods": []}"#), request).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 0);
  assert_eq!(body["recommendation"], json!([]));
}

#[tokio::test]
async fn test_request_validation() {
  let dir = TempDir::new().unwrap();

  for payload in [
    r#"{"mood": "  ", "description": "x"}"#,
    r#"{"mood": "sad", "description": "x", "result_count": 0}"#,
    r#"{"description": "no mood"}"#,
    "not json",
  ] {
    let (status, body) = send(app(corpora(&dir), TWO_FOODS), post_json(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    assert_eq!(body["errors"][0]["key"], "invalid_request", "{payload}");
  }
}

#[tokio::test]
async fn test_malformed_model_output_is_bad_gateway() {
  let dir = TempDir::new().unwrap();
  let request = post_json(r#"{"mood": "sad", "description": "x"}"#);
  let (status, body) = send(app(corpora(&dir), "I recommend soup."), request).await;

  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert_eq!(body["errors"][0]["key"], "malformed_model_output");
  assert!(body.get("recommendation").is_none());
}

#[tokio::test]
async fn test_missing_corpus_is_internal_error() {
  let dir = TempDir::new().unwrap();
  let mut settings = corpora(&dir);
  settings.menu_corpus = dir.path().join("missing.jsonl");

  let request = post_json(r#"{"mood": "sad", "description": "x"}"#);
  let (status, body) = send(app(settings, TWO_FOODS), request).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["errors"][0]["key"], "corpus_load_failed");
}
