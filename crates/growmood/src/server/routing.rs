//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::rag::RecommendationEngine;
use crate::server::handlers::{recommendation, status};
use crate::server::middleware::request_context_middleware;

/// Shared handler state
pub struct AppState {
  pub engine: RecommendationEngine,
  pub started_at: DateTime<Utc>,
}

impl AppState {
  pub fn new(engine: RecommendationEngine) -> Self {
    Self { engine, started_at: Utc::now() }
  }
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(status::hello))
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    // Recommendation endpoint
    .route("/recommendation", post(recommendation::recommend))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
