//! Status and version endpoint handlers

use axum::{extract::State, response::Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::server::routing::AppState;
use crate::server::types::{BaseResponse, HelloResponse, StatusResponse, VersionResponse};

/// GET / - Liveness greeting
pub async fn hello() -> Json<HelloResponse> {
  Json(HelloResponse { msg: "Hello World!".to_string() })
}

/// GET /status - Health check endpoint
pub async fn status(State(state): State<Arc<AppState>>) -> Json<BaseResponse<StatusResponse>> {
  let response = StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    food_collection: state.engine.settings().food_collection.clone(),
    started_at: state.started_at,
  };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /version - Returns current API version
pub async fn version() -> Json<BaseResponse<VersionResponse>> {
  let response = VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}
