//! Recommendation endpoint handler

use axum::{
  extract::{rejection::JsonRejection, Extension, State},
  http::StatusCode,
  response::Json,
};
use std::sync::Arc;

use crate::error::RecommendError;
use crate::server::middleware::RequestContext;
use crate::server::routing::AppState;
use crate::server::types::{ApiError, BaseResponse, RecommendationRequest, RecommendationResponse};

type ErrorResponse = (StatusCode, Json<BaseResponse<()>>);

/// POST /recommendation - Mood-based food recommendations
pub async fn recommend(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<RecommendationResponse>>, ErrorResponse> {
  let transaction_id = context.request_id;
  let reject = |status: StatusCode, key: &str, message: &str| {
    (status, Json(BaseResponse::<()>::error(vec![ApiError::new(key, message)], transaction_id)))
  };

  let Json(request) = payload.map_err(|e| reject(StatusCode::BAD_REQUEST, "invalid_request", &e.body_text()))?;

  if request.mood.trim().is_empty() {
    return Err(reject(StatusCode::BAD_REQUEST, "invalid_request", "mood must not be empty"));
  }
  if request.result_count == Some(0) {
    return Err(reject(StatusCode::BAD_REQUEST, "invalid_request", "result_count must be at least 1"));
  }

  match state.engine.recommend(&request).await {
    Ok(items) => {
      tracing::info!(request_id = %transaction_id, total = items.len(), "served recommendation");
      Ok(Json(BaseResponse::success(RecommendationResponse::new(items), transaction_id)))
    }
    Err(e) => {
      tracing::error!(request_id = %transaction_id, error = %e, "recommendation failed");
      Err(reject(error_status(&e), e.key(), &e.to_string()))
    }
  }
}

/// Upstream service faults are a bad gateway; local data faults are ours
pub fn error_status(error: &RecommendError) -> StatusCode {
  if error.is_upstream() {
    StatusCode::BAD_GATEWAY
  } else {
    StatusCode::INTERNAL_SERVER_ERROR
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_status_mapping() {
    assert_eq!(error_status(&RecommendError::malformed_output("x")), StatusCode::BAD_GATEWAY);
    assert_eq!(error_status(&RecommendError::embedding_service("x")), StatusCode::BAD_GATEWAY);
    assert_eq!(error_status(&RecommendError::generation_service("x")), StatusCode::BAD_GATEWAY);
    assert_eq!(error_status(&RecommendError::store("x")), StatusCode::BAD_GATEWAY);
    assert_eq!(error_status(&RecommendError::index_build("x")), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_status(&RecommendError::corpus_load("menu.jsonl", "x")), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
