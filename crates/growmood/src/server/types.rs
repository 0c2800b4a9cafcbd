//! REST API types with schemars annotations for OpenAPI generation

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Field;

pub use crate::rag::RecommendationRequest;

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API versioning information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
  /// The latest version of the API
  pub latest: String,

  /// The version of the API requested by the client
  pub requested: String,

  /// The version of the API that was used in producing the response
  pub resolved: String,
}

impl VersionInfo {
  fn current() -> Self {
    let version = env!("CARGO_PKG_VERSION");
    Self { latest: version.to_string(), requested: version.to_string(), resolved: version.to_string() }
  }
}

/// API error information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,
}

// Status/Version Endpoints
// =======================

/// Response for / endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HelloResponse {
  pub msg: String,
}

/// Response for /status endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  /// Always "healthy" when the server can answer
  pub status: String,

  /// Server version
  pub version: String,

  /// Store collection that recommendations are resolved against
  pub food_collection: String,

  /// When this server process started accepting requests
  pub started_at: DateTime<Utc>,
}

/// Response for /version endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  /// Current API version
  pub version: String,
}

// Recommendation Endpoint
// =======================

/// Response for /recommendation endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationResponse {
  /// Enriched foods in the order the model ranked them
  pub recommendation: Vec<Field>,

  /// Number of entries in `recommendation`
  pub total: usize,
}

impl RecommendationResponse {
  pub fn new(recommendation: Vec<Field>) -> Self {
    let total = recommendation.len();
    Self { recommendation, total }
  }
}

// Helper implementations
// =====================

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: VersionInfo::current(), transaction_id, errors: Vec::new(), data }
  }

  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: VersionInfo::current(), transaction_id, errors, data: () }
  }
}

impl ApiError {
  /// Create a new API error
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_success_flattens_data() {
    let id = Uuid::new_v4();
    let body = BaseResponse::success(RecommendationResponse::new(vec![Field::from("x")]), id);
    let value = serde_json::to_value(&body).unwrap();

    assert_eq!(value["total"], 1);
    assert_eq!(value["recommendation"][0], "x");
    assert_eq!(value["transaction_id"], id.to_string());
    assert_eq!(value["versioning"]["resolved"], env!("CARGO_PKG_VERSION"));
    assert!(value.get("errors").is_none());
  }

  #[test]
  fn test_error_carries_keys() {
    let body = BaseResponse::<()>::error(vec![ApiError::new("invalid_request", "mood is required")], Uuid::new_v4());
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["errors"][0]["key"], "invalid_request");
    assert_eq!(value["errors"][0]["message"], "mood is required");
  }
}
