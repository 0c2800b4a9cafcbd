//! Request context and middleware for the recommendation REST API
//!
//! Every request gets a [`RequestContext`] with a fresh id, inserted as an
//! extension so handlers can tag their log lines with it.

use axum::{
  extract::Request,
  http::{HeaderMap, Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Request metadata shared with handlers
#[derive(Clone, Debug)]
pub struct RequestContext {
  /// Unique ID for this request
  pub request_id: Uuid,
  /// HTTP method
  pub method: Method,
  /// Request URI
  pub uri: Uri,
  /// Request headers
  pub headers: HeaderMap,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, headers }
  }

  fn user_agent(&self) -> &str {
    self.headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap_or("none")
  }

  pub fn log_request_start(&self) {
    tracing::info!(
      request_id = %self.request_id,
      method = %self.method,
      path = self.uri.path(),
      user_agent = self.user_agent(),
      "request started"
    );
  }

  pub fn log_request_complete(&self, status: u16, duration_ms: f64) {
    tracing::info!(
      request_id = %self.request_id,
      method = %self.method,
      path = self.uri.path(),
      status,
      duration_ms,
      "request completed"
    );
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context =
    RequestContext::new(request.method().clone(), request.uri().clone(), request.headers().clone());

  let start_time = Instant::now();
  context.log_request_start();

  request.extensions_mut().insert(context.clone());
  let response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms);

  response
}
