//! REST API module for the recommendation service
//!
//! Provides the HTTP surface over the recommendation pipeline.
//! Uses axum for routing and schemars for OpenAPI documentation generation.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod services;
pub mod startup;
pub mod types;

pub use routing::{create_router, AppState};
pub use startup::{build_engine, create_app, start_server};
