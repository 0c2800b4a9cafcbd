//! Retrieval-augmented recommendation pipeline
//!
//! Stages, in order: query embedding, dual-corpus similarity search, context
//! assembly, generation, output validation, record enrichment, sanitization.

pub mod context;
pub mod corpus;
pub mod enrich;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod sanitize;

pub use enrich::{EnrichedItem, Restaurant};
pub use output::Recommendation;
pub use pipeline::{RecommendationEngine, RecommendationRequest};
