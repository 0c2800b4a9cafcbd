//! Grow Mood - Mood-aware Food Recommendations
//!
//! Retrieves menu items and research snippets that are semantically close to a
//! user's mood, grounds a language model on them and returns the recommended
//! foods enriched with their stored records.

pub mod config;
pub mod document;
pub mod error;
pub mod rag;
pub mod server;

pub use error::{RecommendError, Result};
