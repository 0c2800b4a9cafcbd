//! Upstream collaborators of the pipeline: embedding provider, generation
//! client and the backing record store

pub mod embeddings;
pub mod generation;
pub mod store;
