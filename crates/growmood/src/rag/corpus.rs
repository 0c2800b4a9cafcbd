//! Pre-embedded corpus loading
//!
//! A corpus file holds one record per indexed unit (menu item or research
//! snippet) with its text chunk and pre-computed embedding vector. Record
//! order defines the index position used to map search hits back to text.

use serde::Deserialize;
use std::path::Path;

use crate::error::{RecommendError, Result};

/// One indexed unit: its embedding and the text handed to the model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorpusRecord {
  #[serde(alias = "embedding")]
  pub vector: Vec<f32>,
  pub chunk: String,
}

/// Ordered, dimension-consistent collection of corpus records
#[derive(Debug, Clone)]
pub struct Corpus {
  records: Vec<CorpusRecord>,
  dimension: usize,
}

impl Corpus {
  pub fn new(records: Vec<CorpusRecord>) -> Result<Self> {
    let first = records.first().ok_or_else(|| RecommendError::index_build("corpus is empty"))?;
    let dimension = first.vector.len();
    if dimension == 0 {
      return Err(RecommendError::index_build("corpus vectors are empty"));
    }

    if let Some((position, record)) =
      records.iter().enumerate().find(|(_, record)| record.vector.len() != dimension)
    {
      return Err(RecommendError::index_build(format!(
        "record {position} has dimension {}, expected {dimension}",
        record.vector.len()
      )));
    }

    Ok(Self { records, dimension })
  }

  /// Load a corpus from JSON Lines or a JSON array of records
  pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let raw = tokio::fs::read_to_string(path)
      .await
      .map_err(|e| RecommendError::corpus_load(&shown, e.to_string()))?;

    let records = parse_records(&raw).map_err(|message| RecommendError::corpus_load(&shown, message))?;
    tracing::debug!(path = %shown, records = records.len(), "loaded corpus");

    Self::new(records)
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn dimension(&self) -> usize {
    self.dimension
  }

  pub fn vectors(&self) -> Vec<&[f32]> {
    self.records.iter().map(|record| record.vector.as_slice()).collect()
  }

  /// Text chunks for the given positions, in the given order.
  /// Out-of-range positions are skipped.
  pub fn chunks_at(&self, positions: &[usize]) -> Vec<String> {
    positions
      .iter()
      .filter_map(|&position| self.records.get(position))
      .map(|record| record.chunk.clone())
      .collect()
  }
}

fn parse_records(raw: &str) -> std::result::Result<Vec<CorpusRecord>, String> {
  let trimmed = raw.trim_start();
  if trimmed.starts_with('[') {
    return serde_json::from_str(trimmed).map_err(|e| format!("invalid JSON array: {e}"));
  }

  raw
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(number, line)| {
      serde_json::from_str(line).map_err(|e| format!("line {}: {e}", number + 1))
    })
    .collect()
}
