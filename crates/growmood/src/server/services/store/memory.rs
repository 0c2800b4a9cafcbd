//! In-memory record store, optionally seeded from a JSON fixture

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use super::RecordStore;
use crate::document::Record;
use crate::error::{RecommendError, Result};

/// Collections of records keyed by document id.
///
/// Fixture layout: `{"<collection>": {"<id>": {<field>: <value>, ...}}}`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  collections: HashMap<String, HashMap<String, Record>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_record(mut self, collection: &str, id: &str, record: Record) -> Self {
    self.insert(collection, id, record);
    self
  }

  pub fn insert(&mut self, collection: &str, id: &str, record: Record) {
    self.collections.entry(collection.to_string()).or_default().insert(id.to_string(), record);
  }

  pub fn from_json(raw: &str) -> Result<Self> {
    let collections: HashMap<String, HashMap<String, Record>> = serde_json::from_str(raw)
      .map_err(|e| RecommendError::store(format!("invalid store fixture: {e}")))?;
    Ok(Self { collections })
  }

  pub async fn from_fixture(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
      .await
      .map_err(|e| RecommendError::store(format!("failed to read {}: {e}", path.display())))?;
    let store = Self::from_json(&raw)?;
    tracing::info!(
      path = %path.display(),
      records = store.len(),
      "loaded record store fixture"
    );
    Ok(store)
  }

  /// Total number of records across all collections
  pub fn len(&self) -> usize {
    self.collections.values().map(HashMap::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl RecordStore for MemoryStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
    Ok(self.collections.get(collection).and_then(|records| records.get(id)).cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::document::Field;

  #[tokio::test]
  async fn test_lookup_by_collection_and_id() {
    let store = MemoryStore::from_json(
      r#"{"Food": {"F1": {"name": "Ramen", "rating": 4.5}}, "User": {"F1": {"email": "a@b.c"}}}"#,
    )
    .unwrap();

    let record = store.get("Food", "F1").await.unwrap().unwrap();
    assert_eq!(record["name"], Field::from("Ramen"));
    assert!(store.get("Food", "F2").await.unwrap().is_none());
    assert!(store.get("Drinks", "F1").await.unwrap().is_none());
    assert_eq!(store.len(), 2);
  }

  #[test]
  fn test_invalid_fixture_is_store_error() {
    let err = MemoryStore::from_json("[1, 2]").unwrap_err();
    assert!(matches!(err, RecommendError::Store { .. }));
  }

  #[tokio::test]
  async fn test_builder_inserts() {
    let mut record = Record::new();
    record.insert("rating".to_string(), Field::Float(3.0));
    let store = MemoryStore::new().with_record("Food", "X", record.clone());
    assert_eq!(store.get("Food", "X").await.unwrap(), Some(record));
  }
}
