//! Resolves recommended ids against the record store
//!
//! Each stored food record carries its restaurant flattened into
//! `restaurant_*` fields. Enrichment lifts those into a nested object, merges
//! the model's reasoning and keeps the remaining food fields at top level.

use futures::future::join_all;

use super::output::Recommendation;
use crate::document::{Field, Record};
use crate::error::Result;
use crate::server::services::store::RecordStore;

/// Stored field name and the key it takes inside the nested restaurant object
pub const RESTAURANT_FIELDS: [(&str, &str); 6] = [
  ("restaurant_name", "name"),
  ("restaurant_description", "description"),
  ("restaurant_image", "image"),
  ("restaurant_address", "address"),
  ("restaurant_latitude", "latitude"),
  ("restaurant_longitude", "longitude"),
];

const RESERVED_KEYS: [&str; 3] = ["id", "reasoning", "restaurant"];

/// Restaurant sub-fields; absent ones are [`Field::Null`]
#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
  pub name: Field,
  pub description: Field,
  pub image: Field,
  pub address: Field,
  pub latitude: Field,
  pub longitude: Field,
}

impl Restaurant {
  /// Remove the `restaurant_*` fields from `record` and collect them
  fn take_from(record: &mut Record) -> Self {
    let mut take = |stored: &str| record.shift_remove(stored).unwrap_or(Field::Null);
    Self {
      name: take(RESTAURANT_FIELDS[0].0),
      description: take(RESTAURANT_FIELDS[1].0),
      image: take(RESTAURANT_FIELDS[2].0),
      address: take(RESTAURANT_FIELDS[3].0),
      latitude: take(RESTAURANT_FIELDS[4].0),
      longitude: take(RESTAURANT_FIELDS[5].0),
    }
  }

  pub fn into_field(self) -> Field {
    let values = [self.name, self.description, self.image, self.address, self.latitude, self.longitude];
    let record: Record = RESTAURANT_FIELDS
      .iter()
      .zip(values)
      .map(|((_, key), value)| (key.to_string(), value))
      .collect();
    Field::Mapping(record)
  }
}

/// A recommended food merged with its stored record
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedItem {
  pub id: String,
  pub reasoning: String,
  /// Remaining food fields, in stored order
  pub fields: Record,
  pub restaurant: Restaurant,
}

impl EnrichedItem {
  pub fn from_record(id: String, reasoning: String, mut record: Record) -> Self {
    let restaurant = Restaurant::take_from(&mut record);
    for key in RESERVED_KEYS {
      record.shift_remove(key);
    }
    Self { id, reasoning, fields: record, restaurant }
  }

  /// Response shape: `id`, `reasoning`, food fields, then `restaurant`
  pub fn into_field(self) -> Field {
    let mut record = Record::with_capacity(self.fields.len() + 3);
    record.insert("id".to_string(), Field::String(self.id));
    record.insert("reasoning".to_string(), Field::String(self.reasoning));
    record.extend(self.fields);
    record.insert("restaurant".to_string(), self.restaurant.into_field());
    Field::Mapping(record)
  }
}

/// Look up one recommendation. A missing document yields `Ok(None)`.
pub async fn enrich(
  recommendation: &Recommendation,
  store: &dyn RecordStore,
  collection: &str,
) -> Result<Option<EnrichedItem>> {
  let record = store.get(collection, &recommendation.id).await?;
  Ok(record.map(|record| {
    EnrichedItem::from_record(recommendation.id.clone(), recommendation.reasoning.clone(), record)
  }))
}

/// Enrich every recommendation, keeping model order and dropping ids the
/// store does not know. Lookups run concurrently; a store failure aborts.
pub async fn enrich_all(
  recommendations: &[Recommendation],
  store: &dyn RecordStore,
  collection: &str,
) -> Result<Vec<EnrichedItem>> {
  let lookups = recommendations.iter().map(|recommendation| enrich(recommendation, store, collection));
  let results = join_all(lookups).await;

  let mut items = Vec::with_capacity(results.len());
  for (recommendation, result) in recommendations.iter().zip(results) {
    match result? {
      Some(item) => items.push(item),
      None => tracing::warn!(collection, id = %recommendation.id, "no such document, dropping recommendation"),
    }
  }
  Ok(items)
}
