//! Tagged record values shared by the record store and the response tree

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered mapping of field name to value, as returned by the record store
pub type Record = IndexMap<String, Field>;

/// A single value inside a stored record or response document.
///
/// Unlike `serde_json::Value` this keeps non-finite floats intact so that
/// the sanitizer can see and replace them before serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Field {
  Null,
  Bool(bool),
  Integer(i64),
  Float(f64),
  String(String),
  Sequence(Vec<Field>),
  Mapping(Record),
}

impl Field {
  pub fn is_null(&self) -> bool {
    matches!(self, Field::Null)
  }

  pub fn is_nan(&self) -> bool {
    matches!(self, Field::Float(value) if value.is_nan())
  }

  pub fn as_mapping(&self) -> Option<&Record> {
    match self {
      Field::Mapping(record) => Some(record),
      _ => None,
    }
  }
}

impl From<&str> for Field {
  fn from(value: &str) -> Self {
    Field::String(value.to_string())
  }
}

impl From<String> for Field {
  fn from(value: String) -> Self {
    Field::String(value)
  }
}

impl From<f64> for Field {
  fn from(value: f64) -> Self {
    Field::Float(value)
  }
}

impl From<i64> for Field {
  fn from(value: i64) -> Self {
    Field::Integer(value)
  }
}

impl From<bool> for Field {
  fn from(value: bool) -> Self {
    Field::Bool(value)
  }
}

impl From<Record> for Field {
  fn from(value: Record) -> Self {
    Field::Mapping(value)
  }
}

impl From<Vec<Field>> for Field {
  fn from(value: Vec<Field>) -> Self {
    Field::Sequence(value)
  }
}

impl From<serde_json::Value> for Field {
  fn from(value: serde_json::Value) -> Self {
    use serde_json::Value;

    match value {
      Value::Null => Field::Null,
      Value::Bool(b) => Field::Bool(b),
      Value::Number(n) => match n.as_i64() {
        Some(i) => Field::Integer(i),
        None => Field::Float(n.as_f64().unwrap_or(f64::NAN)),
      },
      Value::String(s) => Field::String(s),
      Value::Array(items) => Field::Sequence(items.into_iter().map(Field::from).collect()),
      Value::Object(map) => {
        Field::Mapping(map.into_iter().map(|(k, v)| (k, Field::from(v))).collect())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_deserialize_keeps_integer_and_float_apart() {
    let field: Field = serde_json::from_value(json!({"rating": 4.5, "rating_count": 50})).unwrap();
    let record = field.as_mapping().unwrap();
    assert_eq!(record["rating"], Field::Float(4.5));
    assert_eq!(record["rating_count"], Field::Integer(50));
  }

  #[test]
  fn test_mapping_preserves_field_order() {
    let raw = r#"{"zeta": 1, "alpha": 2, "mid": 3}"#;
    let field: Field = serde_json::from_str(raw).unwrap();
    let keys: Vec<&str> = field.as_mapping().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
  }

  #[test]
  fn test_null_round_trips_through_json() {
    let field: Field = serde_json::from_str("null").unwrap();
    assert!(field.is_null());
    assert_eq!(serde_json::to_string(&field).unwrap(), "null");
  }

  #[test]
  fn test_from_json_value_nested() {
    let field = Field::from(json!({"tags": ["spicy", 2, null]}));
    let tags = &field.as_mapping().unwrap()["tags"];
    assert_eq!(
      *tags,
      Field::Sequence(vec![Field::from("spicy"), Field::Integer(2), Field::Null])
    );
  }

  #[test]
  fn test_is_nan_only_for_nan_floats() {
    assert!(Field::Float(f64::NAN).is_nan());
    assert!(!Field::Float(0.0).is_nan());
    assert!(!Field::from("NaN").is_nan());
  }
}
