//! Replaces non-serializable NaN floats in a document tree with nulls

use crate::document::Field;

/// Return a copy of `field` with every NaN float replaced by [`Field::Null`].
///
/// All other values, including infinities, are carried over unchanged.
pub fn sanitize(field: &Field) -> Field {
  match field {
    Field::Float(value) if value.is_nan() => Field::Null,
    Field::Sequence(items) => Field::Sequence(items.iter().map(sanitize).collect()),
    Field::Mapping(record) => {
      Field::Mapping(record.iter().map(|(key, value)| (key.clone(), sanitize(value))).collect())
    }
    scalar => scalar.clone(),
  }
}

pub fn sanitize_all(fields: &[Field]) -> Vec<Field> {
  fields.iter().map(sanitize).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::document::Record;

  fn sample_tree() -> Field {
    let mut restaurant = Record::new();
    restaurant.insert("name".to_string(), Field::from("Cafe X"));
    restaurant.insert("latitude".to_string(), Field::Float(f64::NAN));
    restaurant.insert("longitude".to_string(), Field::Float(-122.4));

    let mut item = Record::new();
    item.insert("id".to_string(), Field::from("F1"));
    item.insert("rating".to_string(), Field::Float(f64::NAN));
    item.insert("rating_count".to_string(), Field::Integer(0));
    item.insert("notes".to_string(), Field::from(""));
    item.insert(
      "history".to_string(),
      Field::Sequence(vec![Field::Float(4.0), Field::Float(f64::NAN), Field::Null]),
    );
    item.insert("restaurant".to_string(), Field::Mapping(restaurant));
    Field::Sequence(vec![Field::Mapping(item)])
  }

  fn contains_nan(field: &Field) -> bool {
    match field {
      Field::Float(value) => value.is_nan(),
      Field::Sequence(items) => items.iter().any(contains_nan),
      Field::Mapping(record) => record.values().any(contains_nan),
      _ => false,
    }
  }

  #[test]
  fn test_replaces_every_nan_with_null() {
    let cleaned = sanitize(&sample_tree());
    assert!(!contains_nan(&cleaned));

    let item = match &cleaned {
      Field::Sequence(items) => items[0].as_mapping().unwrap().clone(),
      other => panic!("unexpected shape: {other:?}"),
    };
    assert_eq!(item["rating"], Field::Null);
    assert_eq!(
      item["history"],
      Field::Sequence(vec![Field::Float(4.0), Field::Null, Field::Null])
    );
    assert_eq!(item["restaurant"].as_mapping().unwrap()["latitude"], Field::Null);
  }

  #[test]
  fn test_leaves_other_scalars_untouched() {
    let cleaned = sanitize(&sample_tree());
    let item = match &cleaned {
      Field::Sequence(items) => items[0].as_mapping().unwrap().clone(),
      other => panic!("unexpected shape: {other:?}"),
    };
    assert_eq!(item["id"], Field::from("F1"));
    assert_eq!(item["rating_count"], Field::Integer(0));
    assert_eq!(item["notes"], Field::from(""));
    assert_eq!(item["restaurant"].as_mapping().unwrap()["longitude"], Field::Float(-122.4));
    assert_eq!(sanitize(&Field::Float(f64::INFINITY)), Field::Float(f64::INFINITY));
    assert_eq!(sanitize(&Field::Bool(false)), Field::Bool(false));
  }

  #[test]
  fn test_is_idempotent() {
    let once = sanitize(&sample_tree());
    let twice = sanitize(&once);
    assert_eq!(once, twice);
  }

  #[test]
  fn test_does_not_mutate_input() {
    let tree = sample_tree();
    let _ = sanitize(&tree);
    assert!(contains_nan(&tree));
  }

  #[test]
  fn test_preserves_key_order() {
    let cleaned = sanitize(&sample_tree());
    let item = match &cleaned {
      Field::Sequence(items) => items[0].as_mapping().unwrap().clone(),
      other => panic!("unexpected shape: {other:?}"),
    };
    let keys: Vec<&str> = item.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "rating", "rating_count", "notes", "history", "restaurant"]);
  }

  #[test]
  fn test_sanitize_all_keeps_length_and_order() {
    let fields = vec![Field::Float(f64::NAN), Field::Integer(-3), Field::from("x")];
    assert_eq!(
      sanitize_all(&fields),
      vec![Field::Null, Field::Integer(-3), Field::from("x")]
    );
  }
}
