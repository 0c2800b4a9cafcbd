//! Firestore REST adapter for the record store
//!
//! Documents are fetched one at a time with
//! `GET {base}/projects/{project}/databases/(default)/documents/{collection}/{id}`
//! and their typed values are decoded into [`Field`]s.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use super::RecordStore;
use crate::document::{Field, Record};
use crate::error::{RecommendError, Result};

pub struct FirestoreStore {
  client: Client,
  documents_url: Url,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
  #[serde(default)]
  fields: Map<String, Value>,
}

impl FirestoreStore {
  pub fn new(base_url: &str, project: &str, token: &str, timeout: Duration) -> Result<Self> {
    if project.trim().is_empty() {
      return Err(RecommendError::store("missing Firestore project id"));
    }

    let mut headers = HeaderMap::new();
    let auth = format!("Bearer {}", token.trim());
    headers.insert(
      AUTHORIZATION,
      HeaderValue::from_str(&auth).map_err(|_| RecommendError::store("invalid Firestore access token"))?,
    );

    let client = Client::builder()
      .timeout(timeout)
      .default_headers(headers)
      .build()
      .map_err(|e| RecommendError::store(format!("failed to build Firestore HTTP client: {e}")))?;

    let documents_url = Url::parse(&format!(
      "{}/projects/{}/databases/(default)/documents",
      base_url.trim_end_matches('/'),
      project.trim()
    ))
    .map_err(|e| RecommendError::store(format!("invalid Firestore base URL `{base_url}`: {e}")))?;
    if documents_url.cannot_be_a_base() {
      return Err(RecommendError::store(format!("invalid Firestore base URL `{base_url}`")));
    }

    Ok(Self { client, documents_url })
  }

  /// Collection and id are pushed as single percent-encoded segments
  fn document_url(&self, collection: &str, id: &str) -> Result<Url> {
    let mut url = self.documents_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| RecommendError::store("Firestore base URL cannot hold a document path"))?
      .push(collection)
      .push(id);
    Ok(url)
  }
}

#[async_trait]
impl RecordStore for FirestoreStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
    // A slash would address a sub-collection rather than a document
    if id.is_empty() || id.contains('/') || collection.contains('/') {
      tracing::warn!(collection, id, "refusing to look up invalid document path");
      return Ok(None);
    }

    let response = self
      .client
      .get(self.document_url(collection, id)?)
      .send()
      .await
      .map_err(|e| RecommendError::store(format!("Firestore request failed: {e}")))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !status.is_success() {
      let body = response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
      return Err(RecommendError::store(format!("Firestore returned {status}: {body}")));
    }

    let document: FirestoreDocument = response
      .json()
      .await
      .map_err(|e| RecommendError::store(format!("failed to parse Firestore document: {e}")))?;

    decode_fields(&document.fields).map(Some).map_err(RecommendError::store)
  }
}

fn decode_fields(fields: &Map<String, Value>) -> std::result::Result<Record, String> {
  fields
    .iter()
    .map(|(name, value)| decode_value(value).map(|field| (name.clone(), field)).map_err(|e| format!("field `{name}`: {e}")))
    .collect()
}

/// Decode one Firestore typed value (`{"stringValue": "..."}` and friends)
pub fn decode_value(value: &Value) -> std::result::Result<Field, String> {
  let object = value.as_object().ok_or("value is not an object")?;
  let (kind, inner) = object.iter().next().ok_or("value has no type tag")?;

  match kind.as_str() {
    "nullValue" => Ok(Field::Null),
    "booleanValue" => inner.as_bool().map(Field::Bool).ok_or_else(|| "booleanValue is not a bool".to_string()),
    // 64-bit integers travel as strings
    "integerValue" => match inner {
      Value::String(text) => text.parse::<i64>().map(Field::Integer).map_err(|e| e.to_string()),
      Value::Number(number) => number.as_i64().map(Field::Integer).ok_or_else(|| "integerValue out of range".to_string()),
      _ => Err("integerValue is not a number".to_string()),
    },
    "doubleValue" => match inner {
      Value::Number(number) => number.as_f64().map(Field::Float).ok_or_else(|| "doubleValue is not a float".to_string()),
      Value::String(text) => match text.as_str() {
        "NaN" => Ok(Field::Float(f64::NAN)),
        "Infinity" => Ok(Field::Float(f64::INFINITY)),
        "-Infinity" => Ok(Field::Float(f64::NEG_INFINITY)),
        other => other.parse::<f64>().map(Field::Float).map_err(|e| e.to_string()),
      },
      _ => Err("doubleValue is not a number".to_string()),
    },
    "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
      .as_str()
      .map(Field::from)
      .ok_or_else(|| format!("{kind} is not a string")),
    "geoPointValue" => {
      let point = inner.as_object().ok_or("geoPointValue is not an object")?;
      let mut record = Record::new();
      for axis in ["latitude", "longitude"] {
        let coordinate = point.get(axis).and_then(Value::as_f64).unwrap_or(0.0);
        record.insert(axis.to_string(), Field::Float(coordinate));
      }
      Ok(Field::Mapping(record))
    }
    "arrayValue" => {
      let values = inner.get("values").and_then(Value::as_array);
      values
        .map(|items| items.iter().map(decode_value).collect::<std::result::Result<Vec<_>, _>>())
        .unwrap_or_else(|| Ok(Vec::new()))
        .map(Field::Sequence)
    }
    "mapValue" => match inner.get("fields").and_then(Value::as_object) {
      Some(fields) => decode_fields(fields).map(Field::Mapping),
      None => Ok(Field::Mapping(Record::new())),
    },
    other => Err(format!("unsupported Firestore value type `{other}`")),
  }
}
