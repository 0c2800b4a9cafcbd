//! Parses and validates the model's structured answer
//!
//! The prompt only asks for the `{"foods": [...]}` document; this module is
//! where that contract is actually enforced.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RecommendError, Result};

/// One recommended food as referenced by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
  pub id: String,
  pub reasoning: String,
}

/// Only `id` and `reasoning` are required. The descriptive fields the model
/// echoes (name, rating, ...) are ignored; the stored record wins for them.
#[derive(Debug, Deserialize)]
struct FoodEntry {
  id: String,
  reasoning: String,
}

/// Parse raw model output into recommendations, in document order.
/// Duplicate ids are kept.
pub fn parse(raw: &str) -> Result<Vec<Recommendation>> {
  let body = strip_code_fence(raw);

  let document: Value = serde_json::from_str(body)
    .map_err(|e| RecommendError::malformed_output(format!("response is not valid JSON: {e}")))?;

  let foods = document
    .get("foods")
    .ok_or_else(|| RecommendError::malformed_output("missing `foods` list"))?
    .as_array()
    .ok_or_else(|| RecommendError::malformed_output("`foods` is not a list"))?;

  foods
    .iter()
    .enumerate()
    .map(|(position, entry)| {
      if !entry.is_object() {
        return Err(RecommendError::malformed_output(format!("entry {position} is not an object")));
      }
      let food = FoodEntry::deserialize(entry)
        .map_err(|e| RecommendError::malformed_output(format!("entry {position}: {e}")))?;
      Ok(Recommendation { id: food.id, reasoning: food.reasoning })
    })
    .collect()
}

/// Remove one surrounding Markdown code fence, if present
fn strip_code_fence(raw: &str) -> &str {
  let trimmed = raw.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let Some(inner) = rest.strip_suffix("```") else {
    return trimmed;
  };
  // A first line of bare word characters is a language tag (e.g. ```json)
  match inner.split_once('\n') {
    Some((tag, body)) if is_language_tag(tag) => body.trim(),
    _ => inner.trim(),
  }
}

fn is_language_tag(line: &str) -> bool {
  line.trim().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
