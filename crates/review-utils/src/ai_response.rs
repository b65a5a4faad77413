//! Normalizes the dual-shape `issues` field of an AI analysis response
//! (spec §4.3/§6/§9) into a single ordered sequence of `Verdict`s.
//!
//! The known quirk: `issues` is either a JSON array of verdict objects, or
//! a string-keyed map (`"0"`, `"1"`, ...) of the same objects. Both shapes
//! are accepted; any other shape yields an empty sequence and a `warn!`.

use review_types::requests::Verdict;
use serde_json::Value;
use tracing::warn;

/// Extracts and normalizes verdicts from a raw AI analysis response.
pub fn normalize_verdicts(response: &Value) -> Vec<Verdict> {
  let Some(issues) = response.get("issues") else {
    warn!("AI analysis response had no \"issues\" field; treating as no verdicts");
    return Vec::new();
  };

  match issues {
    Value::Array(items) => items.iter().filter_map(parse_verdict).collect(),
    Value::Object(map) => {
      let mut ordered: Vec<(u64, &Value)> = Vec::new();
      for (key, value) in map {
        match key.parse::<u64>() {
          Ok(index) => ordered.push((index, value)),
          Err(_) => warn!(key = %key, "non-numeric key in keyed \"issues\" map; ignoring entry"),
        }
      }
      ordered.sort_by_key(|(index, _)| *index);
      ordered.into_iter().filter_map(|(_, value)| parse_verdict(value)).collect()
    }
    other => {
      warn!(shape = %describe_shape(other), "\"issues\" field had an unrecognized shape; treating as no verdicts");
      Vec::new()
    }
  }
}

fn parse_verdict(value: &Value) -> Option<Verdict> {
  let issue_id = value
    .get("issueId")
    .or_else(|| value.get("id"))
    .and_then(value_as_i64)?;

  let is_resolved = if let Some(flag) = value.get("isResolved").and_then(Value::as_bool) {
    flag
  } else if let Some(status) = value.get("status").and_then(Value::as_str) {
    match status {
      "resolved" => true,
      "open" => false,
      other => {
        warn!(status = %other, issue_id, "unrecognized verdict status; treating as unresolved");
        false
      }
    }
  } else {
    warn!(issue_id, "verdict missing both isResolved and status; treating as unresolved");
    false
  };

  let reason = value.get("reason").and_then(Value::as_str).map(str::to_string);

  Some(Verdict { issue_id, is_resolved, reason })
}

fn value_as_i64(value: &Value) -> Option<i64> {
  value.as_i64().or_else(|| value.as_str().and_then(|s| s.parse::<i64>().ok()))
}

fn describe_shape(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
