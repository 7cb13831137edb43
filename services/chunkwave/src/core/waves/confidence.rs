//! Confidence extraction from answer payloads.

use serde_json::{Map, Value};

/// Fields checked for a confidence value, highest priority first
pub const CONFIDENCE_FIELDS: [&str; 4] = ["confidence", "certainty", "score", "probability"];

/// The only distinction the extractor cares about
#[derive(Debug, Clone, Copy)]
pub enum PayloadShape<'a> {
    Record(&'a Map<String, Value>),
    Other,
}

impl<'a> PayloadShape<'a> {
    pub fn of(payload: &'a Value) -> Self {
        match payload {
            Value::Object(map) => PayloadShape::Record(map),
            _ => PayloadShape::Other,
        }
    }

    /// First numeric confidence-like field, unclamped
    pub fn confidence_field(&self) -> Option<f64> {
        match self {
            PayloadShape::Record(map) => CONFIDENCE_FIELDS
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_f64)),
            PayloadShape::Other => None,
        }
    }
}

/// Confidence in `[0, 1]` carried by an answer payload.
///
/// Missing, non-numeric and non-finite values all read as `0.0`.
pub fn extract_confidence(payload: &Value) -> f64 {
    match PayloadShape::of(payload).confidence_field() {
        Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
        _ => 0.0,
    }
}
