use crate::error::DecodeFailure;
use serde_json::{Map, Value};

/// Outcome of decoding a buffered body
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A JSON object or array
    Document(Value),
    Failed(DecodeFailure),
}

impl Decoded {
    /// The document, or `{}` when decoding failed
    pub fn into_lenient(self) -> Value {
        match self {
            Self::Document(value) => value,
            Self::Failed(_) => empty_document(),
        }
    }

    pub fn into_result(self) -> Result<Value, DecodeFailure> {
        match self {
            Self::Document(value) => Ok(value),
            Self::Failed(failure) => Err(failure),
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

pub fn empty_document() -> Value {
    Value::Object(Map::new())
}

/// MIME type of the first `Content-Type` value, parameters stripped.
///
/// Every MIME type is decoded as JSON; this is recorded, not dispatched on.
pub fn mime_type<'a>(mut content_types: impl Iterator<Item = &'a str>) -> Option<String> {
    let first = content_types.next()?;
    let essence = first.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        return None;
    }
    Some(essence.to_ascii_lowercase())
}

/// Decode a buffered body as a JSON object or array.
///
/// Nesting is capped at serde_json's recursion limit of 128 levels. A deeper
/// document, even if well-formed, comes back as `Malformed` (and so as `{}`
/// from the lenient path).
pub fn decode_body(body: &[u8]) -> Decoded {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Decoded::Failed(DecodeFailure::Empty);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Decoded::Document(value),
        Ok(other) => Decoded::Failed(DecodeFailure::NotAContainer(kind(&other))),
        Err(e) => Decoded::Failed(DecodeFailure::Malformed(e.to_string())),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
