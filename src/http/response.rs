use serde_json::{Value, json};
use std::borrow::Cow;

/// Result of one curl invocation after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    /// Output decoded and parsed as JSON.
    Json(Value),
    /// Decoded text that is not JSON.
    Text(String),
    /// Output that could not be decoded as text.
    Binary(Vec<u8>),
    /// The process ran past the timeout and was killed.
    TimedOut,
    /// The process could not be run at all.
    NoData,
}

impl NormalizedResponse {
    pub fn is_timeout(&self) -> bool {
        matches!(self, NormalizedResponse::TimedOut)
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, NormalizedResponse::NoData)
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            NormalizedResponse::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Text for pattern matching. JSON is re-serialized, binary output is
    /// decoded lossily; timeouts and failures have none.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            NormalizedResponse::Json(value) => Some(Cow::Owned(value.to_string())),
            NormalizedResponse::Text(text) => Some(Cow::Borrowed(text)),
            NormalizedResponse::Binary(bytes) => Some(String::from_utf8_lossy(bytes)),
            NormalizedResponse::TimedOut | NormalizedResponse::NoData => None,
        }
    }

    /// Legacy JSON shape: the parsed value, `{"response": ..}`,
    /// `{"Timeout": true}` or `{}`.
    pub fn to_value(&self) -> Value {
        match self {
            NormalizedResponse::Json(value) => value.clone(),
            NormalizedResponse::Text(text) => json!({ "response": text }),
            NormalizedResponse::Binary(bytes) => {
                json!({ "response": String::from_utf8_lossy(bytes) })
            }
            NormalizedResponse::TimedOut => json!({ "Timeout": true }),
            NormalizedResponse::NoData => json!({}),
        }
    }
}
