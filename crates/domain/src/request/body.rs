//! Request body types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of an outgoing request.
///
/// Callers hand the client structured values; the request augmenter turns
/// them into serialized text before dispatch. Text bodies are sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// A body that is already serialized.
    Text(String),
    /// A structured body awaiting JSON serialization.
    Json(Value),
}

impl RequestBody {
    /// Returns true if there is no body.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the serialized text, if the body is already text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::None | Self::Json(_) => None,
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

impl From<Option<Value>> for RequestBody {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::None, Self::from)
    }
}
