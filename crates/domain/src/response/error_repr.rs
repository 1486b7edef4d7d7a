//! The shapes in which the API reports application-level failures.

use serde_json::Value;

use crate::value::is_truthy;

/// Status used when an application error arrives with HTTP 200 and no code.
pub const DEFAULT_ERROR_STATUS: u16 = 520;

const UNSPECIFIED_MESSAGE: &str = "Unspecified error";

/// An application-level error found in a response body.
///
/// The server is inconsistent: `error` may be a bare string, an object
/// carrying `Message`/`message` and `Code`/`code`, or absent with
/// `success: 0` as the only failure signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorRepr {
    /// `"error": "text"`
    Text(String),
    /// `"error": { ... }`, or any other truthy non-string value.
    Object(Value),
    /// No error field, but a falsy `success` flag.
    Unspecified,
}

impl ErrorRepr {
    /// Detects an error in a response body.
    ///
    /// A truthy `error` field wins; otherwise a `success` flag equal to `0`
    /// or `false` yields [`ErrorRepr::Unspecified`]. Non-object bodies never
    /// carry an error.
    #[must_use]
    pub fn detect(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        match object.get("error") {
            Some(Value::String(text)) if !text.is_empty() => {
                return Some(Self::Text(text.clone()));
            }
            Some(other) if is_truthy(other) => return Some(Self::Object(other.clone())),
            _ => {}
        }
        let unsuccessful = match object.get("success") {
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::Bool(flag)) => !flag,
            _ => false,
        };
        unsuccessful.then_some(Self::Unspecified)
    }

    /// Canonical message: `Message`, then `message`, then the raw value.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Unspecified => UNSPECIFIED_MESSAGE.to_string(),
            Self::Object(value) => ["Message", "message"]
                .iter()
                .find_map(|key| value.get(key).filter(|v| is_truthy(v)))
                .map_or_else(|| display_value(value), display_value),
        }
    }

    /// Error-specific status code carried by the payload, from `Code` then `code`.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        let Self::Object(value) = self else {
            return None;
        };
        ["Code", "code"]
            .iter()
            .filter_map(|key| value.get(key))
            .find_map(as_status)
    }

    /// Status to report in place of a misleading 200.
    #[must_use]
    pub fn corrected_status(&self) -> u16 {
        self.code().unwrap_or(DEFAULT_ERROR_STATUS)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn as_status(value: &Value) -> Option<u16> {
    let code = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u16::try_from(code).ok().filter(|c| *c != 0)
}
