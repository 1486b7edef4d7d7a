//! The persisted session.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::SessionPatch;
use crate::value::is_truthy;

/// A stream the user holds authorization over, with its own credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamGrant {
    /// Stream identifier
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Bearer credential scoped to this stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Any other fields the server sent along
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamGrant {
    /// Creates a grant with a scoped token.
    #[must_use]
    pub fn new(id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: Some(token.into()),
            extra: Map::new(),
        }
    }
}

/// Accepts ids sent either as strings or as numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

/// Everything the client persists between calls.
///
/// One instance per client, owned by a state store under the client's
/// namespace. Extra top-level fields (e.g. a display name echoed from a
/// registration body) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Identifier of the authenticated user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Session bearer credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Stored email for automatic re-login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Stored password for automatic re-login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Scoped streams, oldest first; ids are unique
    #[serde(default)]
    pub streams: Vec<StreamGrant>,
    /// Previously fetched streams keyed by id
    #[serde(default)]
    pub stream_cache: BTreeMap<String, Value>,
    /// Cached representation of the user's own stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
    /// Other persisted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionState {
    /// Returns true if a non-empty session token is stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Returns the stored email and password when both are present.
    #[must_use]
    pub fn stored_credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }

    /// Returns the scoped token for a stream, if the user holds one.
    #[must_use]
    pub fn stream_token(&self, stream_id: &str) -> Option<&str> {
        self.streams
            .iter()
            .find(|s| s.id == stream_id)
            .and_then(|s| s.token.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// The earliest stream, which acts as the user's default.
    #[must_use]
    pub fn default_stream_id(&self) -> Option<&str> {
        self.streams.first().map(|s| s.id.as_str())
    }

    /// Returns a cached stream body; falsy entries count as not cached.
    #[must_use]
    pub fn cached_stream(&self, stream_id: &str) -> Option<&Value> {
        self.stream_cache.get(stream_id).filter(|v| is_truthy(v))
    }

    /// Returns the cached profile; a falsy value counts as not cached.
    #[must_use]
    pub fn cached_profile(&self) -> Option<&Value> {
        self.profile.as_ref().filter(|v| is_truthy(v))
    }

    /// Applies a partial update.
    pub fn apply(&mut self, patch: SessionPatch) {
        let SessionPatch {
            id,
            token,
            email,
            password,
            streams,
            cached_streams,
            profile,
            extra,
        } = patch;

        if let Some(id) = id {
            self.id = id;
        }
        if let Some(token) = token {
            self.token = token;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(password) = password {
            self.password = password;
        }
        if let Some(streams) = streams {
            self.streams = streams;
        }
        self.stream_cache.extend(cached_streams);
        if let Some(profile) = profile {
            self.profile = profile;
        }
        self.extra.extend(extra);
    }
}
