//! Endpoint table.
//!
//! Each operation maps to one verb and path under the API root. Path
//! parameters are validated and percent-encoded before use.

use std::borrow::Cow;

use peach_domain::{DomainError, HttpMethod};
use serde::Serialize;
use serde_json::{Value, json};

use super::PeachClient;
use crate::error::ClientResult;

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// New account details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Registration {
    /// Creates a registration request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Content of a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    /// Plain text, sent as a single text message
    Text(String),
    /// A pre-built message object, sent as-is
    Message(Value),
}

impl PostContent {
    /// Message object as it appears in the post body.
    #[must_use]
    pub fn to_message(&self) -> Value {
        match self {
            Self::Text(text) => json!({ "text": text, "type": "text" }),
            Self::Message(message) => message.clone(),
        }
    }
}

impl From<&str> for PostContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PostContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for PostContent {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Message(other),
        }
    }
}

/// Validates and percent-encodes a path parameter.
pub(super) fn path_param<'a>(name: &str, value: &'a str) -> ClientResult<Cow<'a, str>> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidIdentifier(format!("{name} must not be empty")).into());
    }
    Ok(urlencoding::encode(value))
}

impl PeachClient {
    /// Logs in. A returned token is persisted together with the submitted
    /// credentials and a `login` event is published.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error if the login was rejected.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Value> {
        let body = serde_json::to_value(credentials)?;
        self.request(HttpMethod::Post, "/login", Some(body)).await
    }

    /// Creates an account. Behaves like [`PeachClient::login`] on success.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error if registration failed.
    pub async fn register(&self, registration: &Registration) -> ClientResult<Value> {
        let body = serde_json::to_value(registration)?;
        self.request(HttpMethod::Post, "/register", Some(body)).await
    }

    /// Lists the user's connections.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    pub async fn connections(&self) -> ClientResult<Value> {
        self.request(HttpMethod::Get, "/connections", None).await
    }

    /// Lists suggested streams.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    pub async fn explore(&self) -> ClientResult<Value> {
        self.request(HttpMethod::Get, "/connections/explore", None)
            .await
    }

    /// Publishes a post containing a single message.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    pub async fn post(&self, content: impl Into<PostContent>) -> ClientResult<Value> {
        let body = json!({ "message": [content.into().to_message()] });
        self.request(HttpMethod::Post, "/post", Some(body)).await
    }

    /// Likes a post.
    ///
    /// # Errors
    ///
    /// Returns [`peach_domain::DomainError::InvalidIdentifier`] for an empty
    /// id, otherwise the API or transport error.
    pub async fn like(&self, post_id: &str) -> ClientResult<Value> {
        path_param("post id", post_id)?;
        self.request(HttpMethod::Post, "/like", Some(json!({ "postId": post_id })))
            .await
    }

    /// Removes a like from a post.
    ///
    /// # Errors
    ///
    /// Returns [`peach_domain::DomainError::InvalidIdentifier`] for an empty
    /// id, otherwise the API or transport error.
    pub async fn unlike(&self, post_id: &str) -> ClientResult<Value> {
        let post_id = path_param("post id", post_id)?;
        self.request(HttpMethod::Delete, &format!("/like/postID/{post_id}"), None)
            .await
    }

    /// Updates the visibility settings of the user's own stream.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    pub async fn set_visibility(&self, visibility: Value) -> ClientResult<Value> {
        self.request(HttpMethod::Post, "/stream/visibility", Some(visibility))
            .await
    }

    /// Reads the visibility settings of the user's own stream.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    pub async fn get_visibility(&self) -> ClientResult<Value> {
        self.request(HttpMethod::Get, "/stream/visibility", None)
            .await
    }

    /// Sends a connection request to another user.
    ///
    /// # Errors
    ///
    /// Returns [`peach_domain::DomainError::InvalidIdentifier`] for an empty
    /// username, otherwise the API or transport error.
    pub async fn add_friend(&self, username: &str) -> ClientResult<Value> {
        let username = path_param("username", username)?;
        self.request(
            HttpMethod::Post,
            &format!("/stream/n/{username}/connection"),
            None,
        )
        .await
    }
}
