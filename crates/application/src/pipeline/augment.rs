//! Outgoing request augmentation.

use std::sync::LazyLock;

use peach_domain::{ApiRequest, RequestBody, SessionState};
use regex::Regex;

/// Name of the credential header.
pub const AUTHORIZATION: &str = "Authorization";

#[allow(clippy::expect_used)] // literal pattern
static STREAM_ID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/stream/id/([^/?#]+)(?:[/?#]|$)").expect("stream id pattern is valid")
});

#[allow(clippy::expect_used)] // literal pattern
static VISIBILITY_ENDPOINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/stream/visibility(?:[?#].*)?$").expect("visibility pattern is valid")
});

/// Finds the stream a request is scoped to.
///
/// The id comes from a `/stream/id/<id>` path segment. Visibility requests
/// carry no id and fall back to the user's earliest stream.
#[must_use]
pub fn scoped_stream_id(url: &str, state: &SessionState) -> Option<String> {
    if let Some(captures) = STREAM_ID_SEGMENT.captures(url) {
        let raw = captures.get(1)?.as_str();
        let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
        return Some(decoded);
    }
    if VISIBILITY_ENDPOINT.is_match(url) {
        return state.default_stream_id().map(str::to_string);
    }
    None
}

/// Attaches credentials and content headers to an outgoing request.
///
/// A scoped stream token always wins over the session token. The session
/// token is only used when no Authorization header is set yet. Structured
/// bodies are serialized to JSON text; the structured value is kept in
/// `original_body`. Text bodies are left alone.
pub fn augment_request(request: &mut ApiRequest, state: &SessionState) {
    let scoped_token = scoped_stream_id(&request.url, state)
        .as_deref()
        .and_then(|id| state.stream_token(id))
        .map(str::to_string);

    if let Some(token) = scoped_token {
        request.headers.set(AUTHORIZATION, bearer(&token));
    }

    if !request.headers.contains(AUTHORIZATION)
        && let Some(token) = state.token.as_deref().filter(|t| !t.is_empty())
    {
        request.headers.set(AUTHORIZATION, bearer(token));
    }

    request.headers.set("Accept", "application/json");

    if let RequestBody::Json(value) = &request.body {
        let original = value.clone();
        request.body = RequestBody::Text(original.to_string());
        request.headers.set("Content-Type", "application/json");
        request.original_body = Some(original);
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
