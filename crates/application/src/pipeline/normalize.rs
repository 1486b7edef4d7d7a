//! Incoming response normalization.

use peach_domain::{
    ApiRequest, ApiResponse, ErrorRepr, SessionPatch, SessionState, StatusCode, StreamGrant,
    is_truthy,
};
use serde_json::Value;

/// State mutations a response calls for, in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionEffects {
    /// Patches to apply to the store, in order
    pub patches: Vec<SessionPatch>,
    /// Whether a `login` notification is due once the patches are applied
    pub login: bool,
}

impl SessionEffects {
    /// Returns true if the response calls for no state change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && !self.login
    }
}

/// Normalizes a response and works out the session changes it implies.
///
/// - 401: the error becomes `"Unauthorized"` and the body is not read.
/// - An error in the body becomes the canonical message; a 200 status is
///   replaced by the payload's code, or 520 without one.
/// - A truthy nested `data` field replaces the payload (one level).
/// - `streams` in the payload are persisted along with the first stream's
///   id as the user id.
/// - A `token` different from the stored one is persisted together with the
///   submitted request body, and a login notification is requested.
pub fn normalize_response(
    response: &mut ApiResponse,
    request: &ApiRequest,
    state: &SessionState,
) -> SessionEffects {
    let mut effects = SessionEffects::default();

    if response.status == StatusCode::UNAUTHORIZED.as_u16() {
        response.error = Some("Unauthorized".to_string());
        return effects;
    }

    let Some(body) = response.data.take() else {
        return effects;
    };

    if let Some(repr) = ErrorRepr::detect(&body) {
        response.error = Some(repr.message());
        if response.status == StatusCode::OK.as_u16() {
            let corrected = repr.corrected_status();
            tracing::debug!(
                request_id = %request.id,
                status = corrected,
                "application error reported with 200, correcting status"
            );
            response.status = corrected;
        }
    }

    let data = match body.get("data") {
        Some(nested) if is_truthy(nested) => nested.clone(),
        _ => body,
    };

    if let Some(patch) = streams_patch(&data, request) {
        effects.patches.push(patch);
    }

    if let Some(token) = data.get("token").and_then(Value::as_str).filter(|t| !t.is_empty())
        && state.token.as_deref() != Some(token)
    {
        let echoed = request
            .original_body
            .as_ref()
            .map_or_else(SessionPatch::new, |body| SessionPatch::new().echo(body));
        effects.patches.push(echoed.token(token));
        effects.login = true;
    }

    response.data = Some(data);
    effects
}

fn streams_patch(data: &Value, request: &ApiRequest) -> Option<SessionPatch> {
    let streams = data.get("streams").filter(|s| is_truthy(s))?;
    let Some(entries) = streams.as_array() else {
        tracing::warn!(request_id = %request.id, "ignoring non-list streams payload");
        return None;
    };

    let streams: Vec<StreamGrant> = entries
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(grant) => Some(grant),
            Err(error) => {
                tracing::warn!(request_id = %request.id, %error, "skipping malformed stream entry");
                None
            }
        })
        .collect();

    let first_id = streams.first().map(|s| s.id.clone());
    let patch = SessionPatch::new().streams(streams);
    Some(match first_id {
        Some(id) => patch.id(id),
        None => patch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn respond(status: u16, body: Value) -> ApiResponse {
        ApiResponse::new(status, Some(body))
    }

    fn apply(state: &mut SessionState, effects: SessionEffects) {
        for patch in effects.patches {
            state.apply(patch);
        }
    }

    #[test]
    fn test_unauthorized_ignores_body() {
        let mut res = respond(401, json!({ "token": "T9", "streams": [{ "id": "x" }] }));
        let effects = normalize_response(&mut res, &ApiRequest::get("/api/x"), &SessionState::default());
        assert_eq!(res.error.as_deref(), Some("Unauthorized"));
        assert_eq!(res.status, 401);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_success_zero_corrects_status() {
        let mut res = respond(200, json!({ "success": 0 }));
        let effects = normalize_response(&mut res, &ApiRequest::get("/api/x"), &SessionState::default());
        assert_eq!(res.error.as_deref(), Some("Unspecified error"));
        assert_eq!(res.status, 520);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_embedded_code_replaces_200() {
        let mut res = respond(200, json!({ "error": { "Message": "No such stream", "Code": 404 } }));
        normalize_response(&mut res, &ApiRequest::get("/api/x"), &SessionState::default());
        assert_eq!(res.error.as_deref(), Some("No such stream"));
        assert_eq!(res.status, 404);
    }

    #[test]
    fn test_non_200_status_is_not_corrected() {
        let mut res = respond(400, json!({ "error": { "message": "Bad input", "code": 422 } }));
        normalize_response(&mut res, &ApiRequest::get("/api/x"), &SessionState::default());
        assert_eq!(res.error.as_deref(), Some("Bad input"));
        assert_eq!(res.status, 400);
    }

    #[test]
    fn test_nested_data_is_unwrapped_once() {
        let mut res = respond(200, json!({ "success": 1, "data": { "data": { "deep": true } } }));
        normalize_response(&mut res, &ApiRequest::get("/api/x"), &SessionState::default());
        assert_eq!(res.data, Some(json!({ "data": { "deep": true } })));
        assert_eq!(
            res.original_data,
            Some(json!({ "success": 1, "data": { "data": { "deep": true } } }))
        );
    }

    #[test]
    fn test_streams_set_user_id() {
        let mut res = respond(200, json!({ "data": { "streams": [
            { "id": "u1", "token": "st1", "name": "jo" },
            { "id": "u2", "token": "st2" }
        ] } }));
        let mut state = SessionState::default();
        let effects = normalize_response(&mut res, &ApiRequest::get("/api/x"), &state);
        assert!(!effects.login);
        apply(&mut state, effects);
        assert_eq!(state.id.as_deref(), Some("u1"));
        assert_eq!(state.stream_token("u2"), Some("st2"));
    }

    #[test]
    fn test_new_token_echoes_credentials() {
        let mut req = ApiRequest::post("/api/login");
        req.original_body = Some(json!({ "email": "a@b.c", "password": "pw" }));
        let mut state = SessionState {
            token: Some("T1".to_string()),
            ..SessionState::default()
        };
        let mut res = respond(200, json!({ "success": 1, "data": { "token": "T2", "streams": [{ "id": "u1", "token": "s" }] } }));
        let effects = normalize_response(&mut res, &req, &state);
        assert!(effects.login);
        assert_eq!(effects.patches.len(), 2);
        apply(&mut state, effects);
        assert_eq!(state.token.as_deref(), Some("T2"));
        assert_eq!(state.stored_credentials(), Some(("a@b.c", "pw")));
        assert_eq!(state.id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_same_token_is_not_a_login() {
        let state = SessionState {
            token: Some("T1".to_string()),
            ..SessionState::default()
        };
        let mut res = respond(200, json!({ "token": "T1" }));
        let effects = normalize_response(&mut res, &ApiRequest::get("/api/x"), &state);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_missing_body_is_untouched() {
        let mut res = ApiResponse::new(204, None);
        let effects = normalize_response(&mut res, &ApiRequest::get("/api/x"), &SessionState::default());
        assert_eq!(res, ApiResponse::new(204, None));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_malformed_stream_entries_are_skipped() {
        let mut res = respond(200, json!({ "streams": [
            { "token": "no-id" },
            { "id": "u2", "token": "st2" },
            { "id": 3, "token": "st3" }
        ] }));
        let mut state = SessionState::default();
        let effects = normalize_response(&mut res, &ApiRequest::get("/api/x"), &state);
        apply(&mut state, effects);
        assert_eq!(state.id.as_deref(), Some("u2"));
        assert_eq!(state.streams.len(), 2);
        assert_eq!(state.stream_token("3"), Some("st3"));
    }

    #[test]
    fn test_empty_streams_keep_user_id() {
        let mut res = respond(200, json!({ "streams": [] }));
        let mut state = SessionState {
            id: Some("u1".to_string()),
            ..SessionState::default()
        };
        let effects = normalize_response(&mut res, &ApiRequest::get("/api/x"), &state);
        apply(&mut state, effects);
        assert_eq!(state.id.as_deref(), Some("u1"));
        assert!(state.streams.is_empty());
    }
}
