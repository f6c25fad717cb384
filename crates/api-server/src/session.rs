//! Session identification via the `SESSION` cookie.
//!
//! Requests without a usable cookie get a fresh UUID v4 session id, which is
//! returned to the client in `Set-Cookie`. Expiry is left to the counter
//! store, which drops idle session state after its TTL.

use axum::extract::Request;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "SESSION";

/// Maximum accepted cookie value length.
const MAX_SESSION_ID_LEN: usize = 128;

/// Session identifier made available to handlers as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Middleware resolving or issuing the session id for every request.
pub async fn session_layer(mut request: Request, next: Next) -> Response {
    let (session_id, issued) = match session_from_headers(request.headers()) {
        Some(id) => (id, false),
        None => {
            let id = Uuid::new_v4().to_string();
            debug!(session_id = %id, "Issuing new session");
            (id, true)
        }
    };

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));
    let mut response = next.run(request).await;

    if issued {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Extract a well-formed session id from the `Cookie` headers.
fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| is_valid_session_id(value))
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
