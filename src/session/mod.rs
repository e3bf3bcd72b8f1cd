//! Session identity
//!
//! Every caller is identified by an opaque UUID carried in a cookie. The
//! cookie is routing glue: this middleware resolves or mints the identity
//! once per request and the core components receive it as an explicit
//! [`SessionId`]. Values that do not parse as UUIDs are discarded and
//! replaced, so a forged cookie can never name a filesystem path.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub mod sweeper;
pub mod workspace;

pub use workspace::{WorkspaceKind, Workspaces};

/// Cookie carrying the session identity
pub const SESSION_COOKIE: &str = "pdfdesk_session";

/// Opaque per-visitor identity; maps one-to-one to a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(SESSION_COOKIE) {
                if let Some(id) = parts.next().and_then(SessionId::parse) {
                    return Some(id);
                }
            }
        }
    }
    None
}

/// Resolve the caller's session identity, minting one on first contact.
///
/// The identity is inserted into request extensions for handlers; a
/// `Set-Cookie` header is appended only when a fresh identity was minted.
pub async fn session_layer(mut request: Request, next: Next) -> Response {
    let (session, minted) = match session_from_headers(request.headers()) {
        Some(id) => (id, false),
        None => (SessionId::new(), true),
    };
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if minted {
        let cookie = format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = cookie.parse() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn resolves_a_valid_cookie() {
        let id = SessionId::new();
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}={id}"));
        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn resolves_among_multiple_cookies() {
        let id = SessionId::new();
        let headers =
            headers_with_cookie(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=en"));
        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn rejects_a_forged_value() {
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}=../../etc"));
        assert_eq!(session_from_headers(&headers), None);
    }

    #[test]
    fn missing_cookie_resolves_to_none() {
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }
}
