//! Session middleware
//!
//! Resolves the bearer token of every request into an [`AuthContext`]
//! extension and guards the dashboard:
//!
//! - `/dashboard` and everything below it requires a live session, otherwise
//!   the client is redirected to `/login`
//! - `/login` with a live session redirects to `/dashboard`
//!
//! Asset and API paths are not inspected at all.

use crate::core::auth::AuthContext;
use crate::server::host::ServerHost;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

const SKIPPED_PREFIXES: &[&str] = &["/api", "/_next/static", "/_next/image"];

/// Whether the session guard applies to `path`
pub fn is_guarded(path: &str) -> bool {
    !(SKIPPED_PREFIXES.iter().any(|p| path.starts_with(p)) || path.ends_with(".png"))
}

fn is_dashboard(path: &str) -> bool {
    path == DASHBOARD_PATH
        || path
            .strip_prefix(DASHBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn resolve_session(host: &ServerHost, headers: &HeaderMap) -> AuthContext {
    let Some(token) = bearer_token(headers) else {
        return AuthContext::Anonymous;
    };

    match host.sessions.get(token) {
        Ok(Some(session)) => AuthContext::User { session },
        Ok(None) => AuthContext::Anonymous,
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed");
            AuthContext::Anonymous
        }
    }
}

pub async fn session_middleware(
    State(host): State<Arc<ServerHost>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let auth = resolve_session(&host, req.headers());

    if is_guarded(&path) {
        if is_dashboard(&path) && !auth.is_authenticated() {
            tracing::debug!(path = %path, "no session, redirecting to login");
            return Redirect::temporary(LOGIN_PATH).into_response();
        }

        if path == LOGIN_PATH && auth.is_authenticated() {
            return Redirect::temporary(DASHBOARD_PATH).into_response();
        }
    }

    req.extensions_mut().insert(auth);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_guard_matcher() {
        assert!(is_guarded("/dashboard"));
        assert!(is_guarded("/dashboard/invoices"));
        assert!(is_guarded("/login"));
        assert!(is_guarded("/"));

        assert!(!is_guarded("/api/invoices"));
        assert!(!is_guarded("/_next/static/chunk.js"));
        assert!(!is_guarded("/_next/image"));
        assert!(!is_guarded("/customers/lee-robinson.png"));
        assert!(!is_guarded("/dashboard/logo.png"));
    }

    #[test]
    fn test_dashboard_paths() {
        assert!(is_dashboard("/dashboard"));
        assert!(is_dashboard("/dashboard/invoices/create"));
        assert!(!is_dashboard("/dashboards"));
        assert!(!is_dashboard("/login"));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  xyz "));
        assert_eq!(bearer_token(&headers), Some("xyz"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
