//! Login and logout

use crate::core::actions::{AuthOutcome, authenticate};
use crate::core::auth::{AuthenticatedUser, Credentials};
use crate::core::error::{DashboardError, DashboardResult};
use crate::core::validation::ActionForm;
use crate::server::host::ServerHost;
use crate::server::middleware::{DASHBOARD_PATH, LOGIN_PATH, bearer_token};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub redirect_to: &'static str,
    pub user: AuthenticatedUser,
}

/// Describe the login form
///
/// GET /login
pub async fn login_page() -> Json<Value> {
    Json(json!({
        "action": LOGIN_PATH,
        "fields": ["email", "password"]
    }))
}

/// Sign in and start a session
///
/// POST /login
///
/// Rejected credentials answer 401 with `{"error": "CredentialsSignin"}`.
/// Any other provider failure is an error response.
pub async fn login(
    State(host): State<Arc<ServerHost>>,
    ActionForm(credentials): ActionForm<Credentials>,
) -> DashboardResult<Response> {
    match authenticate(host.identity.as_ref(), None, &credentials).await? {
        AuthOutcome::SignedIn(user) => {
            let session = host
                .sessions
                .issue(user)
                .map_err(|e| DashboardError::Internal(format!("session store: {:#}", e)))?;

            Ok(Json(LoginResponse {
                token: session.token,
                redirect_to: DASHBOARD_PATH,
                user: session.user,
            })
            .into_response())
        }
        AuthOutcome::Rejected(code) => {
            Ok((StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response())
        }
    }
}

/// End the session of the bearer token, if any
///
/// POST /logout
pub async fn logout(
    State(host): State<Arc<ServerHost>>,
    headers: HeaderMap,
) -> DashboardResult<Redirect> {
    if let Some(token) = bearer_token(&headers) {
        let revoked = host
            .sessions
            .revoke(token)
            .map_err(|e| DashboardError::Internal(format!("session store: {:#}", e)))?;
        tracing::debug!(revoked, "logout");
    }

    Ok(Redirect::to(LOGIN_PATH))
}
