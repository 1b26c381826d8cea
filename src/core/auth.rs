//! Authentication for the dashboard
//!
//! Provides:
//! - The [`IdentityProvider`] seam that verifies credentials
//! - A structured [`AuthError`] taxonomy, so callers classify failures by kind
//! - An in-memory [`SessionStore`] issuing opaque bearer tokens
//! - The [`AuthContext`] attached to each request by the session middleware

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use validator::Validate;

/// Failure kinds reported by an identity provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The credentials were rejected (malformed, unknown user, wrong password)
    #[error("CredentialsSignin")]
    CredentialsSignin,

    /// The provider could not be reached or answered unexpectedly
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider is misconfigured
    #[error("identity provider configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::CredentialsSignin => "CREDENTIALS_SIGNIN",
            AuthError::Unavailable(_) => "AUTH_PROVIDER_UNAVAILABLE",
            AuthError::Configuration(_) => "AUTH_PROVIDER_CONFIGURATION",
        }
    }
}

/// Credentials submitted on the login form
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Please enter a valid email address."))]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// A user the identity provider vouched for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Verifies credentials on behalf of the dashboard
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError>;
}

/// Authorization context extracted from a request
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Request carried a live session
    User { session: Session },

    /// No session (public access)
    Anonymous,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User { .. })
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            AuthContext::User { session } => Some(&session.user),
            AuthContext::Anonymous => None,
        }
    }
}

/// A signed-in user and when the session started
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: AuthenticatedUser,
    pub issued_at: DateTime<Utc>,
}

/// In-memory session registry
///
/// Tokens are 32 random bytes, hex encoded. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `user` and return its token
    pub fn issue(&self, user: AuthenticatedUser) -> Result<Session> {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);

        let session = Session {
            token: hex::encode(bytes),
            user,
            issued_at: Utc::now(),
        };

        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        sessions.insert(session.token.clone(), session.clone());

        Ok(session)
    }

    pub fn get(&self, token: &str) -> Result<Option<Session>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(sessions.get(token).cloned())
    }

    /// Returns whether a session was removed
    pub fn revoke(&self, token: &str) -> Result<bool> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(sessions.remove(token).is_some())
    }
}
