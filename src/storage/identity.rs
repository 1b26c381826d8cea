//! Local identity provider backed by configured accounts

use crate::config::SeedUser;
use crate::core::auth::{AuthError, AuthenticatedUser, Credentials, IdentityProvider};
use crate::core::error::ConfigError;
use crate::storage::demo;
use anyhow::{Result, anyhow};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Hash a password into an argon2id PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    let salt =
        SaltString::encode_b64(&bytes).map_err(|e| anyhow!("Failed to encode salt: {}", e))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Check a password against a PHC string
///
/// A malformed PHC string never verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn is_argon2_phc(phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| parsed.algorithm.as_str().starts_with("argon2") && parsed.hash.is_some())
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
struct Account {
    user: AuthenticatedUser,
    password_hash: String,
}

impl From<SeedUser> for Account {
    fn from(seed: SeedUser) -> Self {
        Self {
            user: AuthenticatedUser {
                id: Uuid::new_v4(),
                name: seed.name,
                email: seed.email,
            },
            password_hash: seed.password,
        }
    }
}

/// Identity provider over a fixed set of accounts
///
/// Emails are matched case-insensitively. Every rejection, whatever the
/// reason, is reported as [`AuthError::CredentialsSignin`].
#[derive(Clone, Default)]
pub struct StaticIdentityProvider {
    accounts: Arc<HashMap<String, Account>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configured accounts, rejecting anything but argon2 PHC strings
    pub fn from_seed(users: &[SeedUser]) -> Result<Self, ConfigError> {
        let mut accounts = HashMap::with_capacity(users.len());

        for seed in users {
            if !is_argon2_phc(&seed.password) {
                return Err(ConfigError::InvalidValue {
                    field: format!("users[{}].password", seed.email),
                    value: "<redacted>".to_string(),
                    message: "expected an argon2 PHC string ($argon2id$...)".to_string(),
                });
            }

            accounts.insert(seed.email.to_lowercase(), Account::from(seed.clone()));
        }

        Ok(Self {
            accounts: Arc::new(accounts),
        })
    }

    /// Provider holding only the demo account
    pub fn with_demo_user() -> Self {
        let demo = demo::user();
        let accounts = HashMap::from([(demo.email.clone(), Account::from(demo))]);

        Self {
            accounts: Arc::new(accounts),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError> {
        if credentials.validate().is_err() {
            tracing::debug!("sign-in rejected: malformed credentials");
            return Err(AuthError::CredentialsSignin);
        }

        let Some(account) = self.accounts.get(&credentials.email.to_lowercase()) else {
            tracing::debug!(email = %credentials.email, "sign-in rejected: unknown account");
            return Err(AuthError::CredentialsSignin);
        };

        if !verify_password(&credentials.password, &account.password_hash) {
            tracing::debug!(email = %credentials.email, "sign-in rejected: wrong password");
            return Err(AuthError::CredentialsSignin);
        }

        tracing::info!(user_id = %account.user.id, "user signed in");
        Ok(account.user.clone())
    }
}
