//! Admin authentication and sessions
//!
//! Secrets are never stored: the configuration holds hex SHA-256 digests of
//! the trimmed secret and inputs are hashed the same way before comparing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AdminConfig, DEFAULT_ADMIN_SECRET_HASH};
use crate::metrics::metrics;
use crate::storage::{LocalStore, StorageError, ADMIN_SESSION_KEY, ADMIN_USER_KEY};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credenciais inválidas. Verifique e tente novamente.")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Hex SHA-256 of the trimmed input
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.trim().as_bytes()))
}

/// Compare two hex digests without short-circuiting on the first mismatch
fn digest_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

fn configured_secret_hash(config: &AdminConfig) -> String {
    let configured = config.shared_secret_hash.trim();
    if configured.is_empty() {
        DEFAULT_ADMIN_SECRET_HASH.to_string()
    } else {
        configured.to_ascii_lowercase()
    }
}

/// Check the shared admin secret; blank input is always rejected
pub fn verify_admin_secret(config: &AdminConfig, secret: &str) -> bool {
    if secret.trim().is_empty() {
        return false;
    }
    digest_eq(&hash_secret(secret), &configured_secret_hash(config))
}

/// Check an email and password against the configured admin account
///
/// The email match ignores case. Fails when either input is blank or no
/// account is configured.
pub fn verify_admin_credentials(config: &AdminConfig, email: &str, password: &str) -> bool {
    if email.trim().is_empty() || password.trim().is_empty() {
        return false;
    }
    let (Some(admin_email), Some(password_hash)) = (&config.email, &config.password_hash) else {
        return false;
    };
    if admin_email.trim().is_empty() || password_hash.trim().is_empty() {
        return false;
    }

    let email_ok = email.trim().to_lowercase() == admin_email.trim().to_lowercase();
    let password_ok = digest_eq(&hash_secret(password), &password_hash.trim().to_ascii_lowercase());
    email_ok && password_ok
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub email: String,
}

/// Persisted admin session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(duration_hours: i64) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + Duration::hours(duration_hours),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Login state of the admin area, stored in the local store
#[derive(Debug, Clone)]
pub struct AdminAuth {
    config: AdminConfig,
    store: LocalStore,
}

impl AdminAuth {
    pub fn new(config: AdminConfig, store: LocalStore) -> Self {
        Self { config, store }
    }

    fn start_session(&self, user: AdminUser) -> Result<AdminSession, AuthError> {
        let session = AdminSession::new(self.config.session_hours);
        self.store.set(ADMIN_SESSION_KEY, &session)?;
        self.store.set(ADMIN_USER_KEY, &user)?;
        metrics().admin_logins.with_label_values(&["success"]).inc();
        tracing::info!(email = %user.email, expires_at = %session.expires_at, "Admin session started");
        Ok(session)
    }

    fn reject(&self) -> AuthError {
        metrics().admin_logins.with_label_values(&["rejected"]).inc();
        tracing::warn!("Admin login rejected");
        AuthError::InvalidCredentials
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        if !verify_admin_credentials(&self.config, email, password) {
            return Err(self.reject());
        }
        self.start_session(AdminUser {
            email: email.trim().to_lowercase(),
        })
    }

    /// Log in with the shared secret instead of an account
    pub fn login_with_secret(&self, secret: &str) -> Result<AdminSession, AuthError> {
        if !verify_admin_secret(&self.config, secret) {
            return Err(self.reject());
        }
        self.start_session(AdminUser {
            email: "admin".to_string(),
        })
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(ADMIN_SESSION_KEY)?;
        self.store.remove(ADMIN_USER_KEY)?;
        tracing::info!("Admin session ended");
        Ok(())
    }

    /// Valid session at `now`; expired or unreadable sessions are removed
    pub fn current_session_at(&self, now: DateTime<Utc>) -> Result<Option<AdminSession>, AuthError> {
        let session = match self.store.get::<AdminSession>(ADMIN_SESSION_KEY) {
            Ok(session) => session,
            Err(StorageError::Corrupt { key, source }) => {
                tracing::warn!(key = %key, error = %source, "Discarding unreadable admin session");
                self.logout()?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match session {
            Some(session) if session.is_expired_at(now) => {
                tracing::info!("Admin session expired");
                self.logout()?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    pub fn current_session(&self) -> Result<Option<AdminSession>, AuthError> {
        self.current_session_at(Utc::now())
    }

    /// Logged-in user, if the session is still valid
    pub fn whoami(&self) -> Result<Option<AdminUser>, AuthError> {
        if self.current_session()?.is_none() {
            return Ok(None);
        }
        Ok(self.store.get::<AdminUser>(ADMIN_USER_KEY).unwrap_or(None))
    }

    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.current_session()?.is_some())
    }
}
