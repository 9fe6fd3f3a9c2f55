// --- File: crates/quincho_auth/src/service.rs ---
//! Session-token authentication backed by the configured admin accounts.
//!
//! Passwords are compared as SHA-256 digests so the config never carries
//! plaintext. Tokens are HMAC-SHA256 over the email plus a fresh nonce,
//! keyed with the session secret, and live server-side in a map so logout
//! can revoke them.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use quincho_common::error::{auth_error, internal_error, QuinchoError};
use quincho_common::models::Session;
use quincho_common::services::{AuthService, BoxFuture};
use quincho_config::{AdminAccount, AuthConfig};

type HmacSha256 = Hmac<Sha256>;

/// Sessions expire half a day after login.
const SESSION_HOURS: i64 = 12;

pub struct SessionAuthService {
    secret: String,
    admins: Vec<AdminAccount>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionAuthService {
    pub fn new(config: &AuthConfig) -> Self {
        SessionAuthService {
            secret: config.session_secret.clone(),
            admins: config.admins.clone(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn derive_token(&self, email: &str) -> Result<String, QuinchoError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| internal_error(format!("invalid session secret: {e}")))?;
        mac.update(email.as_bytes());
        mac.update(b":");
        mac.update(Uuid::new_v4().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn verify_credentials(&self, email: &str, password: &str) -> Option<&AdminAccount> {
        let account = self
            .admins
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))?;
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        if digest.eq_ignore_ascii_case(&account.password_sha256) {
            Some(account)
        } else {
            None
        }
    }
}

impl AuthService for SessionAuthService {
    fn login(&self, email: &str, password: &str) -> BoxFuture<'_, Session, QuinchoError> {
        let email = email.to_string();
        let password = password.to_string();
        Box::pin(async move {
            // Same message for unknown account and bad password.
            let account = self
                .verify_credentials(&email, &password)
                .ok_or_else(|| auth_error("invalid email or password"))?;

            let session = Session {
                token: self.derive_token(&account.email)?,
                email: account.email.clone(),
                is_admin: true,
                expires_at: Utc::now() + Duration::hours(SESSION_HOURS),
            };

            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| internal_error("session lock poisoned"))?;
            sessions.insert(session.token.clone(), session.clone());
            info!(email = %session.email, "admin session opened");
            Ok(session)
        })
    }

    fn logout(&self, token: &str) -> BoxFuture<'_, (), QuinchoError> {
        let token = token.to_string();
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| internal_error("session lock poisoned"))?;
            if let Some(session) = sessions.remove(&token) {
                info!(email = %session.email, "admin session closed");
            } else {
                warn!("logout for unknown session token");
            }
            Ok(())
        })
    }

    fn current_session(&self, token: &str) -> BoxFuture<'_, Option<Session>, QuinchoError> {
        let token = token.to_string();
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| internal_error("session lock poisoned"))?;
            match sessions.get(&token) {
                Some(session) if session.expires_at > Utc::now() => Ok(Some(session.clone())),
                Some(_) => {
                    // Expired entries are dropped on first sight.
                    sessions.remove(&token);
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }
}
