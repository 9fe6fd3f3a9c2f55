// --- File: crates/quincho_common/src/handlers.rs ---
//! Shared axum helpers used by the feature crates' handlers.

use axum::http::{header, HeaderMap, StatusCode};

use crate::error::{HttpStatusCode, QuinchoError};
use crate::models::Session;
use crate::services::AuthService;

/// Extract the bearer token from the `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the request's session and require it to be an admin session.
pub async fn require_admin(
    auth: &dyn AuthService,
    headers: &HeaderMap,
) -> Result<Session, QuinchoError> {
    let token = bearer_token(headers)
        .ok_or_else(|| QuinchoError::Auth("missing bearer token".to_string()))?;
    let session = auth
        .current_session(token)
        .await?
        .ok_or_else(|| QuinchoError::Auth("invalid or expired session".to_string()))?;
    if !session.is_admin {
        return Err(QuinchoError::Auth("admin privileges required".to_string()));
    }
    Ok(session)
}

/// Map a domain error to the `(status, message)` pair handlers return.
pub fn error_response(err: &QuinchoError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}
