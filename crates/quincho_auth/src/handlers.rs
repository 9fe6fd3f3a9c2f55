// --- File: crates/quincho_auth/src/handlers.rs ---
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use quincho_common::handlers::{bearer_token, error_response};
use quincho_common::models::Session;
use quincho_common::services::AuthService;

#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<dyn AuthService>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login_handler(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Session>, (StatusCode, String)> {
    debug!(email = %payload.email, "login attempt");
    state
        .auth
        .login(&payload.email, &payload.password)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

pub async fn logout_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, String)> {
    let Some(token) = bearer_token(&headers) else {
        // Logout without a token is a no-op.
        return Ok(StatusCode::NO_CONTENT);
    };
    state
        .auth
        .logout(token)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| error_response(&e))
}

pub async fn session_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<Option<Session>>, (StatusCode, String)> {
    let Some(token) = bearer_token(&headers) else {
        return Ok(Json(None));
    };
    state
        .auth
        .current_session(token)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}
