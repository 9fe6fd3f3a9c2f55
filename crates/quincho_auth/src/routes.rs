// --- File: crates/quincho_auth/src/routes.rs ---
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use quincho_common::services::AuthService;

use crate::handlers::{login_handler, logout_handler, session_handler, AuthState};

pub fn routes(auth: Arc<dyn AuthService>) -> Router {
    let state = AuthState { auth };
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/session", get(session_handler))
        .with_state(state)
}
