//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/register, /api/auth/login: public (no auth required)
/// - /api/auth/me: protected (global require_auth middleware)
pub fn router() -> Router<ServerState> {
    Router::new()
        // Public routes - no auth middleware applied
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        // Protected routes - require authentication
        .route("/api/auth/me", get(handler::me))
}
