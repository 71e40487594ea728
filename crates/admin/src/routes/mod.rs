//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check
//!
//! # Users
//! POST /api/admin/delete-user   - Delete a user's identity and profile
//! ```

pub mod api;

use axum::{Router, http::StatusCode, routing::get};

use crate::state::AppState;

/// Build the complete admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// The platform client is built before the listener binds, so a running
/// server is ready.
async fn readiness() -> StatusCode {
    StatusCode::OK
}
