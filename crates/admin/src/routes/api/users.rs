//! User management API handlers.

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use serde::Deserialize;
use tracing::instrument;

use super::ApiResponse;
use crate::{error::AppError, services, state::AppState};

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/delete-user", post(delete_user))
}

/// Request for deleting a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub admin_token: Option<String>,
}

/// Delete a user's identity record and profile document.
///
/// The body is parsed as JSON whatever its `Content-Type`.
///
/// # Errors
///
/// Returns an error if the body is not JSON, the caller is not an admin, or
/// a platform call fails.
#[instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, AppError> {
    let body: DeleteUserRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    services::delete_user(
        state.identity(),
        state.documents(),
        body.user_id.as_deref(),
        body.admin_token.as_deref(),
    )
    .await?;

    Ok(Json(ApiResponse::success(
        "Usuario eliminado completamente de Authentication y Firestore",
    )))
}
