//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::api::ApiResponse;
use crate::services::DeleteUserError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Delete-user request refused or failed.
    #[error(transparent)]
    DeleteUser(#[from] DeleteUserError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::DeleteUser(e) => match e {
                DeleteUserError::MissingUserId | DeleteUserError::SelfDeletion => {
                    StatusCode::BAD_REQUEST
                }
                DeleteUserError::MissingToken | DeleteUserError::InvalidToken(_) => {
                    StatusCode::UNAUTHORIZED
                }
                DeleteUserError::NotAdmin => StatusCode::FORBIDDEN,
                DeleteUserError::RoleLookup(_)
                | DeleteUserError::IdentityDeletion(_)
                | DeleteUserError::DocumentDeletion(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::platform::PlatformError;

    fn platform_error() -> PlatformError {
        PlatformError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("expected value".to_string());
        assert_eq!(err.to_string(), "Bad request: expected value");

        let err = AppError::from(DeleteUserError::NotAdmin);
        assert_eq!(err.to_string(), "No tienes permisos de administrador");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: impl Into<AppError>) -> StatusCode {
            err.into().into_response().status()
        }

        assert_eq!(
            get_status(DeleteUserError::MissingUserId),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(DeleteUserError::SelfDeletion),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(DeleteUserError::MissingToken),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(DeleteUserError::InvalidToken(platform_error())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(DeleteUserError::NotAdmin),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(DeleteUserError::RoleLookup(platform_error())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(DeleteUserError::IdentityDeletion(platform_error())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(DeleteUserError::DocumentDeletion(platform_error())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_server_error_envelope() {
        let response =
            AppError::from(DeleteUserError::IdentityDeletion(platform_error())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"],
            "Error al eliminar de Authentication: API error: 503 - unavailable"
        );
        assert!(json.get("message").is_none());
    }
}
