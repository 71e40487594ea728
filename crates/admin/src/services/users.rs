//! Admin-initiated user deletion.
//!
//! Removes both the identity record and the `users/{uid}` profile document.
//! The caller must present an ID token belonging to a user whose profile
//! carries the `admin` role.

use gmexpress_core::UserId;
use thiserror::Error;
use tracing::instrument;

use crate::platform::{DocumentStore, IdentityProvider, PlatformError};

/// Reasons a delete-user request is refused or fails.
///
/// `Display` strings are user-facing.
#[derive(Debug, Error)]
pub enum DeleteUserError {
    #[error("Se requiere el ID del usuario")]
    MissingUserId,

    #[error("Se requiere token de autenticación")]
    MissingToken,

    #[error("Token inválido o expirado")]
    InvalidToken(#[source] PlatformError),

    #[error("No tienes permisos de administrador")]
    NotAdmin,

    #[error("No puedes eliminarte a ti mismo")]
    SelfDeletion,

    #[error("Error al verificar permisos: {0}")]
    RoleLookup(#[source] PlatformError),

    #[error("Error al eliminar de Authentication: {0}")]
    IdentityDeletion(#[source] PlatformError),

    #[error("Usuario eliminado de Auth pero error en Firestore: {0}")]
    DocumentDeletion(#[source] PlatformError),
}

impl DeleteUserError {
    /// Whether the failure happened on the platform side rather than in the
    /// request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::RoleLookup(_) | Self::IdentityDeletion(_) | Self::DocumentDeletion(_)
        )
    }
}

/// Blank strings count as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Delete `user_id` on behalf of the holder of `admin_token`.
///
/// Checks run in a fixed order so each refusal maps to one status code:
/// missing target, missing token, bad token, caller not admin, then
/// self-deletion. A target with no identity record is still cleaned up in
/// the document database.
///
/// # Errors
///
/// Returns the first [`DeleteUserError`] encountered.
#[instrument(skip_all, fields(target_uid = user_id.unwrap_or_default()))]
pub async fn delete_user(
    identity: &dyn IdentityProvider,
    documents: &dyn DocumentStore,
    user_id: Option<&str>,
    admin_token: Option<&str>,
) -> Result<UserId, DeleteUserError> {
    let target = non_blank(user_id)
        .map(UserId::new)
        .ok_or(DeleteUserError::MissingUserId)?;
    let token = non_blank(admin_token).ok_or(DeleteUserError::MissingToken)?;

    let caller = identity
        .verify_id_token(token)
        .await
        .map_err(DeleteUserError::InvalidToken)?;

    let profile = documents
        .get_user(&caller.uid)
        .await
        .map_err(DeleteUserError::RoleLookup)?;
    if !profile.as_ref().is_some_and(|doc| doc.is_admin()) {
        tracing::warn!(caller = %caller.uid, "Delete-user refused: caller is not an admin");
        return Err(DeleteUserError::NotAdmin);
    }

    if target == caller.uid {
        return Err(DeleteUserError::SelfDeletion);
    }

    match identity.delete_user(&target).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::info!(uid = %target, "No identity record, removing profile only");
        }
        Err(e) => {
            tracing::error!(uid = %target, error = %e, "Failed to delete identity record");
            return Err(DeleteUserError::IdentityDeletion(e));
        }
    }

    documents.delete_user(&target).await.map_err(|e| {
        tracing::error!(uid = %target, error = %e, "Failed to delete profile document");
        DeleteUserError::DocumentDeletion(e)
    })?;

    tracing::info!(uid = %target, admin = %caller.uid, "User deleted");
    Ok(target)
}
