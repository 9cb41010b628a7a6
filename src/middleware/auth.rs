use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Session key holding the logged-in user marker.
pub const CURRENT_USER_KEY: &str = "current_user";

/// Authenticated-user marker stored in the session at login. Extracting it in
/// a handler is what protects a route: no marker, no access.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

pub fn ensure_admin(user: &CurrentUser) -> Result<(), AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The session is put into extensions by SessionManagerLayer.
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session layer missing")))?;

        let user = session
            .get::<CurrentUser>(CURRENT_USER_KEY)
            .await
            .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;

        user.ok_or(AppError::Unauthorized)
    }
}
