use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{
    entity::users::Entity as Users,
    error::{AppError, AppResult},
    models::Role,
    policy::Operation,
    state::AppState,
};
use sea_orm::EntityTrait;

/// Identity taken from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Gate on the role claimed by the token. No database access.
pub fn ensure_allowed(user: &AuthUser, operation: Operation) -> Result<(), AppError> {
    if !operation.permits(user.role) {
        tracing::debug!(user_id = %user.user_id, role = %user.role, ?operation, "role not permitted");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// The gate every service calls: the token claim first, then for mutating
/// operations the stored role as well.
pub async fn authorize(state: &AppState, user: &AuthUser, operation: Operation) -> AppResult<()> {
    ensure_allowed(user, operation)?;
    if operation.is_mutating() {
        ensure_current_role(state, user, operation).await?;
    }
    Ok(())
}

/// Gate on the caller's role as currently stored, so a role change or a
/// deleted account takes effect before the token expires.
async fn ensure_current_role(
    state: &AppState,
    user: &AuthUser,
    operation: Operation,
) -> AppResult<Role> {
    let stored = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let stored = match stored {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("User does not exist".into())),
    };
    let role: Role = stored
        .role
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;
    if !operation.permits(role) {
        tracing::info!(user_id = %user.user_id, claimed = %user.role, stored = %role, "stale role claim rejected");
        return Err(AppError::Forbidden);
    }
    Ok(role)
}

/// Pull the raw token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = bearer_token(auth_str)
            .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

        let claims = state.jwt.decode(token)?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
