//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Admin routes additionally accept the
//! pre-shared `X-Admin-Key` header as an alternate credential for operational
//! tooling that has no user account.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use waterline_core::error::CoreError;
use waterline_core::roles::{ROLE_ADMIN, ROLE_TECHNICIAN};
use waterline_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Synthetic user id carried by requests authenticated with `X-Admin-Key`.
/// No users row exists with this id; anything persisting an author must map
/// it to NULL.
pub const ADMIN_KEY_USER_ID: DbId = 0;

/// Requires the `admin` role, or a valid `X-Admin-Key` header.
///
/// A matching admin key yields a synthetic [`AuthUser`] with
/// [`ADMIN_KEY_USER_ID`] and no email. Rejects with 403 Forbidden when a
/// valid token carries a non-admin role, and 401 when neither credential
/// is present.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl RequireAdmin {
    /// Author id to persist for this request, mapping the synthetic
    /// admin-key identity to `None`.
    pub fn author_id(&self) -> Option<DbId> {
        (self.0.user_id != ADMIN_KEY_USER_ID).then_some(self.0.user_id)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(configured) = state.config.admin_api_key.as_deref() {
            let supplied = parts.headers.get("x-admin-key").and_then(|v| v.to_str().ok());
            if supplied == Some(configured) {
                return Ok(RequireAdmin(AuthUser {
                    user_id: ADMIN_KEY_USER_ID,
                    email: String::new(),
                    role: ROLE_ADMIN.to_string(),
                }));
            }
        }

        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `technician` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn staff_only(RequireTechnician(user): RequireTechnician) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTechnician(pub AuthUser);

impl FromRequestParts<AppState> for RequireTechnician {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_TECHNICIAN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Technician or Admin role required".into(),
            )));
        }
        Ok(RequireTechnician(user))
    }
}

