//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role or the `X-Admin-Key` header
/// (enforced by handler extractors).
///
/// ```text
/// GET    /admins       -> list_admins
/// POST   /admins       -> create_admin
/// GET    /users        -> list_users (?role=)
/// GET    /users/{id}   -> get_user
/// DELETE /users/{id}   -> deactivate_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admins", get(admin::list_admins).post(admin::create_admin))
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user).delete(admin::deactivate_user),
        )
}
