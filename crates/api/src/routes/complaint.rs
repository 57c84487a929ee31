//! Route definitions for the `/complaints` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::complaint;
use crate::state::AppState;

/// Routes mounted at `/complaints`.
///
/// Role scoping happens in the handlers: residents only reach their own
/// complaints, technicians the ones assigned to them.
///
/// ```text
/// GET    /              -> list_complaints
/// POST   /              -> file_complaint
/// GET    /{id}          -> get_complaint
/// PUT    /{id}          -> update_complaint
/// DELETE /{id}          -> delete_complaint
/// PATCH  /{id}/status   -> update_status (technician/admin)
/// POST   /{id}/assign   -> assign_technician (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(complaint::list_complaints).post(complaint::file_complaint),
        )
        .route(
            "/{id}",
            get(complaint::get_complaint)
                .put(complaint::update_complaint)
                .delete(complaint::delete_complaint),
        )
        .route("/{id}/status", patch(complaint::update_status))
        .route("/{id}/assign", post(complaint::assign_technician))
}
