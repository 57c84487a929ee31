//! Route definitions for the `/technicians` staff directory.

use axum::routing::get;
use axum::Router;

use crate::handlers::technician;
use crate::state::AppState;

/// Routes mounted at `/technicians`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /        -> list_technicians
/// POST   /        -> enrol_technician
/// GET    /{id}    -> get_technician
/// PUT    /{id}    -> update_technician
/// DELETE /{id}    -> retire_technician
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(technician::list_technicians).post(technician::enrol_technician),
        )
        .route(
            "/{id}",
            get(technician::get_technician)
                .put(technician::update_technician)
                .delete(technician::retire_technician),
        )
}
