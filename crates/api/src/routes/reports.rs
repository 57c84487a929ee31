//! Route definitions for the `/reports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET /summary          -> summary
/// GET /workload         -> workload
/// GET /resolution-time  -> resolution_time (?from=&to=)
/// GET /daily            -> daily (?from=&to=, default last 30 days)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(reports::summary))
        .route("/workload", get(reports::workload))
        .route("/resolution-time", get(reports::resolution_time))
        .route("/daily", get(reports::daily))
}
