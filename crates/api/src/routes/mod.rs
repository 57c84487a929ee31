pub mod admin;
pub mod auth;
pub mod complaint;
pub mod health;
pub mod notification;
pub mod reports;
pub mod technician;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                              WebSocket (register, live events)
///
/// /auth/signup                     resident signup (public)
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/logout                     logout (requires auth)
/// /auth/me                         current user (requires auth)
/// /auth/forgot-password            request reset email (public)
/// /auth/reset-password             consume reset token (public)
///
/// /complaints                      list, file
/// /complaints/{id}                 get, update, delete
/// /complaints/{id}/status          status transition (PATCH, staff)
/// /complaints/{id}/assign          assign technician (POST, admin)
///
/// /technicians                     list, enrol (admin)
/// /technicians/{id}                get, update, retire (admin)
///
/// /admin/admins                    list, create admin accounts
/// /admin/users                     list users (?role=)
/// /admin/users/{id}                get, deactivate
///
/// /notifications                   broadcast (POST), sent history (GET) (admin)
/// /notifications/my                own feed
/// /notifications/my/unread-count   unread badge count
/// /notifications/read-all          mark all read (POST)
/// /notifications/{id}/read         mark one read (POST)
///
/// /reports/summary                 totals by status/category/urgency (admin)
/// /reports/workload                per-technician workload (admin)
/// /reports/resolution-time         created-to-resolved hours (admin)
/// /reports/daily                   per-day filed/resolved counts (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint for live notifications.
        .route("/ws", get(ws::ws_handler))
        // Authentication and account recovery.
        .nest("/auth", auth::router())
        // Complaint lifecycle.
        .nest("/complaints", complaint::router())
        // Staff directory.
        .nest("/technicians", technician::router())
        // Admin account and user management.
        .nest("/admin", admin::router())
        // Broadcasts and per-user feeds.
        .nest("/notifications", notification::router())
        // Read-only aggregation.
        .nest("/reports", reports::router())
}
