//! Handlers for the `/notifications` resource: admin broadcast plus each
//! user's own notification feed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use waterline_core::error::CoreError;
use waterline_core::types::DbId;
use waterline_db::models::notification::{
    CreateNotification, Notification, NotificationReceipt, NotificationWithStats, UserNotification,
};
use waterline_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::notifications::dispatch;
use crate::query::PageQuery;
use crate::response::{DataResponse, Paginated};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /notifications`.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub body: String,
    /// One of `all`, `resident`, `technician`, `specific`.
    pub audience: String,
    /// Target users; required (non-empty) when `audience` is `specific`.
    pub user_ids: Option<Vec<DbId>>,
}

/// Response body for `POST /notifications`.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub notification: Notification,
    /// Receipts written, the durable part.
    pub recipient_count: u64,
    /// Live connections reached, the best-effort part.
    pub delivered: usize,
}

/// Response body for `GET /notifications/my/unread-count`.
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// Response body for `POST /notifications/read-all`.
#[derive(Debug, Serialize)]
pub struct ReadAllResponse {
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications
///
/// Broadcast a notification. Receipts are written for every target before
/// any live push; the response reports both counts.
pub async fn broadcast(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<BroadcastRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BroadcastResponse>>)> {
    let outcome = dispatch::broadcast_notification(
        &state.pool,
        &state.ws_manager,
        CreateNotification {
            created_by: admin.author_id(),
            title: input.title,
            body: input.body,
            audience: input.audience,
        },
        input.user_ids,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BroadcastResponse {
                notification: outcome.notification,
                recipient_count: outcome.recipient_count,
                delivered: outcome.delivered,
            },
        }),
    ))
}

/// GET /api/v1/notifications
///
/// Sent-notification history with recipient/read counts.
pub async fn list_sent(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<Paginated<NotificationWithStats>>> {
    let page = params.resolve()?;

    let total = NotificationRepo::count_all(&state.pool).await?;
    let items = NotificationRepo::list_with_stats(&state.pool, page.size, page.offset()).await?;

    Ok(Json(Paginated::new(items, page, total)))
}

// ---------------------------------------------------------------------------
// Per-user handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/my
///
/// The authenticated user's notification feed, newest first.
pub async fn list_my_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<Paginated<UserNotification>>> {
    let page = params.resolve()?;

    let total = NotificationRepo::count_for_user(&state.pool, auth.user_id).await?;
    let items =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, page.size, page.offset())
            .await?;

    Ok(Json(Paginated::new(items, page, total)))
}

/// GET /api/v1/notifications/my/unread-count
///
/// Number of unread notifications for the authenticated user.
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCountResponse>>> {
    let unread = NotificationRepo::count_unread_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCountResponse { unread },
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark one notification as read. 404 when the user holds no receipt for
/// it; receipts are never created on read.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NotificationReceipt>>> {
    let receipt = NotificationRepo::mark_read(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }))?;

    Ok(Json(DataResponse { data: receipt }))
}

/// POST /api/v1/notifications/read-all
///
/// Mark every unread notification as read for the authenticated user.
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<ReadAllResponse>>> {
    let updated = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: ReadAllResponse { updated },
    }))
}
