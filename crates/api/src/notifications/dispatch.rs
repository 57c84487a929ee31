//! Durable notification broadcast.
//!
//! Resolves an audience to concrete user ids, writes the notification plus
//! one unread receipt per target in a single transaction, then best-effort
//! pushes to currently-registered connections. Shared by the HTTP endpoint
//! and the admin WebSocket message so both paths behave identically.

use axum::extract::ws::Message;
use sqlx::PgPool;
use waterline_core::audience::{
    validate_audience, AUDIENCE_ALL, AUDIENCE_RESIDENT, AUDIENCE_SPECIFIC, AUDIENCE_TECHNICIAN,
};
use waterline_core::error::CoreError;
use waterline_core::roles::{ROLE_RESIDENT, ROLE_TECHNICIAN};
use waterline_core::types::DbId;
use waterline_db::models::notification::{CreateNotification, Notification};
use waterline_db::repositories::{NotificationRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::ws::WsManager;

/// What a broadcast did: the persisted row, how many receipts were written,
/// and how many live connections the push reached.
#[derive(Debug)]
pub struct BroadcastOutcome {
    pub notification: Notification,
    pub recipient_count: u64,
    pub delivered: usize,
}

/// Broadcast a notification to the resolved audience.
///
/// Receipts are durable and written for every target; the WebSocket push
/// only reaches targets with a registered connection and is never retried.
/// An unreachable target is the expected steady state, not an error.
pub async fn broadcast_notification(
    pool: &PgPool,
    ws_manager: &WsManager,
    input: CreateNotification,
    user_ids: Option<Vec<DbId>>,
) -> AppResult<BroadcastOutcome> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Notification title must not be empty".into(),
        )));
    }
    if input.body.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Notification body must not be empty".into(),
        )));
    }
    validate_audience(&input.audience).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let targets = resolve_audience(pool, &input.audience, user_ids).await?;

    let (notification, recipient_count) =
        NotificationRepo::create_with_receipts(pool, &input, &targets).await?;

    // DB write is committed; everything past this point is best-effort.
    let frame = serde_json::json!({
        "type": "notification",
        "notification_id": notification.id,
        "title": notification.title,
        "body": notification.body,
        "created_at": notification.created_at,
    });
    let message = Message::Text(frame.to_string().into());

    let mut delivered = 0;
    for user_id in &targets {
        if ws_manager.send_to_user(*user_id, message.clone()).await {
            delivered += 1;
        }
    }

    tracing::info!(
        notification_id = notification.id,
        audience = %notification.audience,
        recipients = recipient_count,
        delivered,
        "Notification broadcast"
    );

    Ok(BroadcastOutcome {
        notification,
        recipient_count,
        delivered,
    })
}

/// Resolve an audience selector to concrete user ids.
///
/// `specific` requires a non-empty `user_ids` list whose every entry is an
/// existing user; the other audiences ignore `user_ids`.
async fn resolve_audience(
    pool: &PgPool,
    audience: &str,
    user_ids: Option<Vec<DbId>>,
) -> AppResult<Vec<DbId>> {
    match audience {
        AUDIENCE_ALL => Ok(UserRepo::list_active_ids(pool).await?),
        AUDIENCE_RESIDENT => Ok(UserRepo::list_active_ids_by_role(pool, ROLE_RESIDENT).await?),
        AUDIENCE_TECHNICIAN => {
            Ok(UserRepo::list_active_ids_by_role(pool, ROLE_TECHNICIAN).await?)
        }
        AUDIENCE_SPECIFIC => {
            let ids = user_ids.unwrap_or_default();
            if ids.is_empty() {
                return Err(AppError::Core(CoreError::Validation(
                    "Audience 'specific' requires a non-empty user_ids list".into(),
                )));
            }
            for id in &ids {
                if UserRepo::find_by_id(pool, *id).await?.is_none() {
                    return Err(AppError::Core(CoreError::NotFound {
                        entity: "User",
                        id: *id,
                    }));
                }
            }
            Ok(ids)
        }
        other => Err(AppError::Core(CoreError::Validation(format!(
            "Invalid audience '{other}'"
        )))),
    }
}
