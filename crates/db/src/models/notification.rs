//! Notification entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use waterline_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    /// `None` when the notification was sent with the admin API key rather
    /// than by a signed-in user.
    pub created_by: Option<DbId>,
    pub title: String,
    pub body: String,
    pub audience: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `notification_receipts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationReceipt {
    pub id: DbId,
    pub notification_id: DbId,
    pub user_id: DbId,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A notification joined with the requesting user's receipt.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserNotification {
    pub id: DbId,
    pub notification_id: DbId,
    pub title: String,
    pub body: String,
    pub audience: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A sent notification with receipt counts, for the admin history view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationWithStats {
    pub id: DbId,
    pub created_by: Option<DbId>,
    pub title: String,
    pub body: String,
    pub audience: String,
    pub recipient_count: i64,
    pub read_count: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Deserialize)]
pub struct CreateNotification {
    pub created_by: Option<DbId>,
    pub title: String,
    pub body: String,
    pub audience: String,
}
