//! Repository for the `notifications` and `notification_receipts` tables.

use sqlx::PgPool;
use waterline_core::types::DbId;

use crate::models::notification::{
    CreateNotification, Notification, NotificationReceipt, NotificationWithStats, UserNotification,
};

/// Column list for `notifications` SELECT queries.
const COLUMNS: &str = "id, created_by, title, body, audience, created_at, updated_at";

/// Column list for `notification_receipts` SELECT queries.
const RECEIPT_COLUMNS: &str =
    "id, notification_id, user_id, is_read, read_at, created_at, updated_at";

/// Provides operations for notifications and their per-user receipts.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification and one receipt per recipient in one transaction.
    ///
    /// The receipts exist whether or not any recipient is currently connected;
    /// live delivery is a separate, best-effort concern. Returns the created
    /// notification and the number of receipts written.
    pub async fn create_with_receipts(
        pool: &PgPool,
        input: &CreateNotification,
        recipient_ids: &[DbId],
    ) -> Result<(Notification, u64), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO notifications (created_by, title, body, audience)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&query)
            .bind(input.created_by)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.audience)
            .fetch_one(&mut *tx)
            .await?;

        let receipts = if recipient_ids.is_empty() {
            0
        } else {
            // Batch insert via unnest; duplicate recipient IDs collapse onto
            // the uq_notification_receipts_notification_user constraint.
            let result = sqlx::query(
                "INSERT INTO notification_receipts (notification_id, user_id)
                 SELECT $1, unnest($2::bigint[])
                 ON CONFLICT (notification_id, user_id) DO NOTHING",
            )
            .bind(notification.id)
            .bind(recipient_ids)
            .execute(&mut *tx)
            .await?;
            result.rows_affected()
        };

        tx.commit().await?;
        Ok((notification, receipts))
    }

    /// Find a notification by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's notifications with their read state, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserNotification>, sqlx::Error> {
        sqlx::query_as::<_, UserNotification>(
            "SELECT r.id, n.id AS notification_id, n.title, n.body, n.audience,
                    r.is_read, r.read_at, n.created_at
             FROM notification_receipts r
             JOIN notifications n ON n.id = r.notification_id
             WHERE r.user_id = $1
             ORDER BY n.created_at DESC, n.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count a user's notifications (for pagination metadata).
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM notification_receipts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Count a user's unread notifications.
    pub async fn count_unread_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM notification_receipts
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark a user's receipt for a notification as read.
    ///
    /// Idempotent: re-reading keeps the original `read_at`. Returns `None`
    /// if the user holds no receipt for this notification.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<Option<NotificationReceipt>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_receipts SET
                is_read = true,
                read_at = COALESCE(read_at, NOW())
             WHERE notification_id = $1 AND user_id = $2
             RETURNING {RECEIPT_COLUMNS}"
        );
        sqlx::query_as::<_, NotificationReceipt>(&query)
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark all of a user's unread receipts as read.
    ///
    /// Returns the number of receipts updated.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notification_receipts SET
                is_read = true,
                read_at = COALESCE(read_at, NOW())
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List sent notifications with receipt counts, newest first.
    pub async fn list_with_stats(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationWithStats>, sqlx::Error> {
        sqlx::query_as::<_, NotificationWithStats>(
            "SELECT n.id, n.created_by, n.title, n.body, n.audience,
                    COUNT(r.id)::BIGINT AS recipient_count,
                    COUNT(r.id) FILTER (WHERE r.is_read)::BIGINT AS read_count,
                    n.created_at
             FROM notifications n
             LEFT JOIN notification_receipts r ON r.notification_id = n.id
             GROUP BY n.id
             ORDER BY n.created_at DESC, n.id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count all sent notifications (for pagination metadata).
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM notifications")
            .fetch_one(pool)
            .await
    }
}
