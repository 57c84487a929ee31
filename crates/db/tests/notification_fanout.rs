//! Integration tests for notification fan-out at the repository layer.
//!
//! Exercises receipt creation in one transaction with the notification,
//! per-user feeds and unread counts, idempotent read marking, and the
//! aggregated sent-history view.

use sqlx::PgPool;
use waterline_db::models::notification::CreateNotification;
use waterline_db::models::user::{CreateUser, User};
use waterline_db::repositories::{NotificationRepo, RoleRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_resident(pool: &PgPool, name: &str, email: &str) -> User {
    let role = RoleRepo::find_by_name(pool, "resident")
        .await
        .unwrap()
        .expect("resident role should be seeded");
    UserRepo::create(
        pool,
        &CreateUser {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: "argon2-hash-placeholder".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

fn new_notice(title: &str) -> CreateNotification {
    CreateNotification {
        created_by: None,
        title: title.to_string(),
        body: "Planned maintenance tonight".to_string(),
        audience: "all".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Test: one receipt per recipient, duplicates collapse
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_with_receipts(pool: PgPool) {
    let a = seed_resident(&pool, "A", "a@example.com").await;
    let b = seed_resident(&pool, "B", "b@example.com").await;

    let (notification, receipts) =
        NotificationRepo::create_with_receipts(&pool, &new_notice("Outage"), &[a.id, b.id])
            .await
            .unwrap();
    assert_eq!(receipts, 2);
    assert!(notification.created_by.is_none());

    // A repeated recipient produces a single receipt.
    let (_, receipts) =
        NotificationRepo::create_with_receipts(&pool, &new_notice("Echo"), &[a.id, a.id, b.id])
            .await
            .unwrap();
    assert_eq!(receipts, 2);
}

// ---------------------------------------------------------------------------
// Test: zero recipients still records the notification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_empty_recipient_list(pool: PgPool) {
    let (notification, receipts) =
        NotificationRepo::create_with_receipts(&pool, &new_notice("Unheard"), &[])
            .await
            .unwrap();
    assert_eq!(receipts, 0);
    assert!(NotificationRepo::find_by_id(&pool, notification.id)
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Test: an unknown recipient rolls the whole fan-out back
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_ghost_recipient_rolls_back(pool: PgPool) {
    let a = seed_resident(&pool, "A", "a@example.com").await;

    let result =
        NotificationRepo::create_with_receipts(&pool, &new_notice("Ghost"), &[a.id, 999_999])
            .await;
    assert!(result.is_err(), "FK violation should fail the transaction");

    let notifications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(notifications, 0, "the notification row must not persist");
}

// ---------------------------------------------------------------------------
// Test: per-user feed is newest first with matching counts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_feed_order_and_counts(pool: PgPool) {
    let user = seed_resident(&pool, "Feed", "feed@example.com").await;
    let other = seed_resident(&pool, "Other", "other@example.com").await;

    NotificationRepo::create_with_receipts(&pool, &new_notice("First"), &[user.id])
        .await
        .unwrap();
    NotificationRepo::create_with_receipts(&pool, &new_notice("Second"), &[user.id, other.id])
        .await
        .unwrap();

    let feed = NotificationRepo::list_for_user(&pool, user.id, 50, 0)
        .await
        .unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].title, "Second");
    assert_eq!(feed[1].title, "First");
    assert!(!feed[0].is_read);

    assert_eq!(NotificationRepo::count_for_user(&pool, user.id).await.unwrap(), 2);
    assert_eq!(
        NotificationRepo::count_unread_for_user(&pool, user.id)
            .await
            .unwrap(),
        2
    );
    assert_eq!(NotificationRepo::count_for_user(&pool, other.id).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: mark_read is idempotent and scoped to the receipt holder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_mark_read_idempotent(pool: PgPool) {
    let user = seed_resident(&pool, "Reader", "reader@example.com").await;
    let stranger = seed_resident(&pool, "Stranger", "stranger@example.com").await;
    let (notification, _) =
        NotificationRepo::create_with_receipts(&pool, &new_notice("Read me"), &[user.id])
            .await
            .unwrap();

    let first = NotificationRepo::mark_read(&pool, notification.id, user.id)
        .await
        .unwrap()
        .expect("receipt exists");
    assert!(first.is_read);
    let stamp = first.read_at.expect("read_at should be stamped");

    let second = NotificationRepo::mark_read(&pool, notification.id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.read_at, Some(stamp), "re-reading keeps the first stamp");

    // No receipt, no update.
    assert!(NotificationRepo::mark_read(&pool, notification.id, stranger.id)
        .await
        .unwrap()
        .is_none());

    assert_eq!(
        NotificationRepo::count_unread_for_user(&pool, user.id)
            .await
            .unwrap(),
        0
    );
}

// ---------------------------------------------------------------------------
// Test: mark_all_read reports how many receipts it touched
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_mark_all_read(pool: PgPool) {
    let user = seed_resident(&pool, "Bulk", "bulk@example.com").await;
    for title in ["One", "Two", "Three"] {
        NotificationRepo::create_with_receipts(&pool, &new_notice(title), &[user.id])
            .await
            .unwrap();
    }

    assert_eq!(NotificationRepo::mark_all_read(&pool, user.id).await.unwrap(), 3);
    assert_eq!(NotificationRepo::mark_all_read(&pool, user.id).await.unwrap(), 0);
    assert_eq!(
        NotificationRepo::count_unread_for_user(&pool, user.id)
            .await
            .unwrap(),
        0
    );
}

// ---------------------------------------------------------------------------
// Test: sent history aggregates receipt and read counts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_with_stats(pool: PgPool) {
    let a = seed_resident(&pool, "A", "a@example.com").await;
    let b = seed_resident(&pool, "B", "b@example.com").await;

    let (read_one, _) =
        NotificationRepo::create_with_receipts(&pool, &new_notice("Tracked"), &[a.id, b.id])
            .await
            .unwrap();
    NotificationRepo::mark_read(&pool, read_one.id, a.id)
        .await
        .unwrap();
    NotificationRepo::create_with_receipts(&pool, &new_notice("Silent"), &[])
        .await
        .unwrap();

    let stats = NotificationRepo::list_with_stats(&pool, 50, 0).await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(NotificationRepo::count_all(&pool).await.unwrap(), 2);

    // Newest first: the empty broadcast leads.
    assert_eq!(stats[0].title, "Silent");
    assert_eq!(stats[0].recipient_count, 0);
    assert_eq!(stats[0].read_count, 0);
    assert_eq!(stats[1].title, "Tracked");
    assert_eq!(stats[1].recipient_count, 2);
    assert_eq!(stats[1].read_count, 1);
}

// ---------------------------------------------------------------------------
// Test: deleting a notification sweeps its receipts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_receipts_cascade_with_notification(pool: PgPool) {
    let user = seed_resident(&pool, "Sweep", "sweep@example.com").await;
    let (notification, _) =
        NotificationRepo::create_with_receipts(&pool, &new_notice("Retracted"), &[user.id])
            .await
            .unwrap();

    sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(notification.id)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(NotificationRepo::count_for_user(&pool, user.id).await.unwrap(), 0);
}
