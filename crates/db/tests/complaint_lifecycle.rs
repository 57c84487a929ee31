//! Integration tests for the complaint lifecycle at the repository layer.
//!
//! Exercises creation defaults, assignment (including re-assignment onto the
//! same task row), status changes with note routing and `resolved_at`
//! stamping, filtered queries, and transactional deletion.

use sqlx::PgPool;
use waterline_db::models::complaint::{ComplaintFilter, CreateComplaint, UpdateComplaint};
use waterline_db::models::technician::CreateTechnician;
use waterline_db::models::user::{CreateUser, User};
use waterline_db::repositories::{ComplaintRepo, RoleRepo, TaskRepo, TechnicianRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_resident(pool: &PgPool, email: &str) -> User {
    let role = RoleRepo::find_by_name(pool, "resident")
        .await
        .unwrap()
        .expect("resident role should be seeded");
    UserRepo::create(
        pool,
        &CreateUser {
            full_name: "Test Resident".to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: "argon2-hash-placeholder".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

async fn seed_technician(pool: &PgPool, email: &str) -> i64 {
    let role = RoleRepo::find_by_name(pool, "technician")
        .await
        .unwrap()
        .expect("technician role should be seeded");
    let (_, technician) = TechnicianRepo::create_with_user(
        pool,
        &CreateTechnician {
            full_name: "Test Technician".to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: "argon2-hash-placeholder".to_string(),
            role_id: role.id,
            speciality: "water_supply".to_string(),
        },
    )
    .await
    .unwrap();
    technician.id
}

fn new_complaint(resident_id: i64, category: &str, title: &str) -> CreateComplaint {
    CreateComplaint {
        resident_id,
        category: category.to_string(),
        urgency: "medium".to_string(),
        title: title.to_string(),
        description: "Something is wrong with the water".to_string(),
        latitude: None,
        longitude: None,
        address: None,
        accuracy_m: None,
        photo_urls: None,
    }
}

// ---------------------------------------------------------------------------
// Test: creation defaults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_defaults(pool: PgPool) {
    let resident = seed_resident(&pool, "cd@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "water_leak", "Leak"))
        .await
        .unwrap();

    assert_eq!(complaint.status, "submitted");
    assert_eq!(complaint.photo_urls, serde_json::json!([]));
    assert!(complaint.admin_notes.is_none());
    assert!(complaint.assigned_at.is_none());
    assert!(complaint.resolved_at.is_none());
}

// ---------------------------------------------------------------------------
// Test: vocabulary CHECK constraints hold at the database level
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_category_check_constraint(pool: PgPool) {
    let resident = seed_resident(&pool, "chk@example.com").await;
    let result =
        ComplaintRepo::create(&pool, &new_complaint(resident.id, "pothole", "Not ours")).await;
    assert!(result.is_err(), "unknown category should violate the CHECK");
}

// ---------------------------------------------------------------------------
// Test: detail view before assignment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_find_detail_unassigned(pool: PgPool) {
    let resident = seed_resident(&pool, "det@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "no_water", "Dry tap"))
        .await
        .unwrap();

    let detail = ComplaintRepo::find_detail(&pool, complaint.id)
        .await
        .unwrap()
        .expect("detail should resolve");

    assert_eq!(detail.resident_name, "Test Resident");
    assert!(detail.technician_id.is_none());
    assert!(detail.technician_name.is_none());
}

// ---------------------------------------------------------------------------
// Test: assignment creates the task and stamps the complaint
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_assign_creates_task(pool: PgPool) {
    let resident = seed_resident(&pool, "as@example.com").await;
    let technician_id = seed_technician(&pool, "as-tech@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "pipe_burst", "Burst"))
        .await
        .unwrap();

    let (complaint, task) = ComplaintRepo::assign_technician(&pool, complaint.id, technician_id)
        .await
        .unwrap()
        .expect("complaint exists");

    assert_eq!(complaint.status, "assigned");
    assert!(complaint.assigned_at.is_some());
    assert_eq!(task.complaint_id, complaint.id);
    assert_eq!(task.technician_id, technician_id);

    let detail = ComplaintRepo::find_detail(&pool, complaint.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.technician_id, Some(technician_id));
    assert_eq!(detail.technician_name.as_deref(), Some("Test Technician"));
    assert_eq!(detail.technician_speciality.as_deref(), Some("water_supply"));
}

// ---------------------------------------------------------------------------
// Test: re-assignment rewrites the single task row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_reassign_rewrites_task(pool: PgPool) {
    let resident = seed_resident(&pool, "re@example.com").await;
    let first_tech = seed_technician(&pool, "re-t1@example.com").await;
    let second_tech = seed_technician(&pool, "re-t2@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "drainage", "Blocked"))
        .await
        .unwrap();

    let (first_complaint, first_task) =
        ComplaintRepo::assign_technician(&pool, complaint.id, first_tech)
            .await
            .unwrap()
            .unwrap();

    // A resolution on record must not survive a hand-over.
    ComplaintRepo::set_status(&pool, complaint.id, "resolved", Some("Cleared the drain"))
        .await
        .unwrap();

    let (second_complaint, second_task) =
        ComplaintRepo::assign_technician(&pool, complaint.id, second_tech)
            .await
            .unwrap()
            .unwrap();

    assert_eq!(second_task.id, first_task.id, "task row is rewritten in place");
    assert_eq!(second_task.technician_id, second_tech);
    assert!(second_task.resolution_notes.is_none());
    assert_eq!(
        second_complaint.assigned_at, first_complaint.assigned_at,
        "complaint keeps its first assignment time"
    );

    let task_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE complaint_id = $1")
        .bind(complaint.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(task_count, 1);
}

// ---------------------------------------------------------------------------
// Test: resolved_at is stamped once and kept
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_resolved_at_stamped_once(pool: PgPool) {
    let resident = seed_resident(&pool, "ra@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "dirty_water", "Brown"))
        .await
        .unwrap();

    let resolved = ComplaintRepo::set_status(&pool, complaint.id, "resolved", None)
        .await
        .unwrap()
        .unwrap();
    let first_stamp = resolved.resolved_at.expect("resolved_at should be stamped");

    let reopened = ComplaintRepo::set_status(&pool, complaint.id, "in_progress", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.resolved_at, Some(first_stamp), "re-opening keeps the stamp");

    let resolved_again = ComplaintRepo::set_status(&pool, complaint.id, "resolved", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        resolved_again.resolved_at,
        Some(first_stamp),
        "second resolution must not move resolved_at"
    );
}

// ---------------------------------------------------------------------------
// Test: notes append to the complaint; a resolution also lands on the task
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_status_notes_append(pool: PgPool) {
    let resident = seed_resident(&pool, "nr@example.com").await;
    let technician_id = seed_technician(&pool, "nr-tech@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "sanitation", "Smell"))
        .await
        .unwrap();
    ComplaintRepo::assign_technician(&pool, complaint.id, technician_id)
        .await
        .unwrap();

    let started = ComplaintRepo::set_status(&pool, complaint.id, "in_progress", Some("Crew on site"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(started.admin_notes.as_deref(), Some("Crew on site"));

    let resolved = ComplaintRepo::set_status(&pool, complaint.id, "resolved", Some("Flushed main"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        resolved.admin_notes.as_deref(),
        Some("Crew on site\nFlushed main"),
        "each note gets its own line"
    );
    let task = TaskRepo::find_by_complaint_id(&pool, complaint.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(task.resolution_notes.as_deref(), Some("Flushed main"));

    // A status change without notes keeps the existing trail untouched.
    let other = ComplaintRepo::create(&pool, &new_complaint(resident.id, "water_leak", "Drip"))
        .await
        .unwrap();
    let rejected = ComplaintRepo::set_status(&pool, other.id, "rejected", Some("Private pipe"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rejected.admin_notes.as_deref(), Some("Private pipe"));

    let touched = ComplaintRepo::set_status(&pool, other.id, "submitted", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(touched.admin_notes.as_deref(), Some("Private pipe"));
}

// ---------------------------------------------------------------------------
// Test: lifecycle operations on a missing complaint return None/false
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_complaint_semantics(pool: PgPool) {
    let technician_id = seed_technician(&pool, "mi-tech@example.com").await;

    assert!(ComplaintRepo::set_status(&pool, 999_999, "resolved", None)
        .await
        .unwrap()
        .is_none());
    assert!(ComplaintRepo::assign_technician(&pool, 999_999, technician_id)
        .await
        .unwrap()
        .is_none());
    assert!(ComplaintRepo::update(
        &pool,
        999_999,
        &UpdateComplaint {
            category: None,
            urgency: None,
            title: Some("Ghost".to_string()),
            description: None,
            latitude: None,
            longitude: None,
            address: None,
            accuracy_m: None,
            photo_urls: None,
        },
    )
    .await
    .unwrap()
    .is_none());
    assert!(!ComplaintRepo::delete(&pool, 999_999).await.unwrap());
}

// ---------------------------------------------------------------------------
// Test: deletion removes the task in the same transaction
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_removes_task(pool: PgPool) {
    let resident = seed_resident(&pool, "del@example.com").await;
    let technician_id = seed_technician(&pool, "del-tech@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "no_water", "Gone"))
        .await
        .unwrap();
    ComplaintRepo::assign_technician(&pool, complaint.id, technician_id)
        .await
        .unwrap();

    assert!(ComplaintRepo::delete(&pool, complaint.id).await.unwrap());
    assert!(ComplaintRepo::find_by_id(&pool, complaint.id)
        .await
        .unwrap()
        .is_none());
    assert!(TaskRepo::find_by_complaint_id(&pool, complaint.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: filtered queries and counts agree
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_query_filters(pool: PgPool) {
    let anna = seed_resident(&pool, "anna@example.com").await;
    let bert = seed_resident(&pool, "bert@example.com").await;
    let technician_id = seed_technician(&pool, "qf-tech@example.com").await;

    let leak = ComplaintRepo::create(&pool, &new_complaint(anna.id, "water_leak", "Leak"))
        .await
        .unwrap();
    let drain = ComplaintRepo::create(&pool, &new_complaint(anna.id, "drainage", "Drain"))
        .await
        .unwrap();
    ComplaintRepo::create(&pool, &new_complaint(bert.id, "no_water", "Dry"))
        .await
        .unwrap();
    ComplaintRepo::assign_technician(&pool, leak.id, technician_id)
        .await
        .unwrap();
    ComplaintRepo::set_status(&pool, drain.id, "rejected", None)
        .await
        .unwrap();

    let by_resident = ComplaintFilter {
        resident_id: Some(anna.id),
        ..Default::default()
    };
    assert_eq!(
        ComplaintRepo::query(&pool, &by_resident, 50, 0).await.unwrap().len(),
        2
    );
    assert_eq!(ComplaintRepo::count(&pool, &by_resident).await.unwrap(), 2);

    let by_status = ComplaintFilter {
        status: Some("rejected".to_string()),
        ..Default::default()
    };
    let rejected = ComplaintRepo::query(&pool, &by_status, 50, 0).await.unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].id, drain.id);

    let by_technician = ComplaintFilter {
        technician_id: Some(technician_id),
        ..Default::default()
    };
    let assigned = ComplaintRepo::query(&pool, &by_technician, 50, 0).await.unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, leak.id);

    // Newest first, pagination slices from the top.
    let all = ComplaintFilter::default();
    let page = ComplaintRepo::query(&pool, &all, 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    let rest = ComplaintRepo::query(&pool, &all, 2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert!(page[0].created_at >= rest[0].created_at);
}

// ---------------------------------------------------------------------------
// Test: partial update touches only the given fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_partial(pool: PgPool) {
    let resident = seed_resident(&pool, "up@example.com").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(resident.id, "water_leak", "Old"))
        .await
        .unwrap();

    let updated = ComplaintRepo::update(
        &pool,
        complaint.id,
        &UpdateComplaint {
            category: None,
            urgency: Some("high".to_string()),
            title: Some("New title".to_string()),
            description: None,
            latitude: None,
            longitude: None,
            address: None,
            accuracy_m: None,
            photo_urls: None,
        },
    )
    .await
    .unwrap()
    .expect("row exists");

    assert_eq!(updated.title, "New title");
    assert_eq!(updated.urgency, "high");
    assert_eq!(updated.category, "water_leak");
    assert_eq!(updated.description, complaint.description);
}
