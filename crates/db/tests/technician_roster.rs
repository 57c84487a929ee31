//! Integration tests for the technician roster at the repository layer.
//!
//! Exercises enrolment (a user plus profile in one transaction), the joined
//! profile view, roster filters, retirement, and the FK rule that keeps a
//! technician's task history intact.

use sqlx::PgPool;
use waterline_db::models::complaint::CreateComplaint;
use waterline_db::models::technician::{CreateTechnician, Technician, UpdateTechnician};
use waterline_db::models::user::{CreateUser, User};
use waterline_db::repositories::{ComplaintRepo, RoleRepo, TechnicianRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_technician(pool: &PgPool, name: &str, email: &str) -> CreateTechnician {
    let role = RoleRepo::find_by_name(pool, "technician")
        .await
        .unwrap()
        .expect("technician role should be seeded");
    CreateTechnician {
        full_name: name.to_string(),
        email: email.to_string(),
        phone: None,
        password_hash: "argon2-hash-placeholder".to_string(),
        role_id: role.id,
        speciality: "water_supply".to_string(),
    }
}

async fn enrol(pool: &PgPool, name: &str, email: &str) -> (User, Technician) {
    let input = new_technician(pool, name, email).await;
    TechnicianRepo::create_with_user(pool, &input).await.unwrap()
}

async fn assign_fresh_complaint(pool: &PgPool, resident_id: i64, technician_id: i64) -> i64 {
    let complaint = ComplaintRepo::create(
        pool,
        &CreateComplaint {
            resident_id,
            category: "water_leak".to_string(),
            urgency: "medium".to_string(),
            title: "Roster fixture".to_string(),
            description: "Assigned for workload checks".to_string(),
            latitude: None,
            longitude: None,
            address: None,
            accuracy_m: None,
            photo_urls: None,
        },
    )
    .await
    .unwrap();
    ComplaintRepo::assign_technician(pool, complaint.id, technician_id)
        .await
        .unwrap();
    complaint.id
}

async fn seed_resident(pool: &PgPool, email: &str) -> User {
    let role = RoleRepo::find_by_name(pool, "resident")
        .await
        .unwrap()
        .unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            full_name: "Roster Resident".to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: "argon2-hash-placeholder".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Test: enrolment creates the account and the profile together
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_enrolment(pool: PgPool) {
    let (user, technician) = enrol(&pool, "Vera", "vera@example.com").await;

    assert_eq!(technician.user_id, user.id);
    assert_eq!(technician.status, "active");
    assert_eq!(technician.speciality, "water_supply");

    let by_user = TechnicianRepo::find_by_user_id(&pool, user.id)
        .await
        .unwrap();
    assert_eq!(by_user.unwrap().id, technician.id);
}

// ---------------------------------------------------------------------------
// Test: a failed enrolment leaves no half-created rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_enrolment_is_atomic(pool: PgPool) {
    enrol(&pool, "Taken", "taken@example.com").await;

    // Valid user insert would collide on email; bad speciality trips the
    // CHECK after the user insert. Neither may leave stray rows behind.
    let duplicate = new_technician(&pool, "Clone", "taken@example.com").await;
    assert!(TechnicianRepo::create_with_user(&pool, &duplicate)
        .await
        .is_err());

    let mut bad_speciality = new_technician(&pool, "Welder", "welder@example.com").await;
    bad_speciality.speciality = "welding".to_string();
    assert!(TechnicianRepo::create_with_user(&pool, &bad_speciality)
        .await
        .is_err());

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    let technicians: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM technicians")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1, "the rolled-back user inserts must not persist");
    assert_eq!(technicians, 1);
}

// ---------------------------------------------------------------------------
// Test: profile view joins account fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_find_profile(pool: PgPool) {
    let (_, technician) = enrol(&pool, "Paula", "paula@example.com").await;

    let profile = TechnicianRepo::find_profile(&pool, technician.id)
        .await
        .unwrap()
        .expect("profile should resolve");

    assert_eq!(profile.full_name, "Paula");
    assert_eq!(profile.email, "paula@example.com");
    assert_eq!(profile.speciality, "water_supply");

    assert!(TechnicianRepo::find_profile(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: roster filters and name ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_profiles_filters(pool: PgPool) {
    enrol(&pool, "Zoe", "zoe@example.com").await;
    enrol(&pool, "Abe", "abe@example.com").await;
    let (_, sanitation) = enrol(&pool, "Mia", "mia@example.com").await;
    TechnicianRepo::update(
        &pool,
        sanitation.id,
        &UpdateTechnician {
            speciality: Some("sanitation".to_string()),
            status: Some("on_leave".to_string()),
            phone: None,
        },
    )
    .await
    .unwrap();

    let all = TechnicianRepo::list_profiles(&pool, None, None, 50, 0)
        .await
        .unwrap();
    let names: Vec<&str> = all.iter().map(|p| p.full_name.as_str()).collect();
    assert_eq!(names, vec!["Abe", "Mia", "Zoe"], "ordered by name");

    let water = TechnicianRepo::list_profiles(&pool, Some("water_supply"), None, 50, 0)
        .await
        .unwrap();
    assert_eq!(water.len(), 2);
    assert_eq!(
        TechnicianRepo::count_profiles(&pool, Some("water_supply"), None)
            .await
            .unwrap(),
        2
    );

    let on_leave = TechnicianRepo::list_profiles(&pool, None, Some("on_leave"), 50, 0)
        .await
        .unwrap();
    assert_eq!(on_leave.len(), 1);
    assert_eq!(on_leave[0].full_name, "Mia");
}

// ---------------------------------------------------------------------------
// Test: update writes the phone through to the user account
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_phone_lands_on_user(pool: PgPool) {
    let (user, technician) = enrol(&pool, "Ring", "ring@example.com").await;

    TechnicianRepo::update(
        &pool,
        technician.id,
        &UpdateTechnician {
            speciality: None,
            status: None,
            phone: Some("+420 777 000 111".to_string()),
        },
    )
    .await
    .unwrap()
    .expect("row exists");

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.phone.as_deref(), Some("+420 777 000 111"));

    assert!(TechnicianRepo::update(
        &pool,
        999_999,
        &UpdateTechnician {
            speciality: None,
            status: None,
            phone: None,
        },
    )
    .await
    .unwrap()
    .is_none());
}

// ---------------------------------------------------------------------------
// Test: retirement deactivates the profile and the account together
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_retire(pool: PgPool) {
    let (user, technician) = enrol(&pool, "Done", "done@example.com").await;

    assert!(TechnicianRepo::retire(&pool, technician.id).await.unwrap());

    let profile = TechnicianRepo::find_by_id(&pool, technician.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.status, "inactive");
    let account = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(!account.is_active);

    assert!(!TechnicianRepo::retire(&pool, 999_999).await.unwrap());
}

// ---------------------------------------------------------------------------
// Test: task history blocks deleting a technician row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_task_history_blocks_row_deletion(pool: PgPool) {
    let resident = seed_resident(&pool, "hist@example.com").await;
    let (_, technician) = enrol(&pool, "Keeper", "keeper@example.com").await;
    assign_fresh_complaint(&pool, resident.id, technician.id).await;

    let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
        .bind(technician.id)
        .execute(&pool)
        .await;
    assert!(
        result.is_err(),
        "tasks.technician_id is RESTRICT; retirement is the supported exit"
    );
}

// ---------------------------------------------------------------------------
// Test: open task counting ignores closed complaints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_open_task_count(pool: PgPool) {
    let resident = seed_resident(&pool, "otc@example.com").await;
    let (_, technician) = enrol(&pool, "Busy", "busy@example.com").await;

    let first = assign_fresh_complaint(&pool, resident.id, technician.id).await;
    assign_fresh_complaint(&pool, resident.id, technician.id).await;
    assert_eq!(
        TechnicianRepo::open_task_count(&pool, technician.id)
            .await
            .unwrap(),
        2
    );

    ComplaintRepo::set_status(&pool, first, "resolved", None)
        .await
        .unwrap();
    assert_eq!(
        TechnicianRepo::open_task_count(&pool, technician.id)
            .await
            .unwrap(),
        1
    );
}
