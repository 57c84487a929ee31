//! HTTP-level integration tests for the `/reports` aggregation endpoints.
//!
//! Fixtures are seeded via the repository layer, then verified through the
//! HTTP API.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_admin_key, get_auth};
use sqlx::PgPool;
use waterline_db::models::complaint::CreateComplaint;
use waterline_db::repositories::ComplaintRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed one complaint directly through the repository.
async fn seed_complaint(
    pool: &PgPool,
    resident_id: i64,
    category: &str,
    urgency: &str,
) -> waterline_db::models::complaint::Complaint {
    ComplaintRepo::create(
        pool,
        &CreateComplaint {
            resident_id,
            category: category.to_string(),
            urgency: urgency.to_string(),
            title: format!("{category} report"),
            description: "Reporting fixture".to_string(),
            latitude: None,
            longitude: None,
            address: None,
            accuracy_m: None,
            photo_urls: None,
        },
    )
    .await
    .expect("complaint creation should succeed")
}

/// Find the count for a label in a `[{label, count}]` array, 0 when absent.
fn label_count(rows: &serde_json::Value, label: &str) -> i64 {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|row| row["label"] == label)
        .map(|row| row["count"].as_i64().unwrap())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Totals split into open and terminal, with per-label breakdowns.
#[sqlx::test(migrations = "../../migrations")]
async fn test_summary(pool: PgPool) {
    let user = common::seed_user(&pool, "Reporter", "sum@example.com", "resident").await;

    seed_complaint(&pool, user.id, "water_leak", "high").await;
    seed_complaint(&pool, user.id, "water_leak", "low").await;
    let resolved = seed_complaint(&pool, user.id, "drainage", "medium").await;
    ComplaintRepo::set_status(&pool, resolved.id, "resolved", None)
        .await
        .expect("status update should succeed");

    let app = common::build_test_app(pool);
    let response = get_admin_key(app, "/api/v1/reports/summary").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];

    assert_eq!(data["total"], 3);
    assert_eq!(data["open"], 2);
    assert_eq!(data["terminal"], 1);
    assert_eq!(label_count(&data["by_status"], "submitted"), 2);
    assert_eq!(label_count(&data["by_status"], "resolved"), 1);
    assert_eq!(label_count(&data["by_category"], "water_leak"), 2);
    assert_eq!(label_count(&data["by_category"], "drainage"), 1);
    assert_eq!(label_count(&data["by_urgency"], "high"), 1);
    assert_eq!(label_count(&data["by_urgency"], "medium"), 1);
}

// ---------------------------------------------------------------------------
// Workload
// ---------------------------------------------------------------------------

/// Every technician appears, busiest first, with open/resolved splits.
#[sqlx::test(migrations = "../../migrations")]
async fn test_workload(pool: PgPool) {
    let user = common::seed_user(&pool, "Reporter", "work@example.com", "resident").await;
    let (_, busy) =
        common::seed_technician(&pool, "Busy Tech", "busy@example.com", "water_supply").await;
    common::seed_technician(&pool, "Idle Tech", "idle@example.com", "sanitation").await;

    let first = seed_complaint(&pool, user.id, "pipe_burst", "high").await;
    let second = seed_complaint(&pool, user.id, "water_leak", "medium").await;
    ComplaintRepo::assign_technician(&pool, first.id, busy.id)
        .await
        .expect("assignment should succeed");
    ComplaintRepo::assign_technician(&pool, second.id, busy.id)
        .await
        .expect("assignment should succeed");
    ComplaintRepo::set_status(&pool, second.id, "resolved", None)
        .await
        .expect("status update should succeed");

    let app = common::build_test_app(pool);
    let response = get_admin_key(app, "/api/v1/reports/workload").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();

    assert_eq!(rows.len(), 2, "idle technicians still appear");
    assert_eq!(rows[0]["full_name"], "Busy Tech");
    assert_eq!(rows[0]["open_tasks"], 1);
    assert_eq!(rows[0]["resolved_tasks"], 1);
    assert_eq!(rows[1]["full_name"], "Idle Tech");
    assert_eq!(rows[1]["open_tasks"], 0);
    assert_eq!(rows[1]["resolved_tasks"], 0);
}

// ---------------------------------------------------------------------------
// Resolution time
// ---------------------------------------------------------------------------

/// Hours from filing to resolution, overall row first, then per category.
#[sqlx::test(migrations = "../../migrations")]
async fn test_resolution_time(pool: PgPool) {
    let user = common::seed_user(&pool, "Reporter", "rt@example.com", "resident").await;

    let complaint = seed_complaint(&pool, user.id, "no_water", "high").await;
    ComplaintRepo::set_status(&pool, complaint.id, "resolved", None)
        .await
        .expect("status update should succeed");
    // Backdate the filing so the resolution took exactly two hours.
    sqlx::query(
        "UPDATE complaints SET created_at = resolved_at - INTERVAL '2 hours' WHERE id = $1",
    )
    .bind(complaint.id)
    .execute(&pool)
    .await
    .expect("backdating should succeed");

    let app = common::build_test_app(pool.clone());
    let response = get_admin_key(app, "/api/v1/reports/resolution-time").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();

    // Overall row (NULL category) sorts first, then the category row.
    assert_eq!(rows.len(), 2);
    assert!(rows[0]["category"].is_null());
    assert_eq!(rows[0]["resolved_count"], 1);
    let avg = rows[0]["avg_hours"].as_f64().unwrap();
    assert!((avg - 2.0).abs() < 0.01, "expected ~2h, got {avg}");
    assert_eq!(rows[1]["category"], "no_water");

    // A range in the far future matches nothing: one empty overall row.
    let app = common::build_test_app(pool.clone());
    let response = get_admin_key(app, "/api/v1/reports/resolution-time?from=2999-01-01").await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["resolved_count"], 0);
    assert!(rows[0]["avg_hours"].is_null());

    // An inverted range is rejected.
    let app = common::build_test_app(pool);
    let response = get_admin_key(
        app,
        "/api/v1/reports/resolution-time?from=2026-02-01&to=2026-01-01",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Daily counts
// ---------------------------------------------------------------------------

/// Filed and resolved counts land on today's row under the default window.
#[sqlx::test(migrations = "../../migrations")]
async fn test_daily_counts(pool: PgPool) {
    let user = common::seed_user(&pool, "Reporter", "daily@example.com", "resident").await;

    seed_complaint(&pool, user.id, "sanitation", "medium").await;
    let resolved = seed_complaint(&pool, user.id, "sanitation", "low").await;
    ComplaintRepo::set_status(&pool, resolved.id, "resolved", None)
        .await
        .expect("status update should succeed");

    let app = common::build_test_app(pool);
    let response = get_admin_key(app, "/api/v1/reports/daily").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();

    assert_eq!(rows.len(), 1, "all activity happened today");
    assert_eq!(rows[0]["submitted"], 2);
    assert_eq!(rows[0]["resolved"], 1);
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

/// Reports are admin-only.
#[sqlx::test(migrations = "../../migrations")]
async fn test_reports_require_admin(pool: PgPool) {
    common::seed_user(&pool, "Curious", "curious@example.com", "resident").await;
    let token = common::auth_token(&pool, "curious@example.com").await;

    for path in [
        "/api/v1/reports/summary",
        "/api/v1/reports/workload",
        "/api/v1/reports/resolution-time",
        "/api/v1/reports/daily",
    ] {
        let app = common::build_test_app(pool.clone());
        let response = get_auth(app, path, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "path: {path}");
    }
}
