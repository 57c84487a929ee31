//! Handlers for the `/reports` resource. Read-only aggregation, admin-gated.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;
use waterline_core::complaint::ComplaintStatus;
use waterline_db::models::report::{DailyCount, LabelCount, TechnicianWorkload};
use waterline_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::DateRangeQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Window used by the daily report when the caller gives no range.
const DEFAULT_DAILY_WINDOW_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body for `GET /reports/summary`.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub total: i64,
    /// Complaints in a non-terminal status.
    pub open: i64,
    /// Complaints resolved or rejected.
    pub terminal: i64,
    pub by_status: Vec<LabelCount>,
    pub by_category: Vec<LabelCount>,
    pub by_urgency: Vec<LabelCount>,
}

/// One row of `GET /reports/resolution-time`: overall when `category` is
/// `None`, otherwise per-category.
#[derive(Debug, Serialize)]
pub struct ResolutionTimeReport {
    pub category: Option<String>,
    pub resolved_count: i64,
    pub avg_hours: Option<f64>,
    pub min_hours: Option<f64>,
    pub max_hours: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/reports/summary
///
/// Complaint totals broken down by status, category, and urgency.
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<SummaryReport>>> {
    let total = ReportRepo::total_complaints(&state.pool).await?;
    let by_status = ReportRepo::count_by_status(&state.pool).await?;
    let by_category = ReportRepo::count_by_category(&state.pool).await?;
    let by_urgency = ReportRepo::count_by_urgency(&state.pool).await?;

    let terminal = by_status
        .iter()
        .filter(|row| {
            ComplaintStatus::parse(&row.label).is_some_and(ComplaintStatus::is_terminal)
        })
        .map(|row| row.count)
        .sum::<i64>();

    Ok(Json(DataResponse {
        data: SummaryReport {
            total,
            open: total - terminal,
            terminal,
            by_status,
            by_category,
            by_urgency,
        },
    }))
}

/// GET /api/v1/reports/workload
///
/// Per-technician open and resolved task counts, busiest first.
pub async fn workload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<TechnicianWorkload>>>> {
    let rows = ReportRepo::technician_workload(&state.pool).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/reports/resolution-time
///
/// Average/min/max hours from filing to resolution, overall and per
/// category, over an optional `?from=`/`?to=` resolution-date range.
pub async fn resolution_time(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DateRangeQuery>,
) -> AppResult<Json<DataResponse<Vec<ResolutionTimeReport>>>> {
    let (from, to) = params.resolve()?;

    let rows = ReportRepo::resolution_stats(&state.pool, from, to).await?;

    let reports = rows
        .into_iter()
        .map(|row| ResolutionTimeReport {
            category: row.category,
            resolved_count: row.resolved_count,
            avg_hours: row.avg_seconds.map(to_hours),
            min_hours: row.min_seconds.map(to_hours),
            max_hours: row.max_seconds.map(to_hours),
        })
        .collect();

    Ok(Json(DataResponse { data: reports }))
}

/// GET /api/v1/reports/daily
///
/// Complaints filed and resolved per calendar day. Defaults to the last
/// 30 days when no range is given.
pub async fn daily(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DateRangeQuery>,
) -> AppResult<Json<DataResponse<Vec<DailyCount>>>> {
    let (from, to) = params.resolve()?;

    let to = to.unwrap_or_else(Utc::now);
    let from = from.unwrap_or_else(|| to - Duration::days(DEFAULT_DAILY_WINDOW_DAYS));

    let rows = ReportRepo::daily_counts(&state.pool, from, to).await?;
    Ok(Json(DataResponse { data: rows }))
}

fn to_hours(seconds: f64) -> f64 {
    seconds / 3600.0
}
