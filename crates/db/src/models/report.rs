//! Aggregate row types for the reporting queries.

use serde::Serialize;
use sqlx::FromRow;
use waterline_core::types::DbId;

/// Count of complaints grouped by one label column (status, category, urgency).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// Per-technician workload: open vs. completed assignments.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TechnicianWorkload {
    pub technician_id: DbId,
    pub full_name: String,
    pub speciality: String,
    pub technician_status: String,
    pub open_tasks: i64,
    pub resolved_tasks: i64,
}

/// Resolution time statistics in seconds, optionally scoped to a category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResolutionStats {
    /// `None` for the overall row, a category name for per-category rows.
    pub category: Option<String>,
    pub resolved_count: i64,
    pub avg_seconds: Option<f64>,
    pub min_seconds: Option<f64>,
    pub max_seconds: Option<f64>,
}

/// Complaints submitted and resolved on one calendar day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyCount {
    pub day: chrono::NaiveDate,
    pub submitted: i64,
    pub resolved: i64,
}
