//! Complaint entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use waterline_core::types::{DbId, Timestamp};

/// A complaint row from the `complaints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Complaint {
    pub id: DbId,
    pub resident_id: DbId,
    pub category: String,
    pub urgency: String,
    pub status: String,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub accuracy_m: Option<f64>,
    pub photo_urls: serde_json::Value,
    pub admin_notes: Option<String>,
    pub assigned_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A complaint joined with its reporter and current assignment.
///
/// Assignment fields come from a LEFT JOIN on `tasks`; they are `None`
/// while the complaint is unassigned. Kept flat so API responses never
/// nest half-loaded sub-entities.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComplaintDetail {
    pub id: DbId,
    pub resident_id: DbId,
    pub resident_name: String,
    pub category: String,
    pub urgency: String,
    pub status: String,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub accuracy_m: Option<f64>,
    pub photo_urls: serde_json::Value,
    pub admin_notes: Option<String>,
    pub technician_id: Option<DbId>,
    pub technician_name: Option<String>,
    pub technician_speciality: Option<String>,
    pub assigned_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new complaint.
#[derive(Debug, Deserialize)]
pub struct CreateComplaint {
    pub resident_id: DbId,
    pub category: String,
    pub urgency: String,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub accuracy_m: Option<f64>,
    pub photo_urls: Option<serde_json::Value>,
}

/// DTO for a resident editing their own complaint. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateComplaint {
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub accuracy_m: Option<f64>,
    pub photo_urls: Option<serde_json::Value>,
}

/// Filter parameters for complaint listing queries.
///
/// All fields are optional; `None` means "no filter on this column".
#[derive(Debug, Default, Clone)]
pub struct ComplaintFilter {
    pub resident_id: Option<DbId>,
    pub technician_id: Option<DbId>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}
