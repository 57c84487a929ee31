//! Task entity models.

use serde::Serialize;
use sqlx::FromRow;
use waterline_core::types::{DbId, Timestamp};

/// A task row from the `tasks` table.
///
/// Each complaint has at most one task; re-assignment rewrites the existing
/// row rather than inserting a second one.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub complaint_id: DbId,
    pub technician_id: DbId,
    pub assigned_at: Timestamp,
    pub resolution_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
