//! Repository for the `tasks` table.
//!
//! Task creation and re-assignment live in
//! [`ComplaintRepo::assign_technician`](crate::repositories::ComplaintRepo::assign_technician)
//! so they commit together with the complaint's status change.

use sqlx::PgPool;
use waterline_core::types::DbId;

use crate::models::task::Task;

const COLUMNS: &str =
    "id, complaint_id, technician_id, assigned_at, resolution_notes, created_at, updated_at";

/// Provides read operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Find the task attached to a complaint, if any.
    pub async fn find_by_complaint_id(
        pool: &PgPool,
        complaint_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE complaint_id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(complaint_id)
            .fetch_optional(pool)
            .await
    }
}
