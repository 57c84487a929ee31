//! Repository for the `complaints` table and its one-per-complaint task.

use sqlx::PgPool;
use waterline_core::complaint::{STATUS_ASSIGNED, STATUS_RESOLVED};
use waterline_core::types::{DbId, Timestamp};

use crate::models::complaint::{
    Complaint, ComplaintDetail, ComplaintFilter, CreateComplaint, UpdateComplaint,
};
use crate::models::task::Task;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for bare `complaints` queries.
const COLUMNS: &str = "\
    id, resident_id, category, urgency, status, title, description, \
    latitude, longitude, address, accuracy_m, photo_urls, admin_notes, \
    assigned_at, resolved_at, created_at, updated_at";

/// Column list for the joined detail view. Aliases match [`ComplaintDetail`].
const DETAIL_COLUMNS: &str = "\
    c.id, c.resident_id, u.full_name AS resident_name, c.category, c.urgency, \
    c.status, c.title, c.description, c.latitude, c.longitude, c.address, \
    c.accuracy_m, c.photo_urls, c.admin_notes, t.technician_id, \
    tu.full_name AS technician_name, tech.speciality AS technician_speciality, \
    c.assigned_at, c.resolved_at, c.created_at, c.updated_at";

/// FROM clause for the joined detail view.
///
/// The task join is LEFT because unassigned complaints have no task row;
/// `uq_tasks_complaint_id` guarantees the join never duplicates a complaint.
const DETAIL_FROM: &str = "\
    FROM complaints c
    JOIN users u ON u.id = c.resident_id
    LEFT JOIN tasks t ON t.complaint_id = c.id
    LEFT JOIN technicians tech ON tech.id = t.technician_id
    LEFT JOIN users tu ON tu.id = tech.user_id";

// ---------------------------------------------------------------------------
// ComplaintRepo
// ---------------------------------------------------------------------------

/// Provides CRUD and lifecycle operations for complaints.
pub struct ComplaintRepo;

impl ComplaintRepo {
    /// Insert a new complaint, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComplaint) -> Result<Complaint, sqlx::Error> {
        let query = format!(
            "INSERT INTO complaints
                (resident_id, category, urgency, title, description,
                 latitude, longitude, address, accuracy_m, photo_urls)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(input.resident_id)
            .bind(&input.category)
            .bind(&input.urgency)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.address)
            .bind(input.accuracy_m)
            .bind(&input.photo_urls)
            .fetch_one(pool)
            .await
    }

    /// Find a complaint by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM complaints WHERE id = $1");
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a complaint with reporter and assignment details joined in.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ComplaintDetail>, sqlx::Error> {
        let query = format!("SELECT {DETAIL_COLUMNS} {DETAIL_FROM} WHERE c.id = $1");
        sqlx::query_as::<_, ComplaintDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Query complaint details with filtering and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        filter: &ComplaintFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ComplaintDetail>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_complaint_filter(filter);

        let query = format!(
            "SELECT {DETAIL_COLUMNS} {DETAIL_FROM} {where_clause} \
             ORDER BY c.created_at DESC, c.id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_filter_values(sqlx::query_as::<_, ComplaintDetail>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count complaints matching the given filter (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &ComplaintFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_complaint_filter(filter);

        let query = format!("SELECT COUNT(*)::BIGINT {DETAIL_FROM} {where_clause}");

        let q = bind_filter_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// Update a complaint's reporter-editable fields. Only non-`None` fields
    /// in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComplaint,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!(
            "UPDATE complaints SET
                category = COALESCE($2, category),
                urgency = COALESCE($3, urgency),
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                address = COALESCE($8, address),
                accuracy_m = COALESCE($9, accuracy_m),
                photo_urls = COALESCE($10, photo_urls)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .bind(&input.category)
            .bind(&input.urgency)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.address)
            .bind(input.accuracy_m)
            .bind(&input.photo_urls)
            .fetch_optional(pool)
            .await
    }

    /// Move a complaint to `new_status`, appending `notes` to its audit
    /// trail.
    ///
    /// Notes, when present, append to the complaint's `admin_notes` with a
    /// newline between entries; a resolution additionally records them on the
    /// task's `resolution_notes`. `resolved_at` is stamped on the first
    /// transition to `resolved`, `assigned_at` on the first status at or past
    /// `assigned`, and both stick thereafter.
    ///
    /// Returns `None` if no row with the given `id` exists. Status transition
    /// legality is the caller's responsibility.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        new_status: &str,
        notes: Option<&str>,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let resolution_notes = if new_status == STATUS_RESOLVED {
            notes
        } else {
            None
        };

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE complaints SET
                status = $2,
                admin_notes = CASE WHEN $3::TEXT IS NULL THEN admin_notes
                    ELSE COALESCE(admin_notes || E'\\n', '') || $3 END,
                assigned_at = CASE WHEN $2 IN ('assigned', 'in_progress', 'resolved')
                    THEN COALESCE(assigned_at, NOW()) ELSE assigned_at END,
                resolved_at = CASE WHEN $2 = 'resolved'
                    THEN COALESCE(resolved_at, NOW()) ELSE resolved_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let complaint = sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .bind(new_status)
            .bind(notes)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(complaint) = complaint else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(notes) = resolution_notes {
            sqlx::query("UPDATE tasks SET resolution_notes = $2 WHERE complaint_id = $1")
                .bind(id)
                .bind(notes)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(complaint))
    }

    /// Assign a technician, creating or rewriting the complaint's task and
    /// moving the complaint to `assigned` in one transaction.
    ///
    /// Re-assignment replaces the technician on the existing task and clears
    /// any stale resolution notes. The complaint's `assigned_at` keeps the
    /// first assignment time; the task's `assigned_at` tracks the latest.
    ///
    /// Returns `None` if no complaint with the given `id` exists.
    pub async fn assign_technician(
        pool: &PgPool,
        complaint_id: DbId,
        technician_id: DbId,
    ) -> Result<Option<(Complaint, Task)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE complaints SET
                status = '{STATUS_ASSIGNED}',
                assigned_at = COALESCE(assigned_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let complaint = sqlx::query_as::<_, Complaint>(&query)
            .bind(complaint_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(complaint) = complaint else {
            tx.rollback().await?;
            return Ok(None);
        };

        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (complaint_id, technician_id)
             VALUES ($1, $2)
             ON CONFLICT (complaint_id) DO UPDATE SET
                technician_id = EXCLUDED.technician_id,
                assigned_at = NOW(),
                resolution_notes = NULL
             RETURNING id, complaint_id, technician_id, assigned_at,
                       resolution_notes, created_at, updated_at",
        )
        .bind(complaint_id)
        .bind(technician_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((complaint, task)))
    }

    /// Hard-delete a complaint and its task in one transaction.
    ///
    /// The task row is removed first so the complaint is never observable
    /// without its assignment having gone too. Returns `true` if the
    /// complaint existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE complaint_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built complaint queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `ComplaintFilter` parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
fn build_complaint_filter(filter: &ComplaintFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(resident_id) = filter.resident_id {
        conditions.push(format!("c.resident_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(resident_id));
    }

    if let Some(technician_id) = filter.technician_id {
        conditions.push(format!("t.technician_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(technician_id));
    }

    if let Some(ref status) = filter.status {
        conditions.push(format!("c.status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.clone()));
    }

    if let Some(ref category) = filter.category {
        conditions.push(format!("c.category = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(category.clone()));
    }

    if let Some(ref urgency) = filter.urgency {
        conditions.push(format!("c.urgency = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(urgency.clone()));
    }

    if let Some(from) = filter.from {
        conditions.push(format!("c.created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = filter.to {
        conditions.push(format!("c.created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_filter_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_filter_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
