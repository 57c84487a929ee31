//! Aggregation queries backing the reporting endpoints.

use sqlx::PgPool;
use waterline_core::types::Timestamp;

use crate::models::report::{DailyCount, LabelCount, ResolutionStats, TechnicianWorkload};

/// Provides read-only aggregate queries over complaints and tasks.
pub struct ReportRepo;

impl ReportRepo {
    /// Complaint counts grouped by status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<LabelCount>, sqlx::Error> {
        sqlx::query_as::<_, LabelCount>(
            "SELECT status AS label, COUNT(*)::BIGINT AS count
             FROM complaints
             GROUP BY status
             ORDER BY count DESC, label ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Complaint counts grouped by category.
    pub async fn count_by_category(pool: &PgPool) -> Result<Vec<LabelCount>, sqlx::Error> {
        sqlx::query_as::<_, LabelCount>(
            "SELECT category AS label, COUNT(*)::BIGINT AS count
             FROM complaints
             GROUP BY category
             ORDER BY count DESC, label ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Complaint counts grouped by urgency.
    pub async fn count_by_urgency(pool: &PgPool) -> Result<Vec<LabelCount>, sqlx::Error> {
        sqlx::query_as::<_, LabelCount>(
            "SELECT urgency AS label, COUNT(*)::BIGINT AS count
             FROM complaints
             GROUP BY urgency
             ORDER BY count DESC, label ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Total number of complaints.
    pub async fn total_complaints(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM complaints")
            .fetch_one(pool)
            .await
    }

    /// Per-technician workload across all technicians, busiest first.
    ///
    /// Counts every task ever assigned; `open_tasks` are those whose
    /// complaint is not yet resolved or rejected.
    pub async fn technician_workload(
        pool: &PgPool,
    ) -> Result<Vec<TechnicianWorkload>, sqlx::Error> {
        sqlx::query_as::<_, TechnicianWorkload>(
            "SELECT \
                t.id AS technician_id, \
                u.full_name, \
                t.speciality, \
                t.status AS technician_status, \
                COUNT(ta.id) FILTER (WHERE c.status NOT IN ('resolved', 'rejected'))::BIGINT AS open_tasks, \
                COUNT(ta.id) FILTER (WHERE c.status = 'resolved')::BIGINT AS resolved_tasks \
             FROM technicians t \
             JOIN users u ON u.id = t.user_id \
             LEFT JOIN tasks ta ON ta.technician_id = t.id \
             LEFT JOIN complaints c ON c.id = ta.complaint_id \
             GROUP BY t.id, u.full_name \
             ORDER BY open_tasks DESC, u.full_name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Resolution time statistics: one overall row plus one row per category.
    ///
    /// Only resolved complaints contribute; the optional bounds select by
    /// resolution time. The overall row has a NULL category and always
    /// sorts first.
    pub async fn resolution_stats(
        pool: &PgPool,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<ResolutionStats>, sqlx::Error> {
        sqlx::query_as::<_, ResolutionStats>(
            "SELECT \
                category, \
                COUNT(*)::BIGINT AS resolved_count, \
                AVG(EXTRACT(EPOCH FROM resolved_at - created_at))::FLOAT8 AS avg_seconds, \
                MIN(EXTRACT(EPOCH FROM resolved_at - created_at))::FLOAT8 AS min_seconds, \
                MAX(EXTRACT(EPOCH FROM resolved_at - created_at))::FLOAT8 AS max_seconds \
             FROM complaints \
             WHERE status = 'resolved' AND resolved_at IS NOT NULL \
               AND ($1::TIMESTAMPTZ IS NULL OR resolved_at >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR resolved_at <= $2) \
             GROUP BY ROLLUP (category) \
             ORDER BY category NULLS FIRST",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Complaints submitted and resolved per calendar day over a date range.
    ///
    /// Days with no activity in either column are omitted.
    pub async fn daily_counts(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<DailyCount>, sqlx::Error> {
        sqlx::query_as::<_, DailyCount>(
            "SELECT \
                day::DATE AS day, \
                COALESCE(SUM(submitted), 0)::BIGINT AS submitted, \
                COALESCE(SUM(resolved), 0)::BIGINT AS resolved \
             FROM ( \
                 SELECT DATE_TRUNC('day', created_at) AS day, 1 AS submitted, 0 AS resolved \
                 FROM complaints WHERE created_at >= $1 AND created_at <= $2 \
                 UNION ALL \
                 SELECT DATE_TRUNC('day', resolved_at) AS day, 0 AS submitted, 1 AS resolved \
                 FROM complaints WHERE resolved_at >= $1 AND resolved_at <= $2 \
             ) activity \
             GROUP BY day \
             ORDER BY day ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}
