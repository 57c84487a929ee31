//! Repository for the `technicians` table.

use sqlx::PgPool;
use waterline_core::types::DbId;

use crate::models::technician::{CreateTechnician, Technician, TechnicianProfile, UpdateTechnician};
use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, speciality, status, created_at, updated_at";

/// Column list for the joined profile view. Aliases match [`TechnicianProfile`].
const PROFILE_COLUMNS: &str = "\
    t.id, t.user_id, u.full_name, u.email, u.phone, \
    t.speciality, t.status, t.created_at, t.updated_at";

/// Provides CRUD operations for technicians.
pub struct TechnicianRepo;

impl TechnicianRepo {
    /// Enrol a staff member: insert the user account and the technician
    /// profile in one transaction.
    pub async fn create_with_user(
        pool: &PgPool,
        input: &CreateTechnician,
    ) -> Result<(User, Technician), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (full_name, email, phone, password_hash, role_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, full_name, email, phone, password_hash, role_id, is_active,
                       last_login_at, failed_login_count, locked_until, created_at, updated_at",
        )
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.password_hash)
        .bind(input.role_id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO technicians (user_id, speciality)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let technician = sqlx::query_as::<_, Technician>(&query)
            .bind(user.id)
            .bind(&input.speciality)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((user, technician))
    }

    /// Find a technician by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Technician>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM technicians WHERE id = $1");
        sqlx::query_as::<_, Technician>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a technician by their user account ID.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Technician>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM technicians WHERE user_id = $1");
        sqlx::query_as::<_, Technician>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a technician profile (joined with the user account) by ID.
    pub async fn find_profile(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TechnicianProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM technicians t
             JOIN users u ON u.id = t.user_id
             WHERE t.id = $1"
        );
        sqlx::query_as::<_, TechnicianProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List technician profiles, optionally filtered by speciality and
    /// status, name ascending.
    pub async fn list_profiles(
        pool: &PgPool,
        speciality: Option<&str>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TechnicianProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM technicians t
             JOIN users u ON u.id = t.user_id
             WHERE ($1::TEXT IS NULL OR t.speciality = $1)
               AND ($2::TEXT IS NULL OR t.status = $2)
             ORDER BY u.full_name ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, TechnicianProfile>(&query)
            .bind(speciality)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count technicians matching the same filters as [`Self::list_profiles`].
    pub async fn count_profiles(
        pool: &PgPool,
        speciality: Option<&str>,
        status: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM technicians t
             WHERE ($1::TEXT IS NULL OR t.speciality = $1)
               AND ($2::TEXT IS NULL OR t.status = $2)",
        )
        .bind(speciality)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    /// Update a technician profile. Only non-`None` fields in `input` are
    /// applied; `phone` lands on the linked user account.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTechnician,
    ) -> Result<Option<Technician>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE technicians SET
                speciality = COALESCE($2, speciality),
                status = COALESCE($3, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let technician = sqlx::query_as::<_, Technician>(&query)
            .bind(id)
            .bind(&input.speciality)
            .bind(&input.status)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(technician) = technician else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(ref phone) = input.phone {
            sqlx::query("UPDATE users SET phone = $2 WHERE id = $1")
                .bind(technician.user_id)
                .bind(phone)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(technician))
    }

    /// Retire a technician: mark the profile inactive and deactivate the
    /// linked user account in one transaction.
    ///
    /// Returns `true` if the technician existed.
    pub async fn retire(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, DbId>(
            "UPDATE technicians SET status = 'inactive' WHERE id = $1 RETURNING user_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Number of open (unresolved, unrejected) tasks assigned to a technician.
    pub async fn open_task_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM tasks t
             JOIN complaints c ON c.id = t.complaint_id
             WHERE t.technician_id = $1
               AND c.status NOT IN ('resolved', 'rejected')",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
