//! Technician entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use waterline_core::types::{DbId, Timestamp};

/// A technician row from the `technicians` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Technician {
    pub id: DbId,
    pub user_id: DbId,
    pub speciality: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A technician joined with their user account, for directory listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TechnicianProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub speciality: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for enrolling a new staff member.
///
/// Creates the user account and the technician profile in one transaction.
#[derive(Debug)]
pub struct CreateTechnician {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role_id: DbId,
    pub speciality: String,
}

/// DTO for updating a technician profile. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateTechnician {
    pub speciality: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
}
