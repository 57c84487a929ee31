//! Password reset token model and DTOs.

use sqlx::FromRow;
use waterline_core::types::{DbId, Timestamp};

/// A password reset row from the `password_resets` table.
///
/// Stores the SHA-256 hash of the emailed token, never the token itself.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a password reset token.
pub struct CreatePasswordReset {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
