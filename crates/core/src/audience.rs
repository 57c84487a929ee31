//! Notification audience vocabulary.
//!
//! The audience selects which users receive receipts for a broadcast.
//! Resolution to concrete user ids happens in the API layer before the
//! notification row is written.

/// Every active resident and technician.
pub const AUDIENCE_ALL: &str = "all";

/// Every active user with the resident role.
pub const AUDIENCE_RESIDENT: &str = "resident";

/// Every active user with the technician role.
pub const AUDIENCE_TECHNICIAN: &str = "technician";

/// An explicitly supplied list of user ids.
pub const AUDIENCE_SPECIFIC: &str = "specific";

/// All valid audience selectors.
pub const VALID_AUDIENCES: &[&str] = &[
    AUDIENCE_ALL,
    AUDIENCE_RESIDENT,
    AUDIENCE_TECHNICIAN,
    AUDIENCE_SPECIFIC,
];

/// Validate that an audience string is one of the accepted values.
pub fn validate_audience(audience: &str) -> Result<(), String> {
    if VALID_AUDIENCES.contains(&audience) {
        Ok(())
    } else {
        Err(format!(
            "Invalid audience '{audience}'. Must be one of: {}",
            VALID_AUDIENCES.join(", ")
        ))
    }
}
