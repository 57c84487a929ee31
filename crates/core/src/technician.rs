//! Technician vocabulary: specialities and activity statuses.
//!
//! Values are stored as TEXT and pinned by CHECK constraints in
//! `20260301000003_create_technicians_table.sql`.

// ---------------------------------------------------------------------------
// Specialities
// ---------------------------------------------------------------------------

pub const SPECIALITY_WATER_SUPPLY: &str = "water_supply";
pub const SPECIALITY_SANITATION: &str = "sanitation";
pub const SPECIALITY_DRAINAGE: &str = "drainage";
pub const SPECIALITY_GENERAL: &str = "general";

/// All valid technician specialities.
pub const VALID_SPECIALITIES: &[&str] = &[
    SPECIALITY_WATER_SUPPLY,
    SPECIALITY_SANITATION,
    SPECIALITY_DRAINAGE,
    SPECIALITY_GENERAL,
];

/// Validate that a speciality string is one of the accepted values.
pub fn validate_speciality(speciality: &str) -> Result<(), String> {
    if VALID_SPECIALITIES.contains(&speciality) {
        Ok(())
    } else {
        Err(format!(
            "Invalid speciality '{speciality}'. Must be one of: {}",
            VALID_SPECIALITIES.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Activity status
// ---------------------------------------------------------------------------

/// Technician is on duty and assignable.
pub const TECHNICIAN_ACTIVE: &str = "active";

/// Technician has left or been suspended; never assignable.
pub const TECHNICIAN_INACTIVE: &str = "inactive";

/// Technician is temporarily away; not assignable until back.
pub const TECHNICIAN_ON_LEAVE: &str = "on_leave";

/// All valid technician activity statuses.
pub const VALID_TECHNICIAN_STATUSES: &[&str] =
    &[TECHNICIAN_ACTIVE, TECHNICIAN_INACTIVE, TECHNICIAN_ON_LEAVE];

/// Validate that a technician status string is one of the accepted values.
pub fn validate_technician_status(status: &str) -> Result<(), String> {
    if VALID_TECHNICIAN_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid technician status '{status}'. Must be one of: {}",
            VALID_TECHNICIAN_STATUSES.join(", ")
        ))
    }
}

/// Only ACTIVE technicians may be assigned new tasks.
pub fn is_assignable(status: &str) -> bool {
    status == TECHNICIAN_ACTIVE
}
