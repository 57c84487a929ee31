//! Complaint vocabulary and lifecycle state machine.
//!
//! Category, urgency, and status values are stored as TEXT and pinned by
//! CHECK constraints in `20260301000004_create_complaints_table.sql`; the
//! constants here must match that seed exactly.

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub const CATEGORY_WATER_LEAK: &str = "water_leak";
pub const CATEGORY_NO_WATER: &str = "no_water";
pub const CATEGORY_DIRTY_WATER: &str = "dirty_water";
pub const CATEGORY_SANITATION: &str = "sanitation";
pub const CATEGORY_PIPE_BURST: &str = "pipe_burst";
pub const CATEGORY_DRAINAGE: &str = "drainage";

/// All valid complaint categories.
pub const VALID_CATEGORIES: &[&str] = &[
    CATEGORY_WATER_LEAK,
    CATEGORY_NO_WATER,
    CATEGORY_DIRTY_WATER,
    CATEGORY_SANITATION,
    CATEGORY_PIPE_BURST,
    CATEGORY_DRAINAGE,
];

/// Validate that a category string is one of the accepted values.
pub fn validate_category(category: &str) -> Result<(), String> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(format!(
            "Invalid category '{category}'. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

pub const URGENCY_LOW: &str = "low";
pub const URGENCY_MEDIUM: &str = "medium";
pub const URGENCY_HIGH: &str = "high";
pub const URGENCY_EMERGENCY: &str = "emergency";

/// All valid urgency levels.
pub const VALID_URGENCIES: &[&str] =
    &[URGENCY_LOW, URGENCY_MEDIUM, URGENCY_HIGH, URGENCY_EMERGENCY];

/// Urgency applied when a complaint is filed without one.
pub const DEFAULT_URGENCY: &str = URGENCY_MEDIUM;

/// Validate that an urgency string is one of the accepted values.
pub fn validate_urgency(urgency: &str) -> Result<(), String> {
    if VALID_URGENCIES.contains(&urgency) {
        Ok(())
    } else {
        Err(format!(
            "Invalid urgency '{urgency}'. Must be one of: {}",
            VALID_URGENCIES.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Validate a latitude/longitude pair supplied with a complaint.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!(
            "Invalid latitude {latitude}. Must be between -90 and 90"
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!(
            "Invalid longitude {longitude}. Must be between -180 and 180"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status state machine
// ---------------------------------------------------------------------------

pub const STATUS_SUBMITTED: &str = "submitted";
pub const STATUS_ASSIGNED: &str = "assigned";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_REJECTED: &str = "rejected";

/// All valid complaint statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_SUBMITTED,
    STATUS_ASSIGNED,
    STATUS_IN_PROGRESS,
    STATUS_RESOLVED,
    STATUS_REJECTED,
];

/// Complaint lifecycle status.
///
/// `SUBMITTED → ASSIGNED → IN_PROGRESS → RESOLVED` is the normal path;
/// `REJECTED` is reachable from any non-terminal state. `RESOLVED` and
/// `REJECTED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintStatus {
    Submitted,
    Assigned,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    /// Return the database/wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => STATUS_SUBMITTED,
            ComplaintStatus::Assigned => STATUS_ASSIGNED,
            ComplaintStatus::InProgress => STATUS_IN_PROGRESS,
            ComplaintStatus::Resolved => STATUS_RESOLVED,
            ComplaintStatus::Rejected => STATUS_REJECTED,
        }
    }

    /// Parse a database/wire status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            STATUS_SUBMITTED => Some(ComplaintStatus::Submitted),
            STATUS_ASSIGNED => Some(ComplaintStatus::Assigned),
            STATUS_IN_PROGRESS => Some(ComplaintStatus::InProgress),
            STATUS_RESOLVED => Some(ComplaintStatus::Resolved),
            STATUS_REJECTED => Some(ComplaintStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Rejected)
    }

    /// Whether this status implies the complaint has been assigned at some
    /// point, so `assigned_at` must be stamped once reached.
    pub fn implies_assignment(self) -> bool {
        matches!(
            self,
            ComplaintStatus::Assigned | ComplaintStatus::InProgress | ComplaintStatus::Resolved
        )
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a status transition.
///
/// Terminal states (`RESOLVED`, `REJECTED`) accept no transition to a
/// different status. Everything else is unrestricted, including backward
/// moves and same-status updates (used to append notes without changing
/// state); the single admin backoffice relies on being able to pull a
/// complaint back to an earlier state.
pub fn validate_transition(from: ComplaintStatus, to: ComplaintStatus) -> Result<(), String> {
    if from.is_terminal() && to != from {
        return Err(format!(
            "Complaint is {from} and can no longer change status"
        ));
    }
    Ok(())
}
