//! Event-type vocabulary.
//!
//! Dot-separated names, entity first. Subscribers match on these constants
//! rather than comparing string literals inline.

/// A resident filed a new complaint.
pub const COMPLAINT_CREATED: &str = "complaint.created";

/// An admin assigned (or re-assigned) a technician to a complaint.
pub const COMPLAINT_ASSIGNED: &str = "complaint.assigned";

/// A complaint moved to a new lifecycle status.
pub const COMPLAINT_STATUS_CHANGED: &str = "complaint.status_changed";

/// A complaint was removed entirely.
pub const COMPLAINT_DELETED: &str = "complaint.deleted";
