//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod complaint_repo;
pub mod notification_repo;
pub mod password_reset_repo;
pub mod report_repo;
pub mod role_repo;
pub mod session_repo;
pub mod task_repo;
pub mod technician_repo;
pub mod user_repo;

pub use complaint_repo::ComplaintRepo;
pub use notification_repo::NotificationRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use report_repo::ReportRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use task_repo::TaskRepo;
pub use technician_repo::TechnicianRepo;
pub use user_repo::UserRepo;
