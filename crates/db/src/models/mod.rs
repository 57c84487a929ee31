//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches where the entity is mutable

pub mod complaint;
pub mod notification;
pub mod password_reset;
pub mod report;
pub mod role;
pub mod session;
pub mod task;
pub mod technician;
pub mod user;
