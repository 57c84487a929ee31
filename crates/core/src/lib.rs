//! Waterline domain layer.
//!
//! Pure types and rules shared by the persistence, event, and API crates:
//! id/timestamp aliases, the error taxonomy, the complaint vocabulary and
//! lifecycle state machine, staff vocabularies, notification audiences, and
//! pagination parameter handling. This crate performs no I/O.

pub mod audience;
pub mod complaint;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod technician;
pub mod types;
