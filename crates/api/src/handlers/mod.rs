//! Request handlers, one submodule per resource.
//!
//! Handlers validate input against the vocabulary in `waterline_core`,
//! delegate persistence to the repositories in `waterline_db`, and map
//! errors via [`AppError`](crate::error::AppError). Lifecycle mutations
//! additionally publish a [`DomainEvent`](waterline_events::DomainEvent)
//! after the database write commits.

pub mod admin;
pub mod auth;
pub mod complaint;
pub mod notification;
pub mod reports;
pub mod technician;
