//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role or a valid `X-Admin-Key`.
//! - [`rbac::RequireTechnician`] -- Requires `technician` or `admin` role.

pub mod auth;
pub mod rbac;
