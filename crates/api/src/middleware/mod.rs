//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireModel`] -- Requires the `model` role.
//! - [`rbac::RequireEditor`] -- Requires the `editor` role.
//! - [`rbac::RequireRecruiter`] -- Requires the `recruiter` role.

pub mod auth;
pub mod rbac;
