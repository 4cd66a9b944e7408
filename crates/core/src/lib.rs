//! Domain types and rules for the Castlane marketplace.
//!
//! Everything in this crate is pure: no database, no network, no object
//! storage. The `db`, `storage` and `api` crates build on these rules.

pub mod account;
pub mod error;
pub mod gallery;
pub mod media;
pub mod pagination;
pub mod profile;
pub mod roles;
pub mod types;
