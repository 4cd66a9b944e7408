//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000001_create_users_table.sql`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_MODEL: &str = "model";
pub const ROLE_PHOTOGRAPHER: &str = "photographer";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_RECRUITER: &str = "recruiter";

/// All roles accepted at registration.
pub const VALID_ROLES: &[&str] = &[ROLE_MODEL, ROLE_PHOTOGRAPHER, ROLE_EDITOR, ROLE_RECRUITER];

/// A marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Model,
    Photographer,
    Editor,
    Recruiter,
}

impl Role {
    /// Parse from the database / request representation.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            ROLE_MODEL => Ok(Self::Model),
            ROLE_PHOTOGRAPHER => Ok(Self::Photographer),
            ROLE_EDITOR => Ok(Self::Editor),
            ROLE_RECRUITER => Ok(Self::Recruiter),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {VALID_ROLES:?}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => ROLE_MODEL,
            Self::Photographer => ROLE_PHOTOGRAPHER,
            Self::Editor => ROLE_EDITOR,
            Self::Recruiter => ROLE_RECRUITER,
        }
    }

    /// Creative roles own a portfolio; recruiters browse them.
    pub fn is_creative(self) -> bool {
        !matches!(self, Self::Recruiter)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_role() {
        for name in VALID_ROLES {
            let role = Role::parse(name).expect("known role should parse");
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn parse_rejects_unknown_role() {
        assert!(Role::parse("admin").is_err());
        assert!(Role::parse("Model").is_err(), "role names are case-sensitive");
    }

    #[test]
    fn recruiter_is_not_creative() {
        assert!(!Role::Recruiter.is_creative());
        assert!(Role::Model.is_creative());
        assert!(Role::Photographer.is_creative());
        assert!(Role::Editor.is_creative());
    }
}
