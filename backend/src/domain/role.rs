//! Canonical role enumeration.
//!
//! Roles are a closed set. All permission decisions key off this enum rather
//! than free-form strings, so drift such as `support-agent` versus `agent`
//! cannot creep back in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller role recognised by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control, including user provisioning.
    Superadmin,
    /// Lead management without user provisioning.
    Subadmin,
    /// Read-only visibility over leads assigned to them.
    Agent,
}

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Self; 3] = [Self::Superadmin, Self::Subadmin, Self::Agent];

    /// Roles a superadmin may provision through the user API.
    pub const PROVISIONABLE: [Self; 2] = [Self::Subadmin, Self::Agent];
}

/// Error returned when parsing a role from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRoleError;

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superadmin => f.write_str("superadmin"),
            Self::Subadmin => f.write_str("subadmin"),
            Self::Agent => f.write_str("agent"),
        }
    }
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("role must be one of superadmin, subadmin, or agent")
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "superadmin" => Ok(Self::Superadmin),
            "subadmin" => Ok(Self::Subadmin),
            "agent" => Ok(Self::Agent),
            _ => Err(ParseRoleError),
        }
    }
}
