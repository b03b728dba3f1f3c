//! Role model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace role of a signed-in user
///
/// Roles are a flat set; the ordering of privileges is expressed by the
/// gates in [`crate::access`], not by comparing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Tutor,
    Admin,
}

impl Role {
    /// Get the role name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "tutor" => Ok(Role::Tutor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Role update payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateRole {
    pub role: Role,
}
