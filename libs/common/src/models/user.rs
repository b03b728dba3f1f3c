//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// User entity as returned by `/users`, `/tutors` and `/students`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub email: String,
    #[serde(default, alias = "displayName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name to show for the user, falling back to the email address
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// One page of the admin student listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudentPage {
    #[serde(default)]
    pub students: Vec<User>,
    #[serde(default = "one")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u64,
}

fn one() -> u32 {
    1
}
