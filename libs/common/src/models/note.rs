//! Student note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Note entity, owned by the student whose email it carries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// New note creation payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNote {
    pub email: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Note update payload; the owner is never part of an update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateNote {
    pub title: String,
    pub description: String,
}
