//! Announcement model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Announcement entity; read-only, aggregated for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
