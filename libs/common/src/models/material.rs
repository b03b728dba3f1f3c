//! Study material model

use serde::{Deserialize, Serialize};

/// Material entity, scoped to the tutor who uploaded it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub resource_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub tutor_email: String,
    /// Weak reference to the owning session; lookup only
    pub session_id: String,
}

/// New material creation payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMaterial {
    pub title: String,
    pub resource_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub tutor_email: String,
    pub session_id: String,
}

/// Material edit-in-place payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterial {
    pub title: String,
    pub resource_link: String,
}
