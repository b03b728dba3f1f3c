//! Booking model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Badge label shown next to a booking
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Unknown => "Unknown",
        }
    }
}

/// Booking entity; read-only from the client's side
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub student_email: String,
    pub session_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "unknown_payment")]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_at: Option<DateTime<Utc>>,
}

fn unknown_payment() -> PaymentStatus {
    PaymentStatus::Unknown
}
