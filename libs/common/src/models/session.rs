//! Study session model and its request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::duration::{SessionDuration, deserialize_free_text};
use crate::error::{DateError, WorkflowError, WorkflowResult};
use crate::status::{RegistrationStatus, try_registration_status};

/// Moderation status of a study session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SessionStatus {
    /// Get the status name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Approved => "approved",
            SessionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SessionStatus::Pending),
            "approved" => Ok(SessionStatus::Approved),
            "rejected" => Ok(SessionStatus::Rejected),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// Session entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tutor_name: String,
    pub tutor_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_image: Option<String>,
    #[serde(default)]
    pub registration_start: Option<String>,
    #[serde(default)]
    pub registration_end: Option<String>,
    #[serde(default)]
    pub class_start: Option<String>,
    #[serde(default)]
    pub class_end: Option<String>,
    #[serde(default, deserialize_with = "deserialize_free_text")]
    pub duration: String,
    #[serde(default)]
    pub registration_fee: f64,
    #[serde(default)]
    pub paid: bool,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Registration status at `now`, failing on missing or malformed dates
    pub fn try_registration_status(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RegistrationStatus, DateError> {
        try_registration_status(
            now,
            self.registration_start.as_deref(),
            self.registration_end.as_deref(),
        )
    }

    /// Registration status at `now`; unreadable dates count as `Closed`
    pub fn registration_status(&self, now: DateTime<Utc>) -> RegistrationStatus {
        self.try_registration_status(now).unwrap_or_else(|e| {
            debug!("Session {} treated as closed: {}", self.id, e);
            RegistrationStatus::Closed
        })
    }

    /// Whether the session belongs to the tutor with this email
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.tutor_email.eq_ignore_ascii_case(email)
    }

    /// Parsed view of the free-text duration, when it is recognisable
    pub fn parsed_duration(&self) -> Option<SessionDuration> {
        self.duration.parse().ok()
    }
}

/// Fields a tutor fills in to create a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionForm {
    pub title: String,
    pub description: String,
    pub registration_start: String,
    pub registration_end: String,
    pub class_start: String,
    pub class_end: String,
    pub duration: String,
    pub session_image: Option<String>,
}

/// New session creation payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub title: String,
    pub tutor_name: String,
    pub tutor_email: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_image: Option<String>,
    pub registration_start: String,
    pub registration_end: String,
    pub class_start: String,
    pub class_end: String,
    pub duration: String,
    pub registration_fee: f64,
    pub status: SessionStatus,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl NewSession {
    /// Build the creation payload for a tutor's form; new sessions are
    /// always free and pending until an admin approves them
    pub fn pending(
        form: SessionForm,
        tutor_name: impl Into<String>,
        tutor_email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            title: form.title.trim().to_string(),
            tutor_name: tutor_name.into(),
            tutor_email: tutor_email.into(),
            description: form.description.trim().to_string(),
            session_image: form.session_image,
            registration_start: form.registration_start,
            registration_end: form.registration_end,
            class_start: form.class_start,
            class_end: form.class_end,
            duration: form.duration.trim().to_string(),
            registration_fee: 0.0,
            status: SessionStatus::Pending,
            created_at: now,
        }
    }
}

/// Session update payload; tutor and status are not editable here
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Terms an admin chooses when approving a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApprovalTerms {
    pub paid: bool,
    pub amount: f64,
}

impl ApprovalTerms {
    pub fn free() -> Self {
        Self {
            paid: false,
            amount: 0.0,
        }
    }

    pub fn paid(amount: f64) -> Self {
        Self { paid: true, amount }
    }

    /// Fee to persist; a free session always carries a zero fee
    pub fn registration_fee(&self) -> f64 {
        if self.paid { self.amount } else { 0.0 }
    }

    pub fn validate(&self) -> WorkflowResult<()> {
        if self.paid && !(self.amount.is_finite() && self.amount >= 0.0) {
            return Err(WorkflowError::InvalidFee(self.amount));
        }
        Ok(())
    }
}

/// Reason and feedback an admin gives when rejecting a session
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub reason: String,
    pub feedback: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            feedback: feedback.into(),
        }
    }

    pub fn validate(&self) -> WorkflowResult<()> {
        if self.reason.trim().is_empty() {
            return Err(WorkflowError::MissingReason);
        }
        Ok(())
    }
}

/// Body of `PATCH /sessions/:id/status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusUpdate {
    #[serde(rename_all = "camelCase")]
    Approved { paid: bool, registration_fee: f64 },
    #[serde(rename_all = "camelCase")]
    Rejected {
        rejection_reason: String,
        feedback: String,
    },
}

impl StatusUpdate {
    pub fn target(&self) -> SessionStatus {
        match self {
            StatusUpdate::Approved { .. } => SessionStatus::Approved,
            StatusUpdate::Rejected { .. } => SessionStatus::Rejected,
        }
    }
}

impl From<ApprovalTerms> for StatusUpdate {
    fn from(terms: ApprovalTerms) -> Self {
        StatusUpdate::Approved {
            paid: terms.paid,
            registration_fee: terms.registration_fee(),
        }
    }
}

impl From<Rejection> for StatusUpdate {
    fn from(rejection: Rejection) -> Self {
        StatusUpdate::Rejected {
            rejection_reason: rejection.reason,
            feedback: rejection.feedback,
        }
    }
}

/// One page of `/public-sessions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PublicSessionPage {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn wire_session() -> serde_json::Value {
        json!({
            "_id": "s1",
            "title": "Linear Algebra",
            "description": "Vectors and matrices",
            "tutorName": "Grace",
            "tutorEmail": "grace@edu.io",
            "registrationStart": "2024-01-01",
            "registrationEnd": "2024-01-31",
            "classStart": "2024-02-05",
            "classEnd": "2024-03-05",
            "duration": 2,
            "registrationFee": 0,
            "status": "pending",
            "created_at": "2023-12-20T10:00:00.000Z"
        })
    }

    #[test]
    fn reads_backend_document() {
        let session: Session = serde_json::from_value(wire_session()).unwrap();
        assert_eq!(session.id, "s1");
        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.duration, "2");
        assert!(!session.paid);
        assert!(session.is_owned_by("Grace@edu.io"));
    }

    #[test]
    fn status_follows_registration_window() {
        let session: Session = serde_json::from_value(wire_session()).unwrap();
        let inside = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(session.registration_status(inside), RegistrationStatus::Ongoing);
        assert_eq!(session.registration_status(after), RegistrationStatus::Closed);
    }

    #[test]
    fn missing_dates_are_closed_but_reported() {
        let mut session: Session = serde_json::from_value(wire_session()).unwrap();
        session.registration_end = None;
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(session.registration_status(now), RegistrationStatus::Closed);
        assert_eq!(
            session.try_registration_status(now),
            Err(DateError::Missing("registrationEnd"))
        );
    }

    #[test]
    fn unpaid_approval_forces_zero_fee() {
        let terms = ApprovalTerms {
            paid: false,
            amount: 300.0,
        };
        let body = serde_json::to_value(StatusUpdate::from(terms)).unwrap();
        assert_eq!(
            body,
            json!({"status": "approved", "paid": false, "registrationFee": 0.0})
        );
    }

    #[test]
    fn negative_fee_rejected_only_when_paid() {
        assert_eq!(
            ApprovalTerms::paid(-5.0).validate(),
            Err(WorkflowError::InvalidFee(-5.0))
        );
        assert!(
            ApprovalTerms {
                paid: false,
                amount: -5.0
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn rejection_body_uses_camel_case() {
        let body =
            serde_json::to_value(StatusUpdate::from(Rejection::new("incomplete", "add dates")))
                .unwrap();
        assert_eq!(
            body,
            json!({"status": "rejected", "rejectionReason": "incomplete", "feedback": "add dates"})
        );
    }

    #[test]
    fn new_sessions_start_pending_and_free() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let form = SessionForm {
            title: "  Calculus ".into(),
            duration: "3 weeks".into(),
            ..Default::default()
        };
        let payload = NewSession::pending(form, "Grace", "grace@edu.io", now);
        assert_eq!(payload.title, "Calculus");
        assert_eq!(payload.status, SessionStatus::Pending);
        assert_eq!(payload.registration_fee, 0.0);
    }
}
