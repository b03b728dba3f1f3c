//! Session moderation workflow
//!
//! ```text
//! pending  --approve-->  approved
//! pending  --reject--->  rejected
//! rejected --resubmit->  pending
//! any      --delete--->  (removed)
//! ```
//!
//! [`plan`] checks the acting user and the current status and yields the one
//! remote call that performs the transition. Illegal transitions never reach
//! the network. [`apply`] performs a planned call on a local copy, which is
//! what a backend (or a test double of one) does on receipt.

use tracing::info;

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{
    ApprovalTerms, Material, Note, Rejection, Role, Session, SessionStatus, StatusUpdate,
};

/// The signed-in user performing an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    fn owns(&self, session: &Session) -> bool {
        self.role != Role::Student && session.is_owned_by(&self.email)
    }
}

/// Something a user asks to do with a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Approve(ApprovalTerms),
    Reject(Rejection),
    Resubmit,
    Delete,
}

impl SessionAction {
    pub fn verb(&self) -> &'static str {
        match self {
            SessionAction::Approve(_) => "approve",
            SessionAction::Reject(_) => "reject",
            SessionAction::Resubmit => "resubmit",
            SessionAction::Delete => "delete",
        }
    }
}

/// The remote call that performs a transition
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    /// `PATCH /sessions/:id/status`
    SetStatus(StatusUpdate),
    /// `PATCH /sessions/:id/resubmit`
    Resubmit,
    /// `DELETE /sessions/:id`
    Delete,
}

/// A checked transition, ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTransition {
    pub session_id: String,
    pub from: SessionStatus,
    /// `None` when the session is removed
    pub to: Option<SessionStatus>,
    pub call: RemoteCall,
}

impl SessionStatus {
    /// Status after `action`, or `None` when the session is removed
    pub fn next(self, action: &SessionAction) -> WorkflowResult<Option<SessionStatus>> {
        use SessionStatus::*;

        match (self, action) {
            (Pending, SessionAction::Approve(_)) => Ok(Some(Approved)),
            (Pending, SessionAction::Reject(_)) => Ok(Some(Rejected)),
            (Rejected, SessionAction::Resubmit) => Ok(Some(Pending)),
            (_, SessionAction::Delete) => Ok(None),
            (from, action) => Err(WorkflowError::IllegalTransition {
                from,
                action: action.verb(),
            }),
        }
    }
}

fn authorize(actor: &Actor, session: &Session, action: &SessionAction) -> WorkflowResult<()> {
    let allowed = match action {
        SessionAction::Approve(_) | SessionAction::Reject(_) => actor.role == Role::Admin,
        SessionAction::Resubmit | SessionAction::Delete => {
            actor.role == Role::Admin || actor.owns(session)
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(WorkflowError::NotPermitted {
            email: actor.email.clone(),
            role: actor.role,
            action: action.verb(),
        })
    }
}

/// Check `action` against the actor and the session's current status
pub fn plan(
    session: &Session,
    actor: &Actor,
    action: SessionAction,
) -> WorkflowResult<PlannedTransition> {
    authorize(actor, session, &action)?;
    let to = session.status.next(&action)?;

    let call = match action {
        SessionAction::Approve(terms) => {
            terms.validate()?;
            RemoteCall::SetStatus(terms.into())
        }
        SessionAction::Reject(rejection) => {
            rejection.validate()?;
            RemoteCall::SetStatus(rejection.into())
        }
        SessionAction::Resubmit => RemoteCall::Resubmit,
        SessionAction::Delete => RemoteCall::Delete,
    };

    Ok(PlannedTransition {
        session_id: session.id.clone(),
        from: session.status,
        to,
        call,
    })
}

/// Apply a status change to a local copy of a session
///
/// Returns `Ok(false)` when the call removes the session.
pub fn apply(session: &mut Session, call: &RemoteCall) -> WorkflowResult<bool> {
    match call {
        RemoteCall::SetStatus(update) => {
            // Moderation decisions are only taken on pending sessions
            if session.status != SessionStatus::Pending {
                let action = match update {
                    StatusUpdate::Approved { .. } => "approve",
                    StatusUpdate::Rejected { .. } => "reject",
                };
                return Err(WorkflowError::IllegalTransition {
                    from: session.status,
                    action,
                });
            }

            match update {
                StatusUpdate::Approved {
                    paid,
                    registration_fee,
                } => {
                    session.paid = *paid;
                    session.registration_fee = if *paid { *registration_fee } else { 0.0 };
                }
                StatusUpdate::Rejected {
                    rejection_reason,
                    feedback,
                } => {
                    session.rejection_reason = Some(rejection_reason.clone());
                    session.feedback = Some(feedback.clone());
                }
            }
            session.status = update.target();
        }
        RemoteCall::Resubmit => {
            session.status.next(&SessionAction::Resubmit)?;
            session.status = SessionStatus::Pending;
            session.rejection_reason = None;
            session.feedback = None;
        }
        RemoteCall::Delete => return Ok(false),
    }

    info!("Session {} is now {}", session.id, session.status);
    Ok(true)
}

/// Check that `actor` may attach materials to `session`
pub fn ensure_material_upload(session: &Session, actor: &Actor) -> WorkflowResult<()> {
    if actor.role != Role::Admin && !actor.owns(session) {
        return Err(WorkflowError::NotPermitted {
            email: actor.email.clone(),
            role: actor.role,
            action: "upload materials for",
        });
    }
    if session.status != SessionStatus::Approved {
        return Err(WorkflowError::SessionNotApproved(session.status));
    }
    Ok(())
}

/// Check that `actor` may edit or delete `material`
pub fn ensure_material_owner(
    material: &Material,
    actor: &Actor,
    action: &'static str,
) -> WorkflowResult<()> {
    let owner =
        actor.role != Role::Student && material.tutor_email.eq_ignore_ascii_case(&actor.email);
    if actor.role == Role::Admin || owner {
        Ok(())
    } else {
        Err(WorkflowError::NotPermitted {
            email: actor.email.clone(),
            role: actor.role,
            action,
        })
    }
}

/// Notes are controlled by their author only
pub fn ensure_note_owner(note: &Note, actor: &Actor, action: &'static str) -> WorkflowResult<()> {
    if note.email.eq_ignore_ascii_case(&actor.email) {
        Ok(())
    } else {
        Err(WorkflowError::NotPermitted {
            email: actor.email.clone(),
            role: actor.role,
            action,
        })
    }
}
