//! Custom error types for the domain library
//!
//! These errors never involve I/O; they describe input the domain refuses.

use thiserror::Error;

use crate::models::{Role, SessionStatus};

/// Error raised while reading a registration or class date
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The field was absent or blank
    #[error("{0} is missing")]
    Missing(&'static str),

    /// The field did not match any accepted date format
    #[error("{field} is not a valid date: {value:?}")]
    Malformed { field: &'static str, value: String },
}

/// Error raised by the session moderation workflow
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// The action is not allowed from the session's current status
    #[error("cannot {action} a session that is {from}")]
    IllegalTransition {
        from: SessionStatus,
        action: &'static str,
    },

    /// The acting user lacks the role or ownership the action requires
    #[error("{role} {email} may not {action} this session")]
    NotPermitted {
        email: String,
        role: Role,
        action: &'static str,
    },

    /// Approval terms carried a negative or non-finite fee
    #[error("registration fee must be a non-negative amount, got {0}")]
    InvalidFee(f64),

    /// Rejection is missing its reason
    #[error("a rejection reason is required")]
    MissingReason,

    /// Materials can only be attached to approved sessions
    #[error("materials can only be uploaded for approved sessions (session is {0})")]
    SessionNotApproved(SessionStatus),
}

/// Type alias for Result with WorkflowError
pub type WorkflowResult<T> = Result<T, WorkflowError>;
