//! Domain library for Edu Sync
//!
//! This crate holds the parts of the study-session marketplace that do not
//! touch the network: the wire data model, registration status derivation,
//! the session moderation workflow, role-gated access predicates, form
//! validation and the aggregations behind the public statistics page.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use common::status::{RegistrationStatus, registration_status};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
//! let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
//! assert_eq!(registration_status(now, start, end), RegistrationStatus::Ongoing);
//! ```

pub mod access;
pub mod duration;
pub mod error;
pub mod models;
pub mod stats;
pub mod status;
pub mod validation;
pub mod workflow;

pub use access::{Gate, GateDecision, RoleState};
pub use error::{DateError, WorkflowError};
pub use models::{Role, Session, SessionStatus};
pub use status::{RegistrationStatus, registration_status};
