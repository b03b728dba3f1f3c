//! Wire models shared by the client and its tests

pub mod announcement;
pub mod booking;
pub mod material;
pub mod note;
pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use announcement::Announcement;
pub use booking::{Booking, PaymentStatus};
pub use material::{Material, NewMaterial, UpdateMaterial};
pub use note::{NewNote, Note, UpdateNote};
pub use role::{Role, UpdateRole};
pub use session::{
    ApprovalTerms, NewSession, PublicSessionPage, Rejection, Session, SessionForm, SessionStatus,
    StatusUpdate, UpdateSession,
};
pub use user::{StudentPage, User};
