//! Role-gated access predicates
//!
//! Every gated page names one [`Gate`]. A gate is evaluated against the
//! current [`RoleState`] and yields a [`GateDecision`]; the decision depends
//! only on the role, never on how the user navigated to the page.

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Path a role gate sends users who lack the required role
pub const DASHBOARD_FALLBACK: &str = "/dashboard";

/// Path the private gate sends signed-out users
pub const SIGN_IN_PATH: &str = "/signin";

/// Path shown after the backend answers 403
pub const FORBIDDEN_PATH: &str = "/forbidden";

/// Access requirement attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    /// Any signed-in user
    Private,
    /// Students, tutors and admins
    Student,
    /// Tutors and admins
    Tutor,
    /// Admins only
    Admin,
}

impl Gate {
    /// Whether a signed-in user with `role` passes this gate
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Gate::Private | Gate::Student => true,
            Gate::Tutor => matches!(role, Role::Tutor | Role::Admin),
            Gate::Admin => role == Role::Admin,
        }
    }

    /// Where a refused user is sent
    pub fn fallback(&self) -> &'static str {
        match self {
            Gate::Private => SIGN_IN_PATH,
            _ => DASHBOARD_FALLBACK,
        }
    }
}

/// What the client currently knows about the user's role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleState {
    /// The identity provider or the role lookup has not answered yet
    #[default]
    Loading,
    /// Nobody is signed in
    SignedOut,
    /// Signed in with a resolved role
    Resolved(Role),
}

impl RoleState {
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleState::Resolved(role) => Some(*role),
            _ => None,
        }
    }
}

/// Outcome of evaluating a gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Block navigation behind a spinner until the role is known
    Loading,
    /// Send the user to `to`, remembering the path they attempted
    Redirect { to: &'static str, from: String },
    /// Render the gated page unchanged
    Render,
}

/// Evaluate `gate` for a user trying to reach `attempted_path`
pub fn evaluate(gate: Gate, state: RoleState, attempted_path: &str) -> GateDecision {
    let permitted = match state {
        RoleState::Loading => return GateDecision::Loading,
        RoleState::SignedOut => false,
        RoleState::Resolved(role) => gate.permits(role),
    };

    if permitted {
        GateDecision::Render
    } else {
        let to = match state {
            RoleState::SignedOut => SIGN_IN_PATH,
            _ => gate.fallback(),
        };
        GateDecision::Redirect {
            to,
            from: attempted_path.to_string(),
        }
    }
}

/// Evaluate a chain of gates, outermost first; the first non-render wins
pub fn evaluate_all(gates: &[Gate], state: RoleState, attempted_path: &str) -> GateDecision {
    gates
        .iter()
        .map(|gate| evaluate(*gate, state, attempted_path))
        .find(|decision| *decision != GateDecision::Render)
        .unwrap_or(GateDecision::Render)
}
