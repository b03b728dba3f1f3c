//! Route table and gated route resolution

use common::access::{Gate, GateDecision, RoleState, evaluate_all};
use std::collections::HashMap;

/// Every page the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Forbidden,
    SignIn,
    SignUp,
    ResetPassword,
    AboutUs,
    Support,
    Privacy,
    Terms,
    Cookies,
    Announcements,
    StudySessions,
    SessionDetails,
    MyProfile,
    Payment,
    DashboardHome,
    CreateNote,
    ManageNotes,
    MyBookings,
    BookingDetails,
    CreateSession,
    TutorSessions,
    UpdateSession,
    UploadMaterials,
    UploadSessionMaterials,
    TutorMaterials,
    AdminUsers,
    AdminUserDetails,
    AdminSessions,
    AdminSessionDetails,
    AdminMaterials,
    AdminAnnouncements,
    NotFound,
}

/// A path pattern with `:param` segments and the gates in front of it
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub pattern: &'static str,
    pub page: Page,
    /// Outermost first
    pub gates: &'static [Gate],
}

const PUBLIC: &[Gate] = &[];
const PRIVATE: &[Gate] = &[Gate::Private];
const STUDENT: &[Gate] = &[Gate::Private, Gate::Student];
const TUTOR: &[Gate] = &[Gate::Private, Gate::Tutor];
const ADMIN: &[Gate] = &[Gate::Private, Gate::Admin];

const fn route(pattern: &'static str, page: Page, gates: &'static [Gate]) -> Route {
    Route {
        pattern,
        page,
        gates,
    }
}

pub const ROUTES: &[Route] = &[
    route("/", Page::Home, PUBLIC),
    route("/forbidden", Page::Forbidden, PUBLIC),
    route("/signin", Page::SignIn, PUBLIC),
    route("/signup", Page::SignUp, PUBLIC),
    route("/reset-password", Page::ResetPassword, PUBLIC),
    route("/about-us", Page::AboutUs, PUBLIC),
    route("/support", Page::Support, PUBLIC),
    route("/privacy", Page::Privacy, PUBLIC),
    route("/terms", Page::Terms, PUBLIC),
    route("/cookies", Page::Cookies, PUBLIC),
    route("/announcements", Page::Announcements, PUBLIC),
    route("/study-sessions", Page::StudySessions, PUBLIC),
    route("/study-sessions/:id", Page::SessionDetails, PUBLIC),
    route("/my-profile", Page::MyProfile, PRIVATE),
    route("/payment/:id", Page::Payment, PRIVATE),
    route("/dashboard", Page::DashboardHome, PRIVATE),
    route("/dashboard/student/create-note", Page::CreateNote, STUDENT),
    route("/dashboard/student/manage-notes", Page::ManageNotes, STUDENT),
    route("/dashboard/student/my-bookings", Page::MyBookings, STUDENT),
    route("/dashboard/student/my-bookings/:id", Page::BookingDetails, STUDENT),
    route("/dashboard/tutor/create-session", Page::CreateSession, TUTOR),
    route("/dashboard/tutor/sessions", Page::TutorSessions, TUTOR),
    route("/dashboard/tutor/update-session/:id", Page::UpdateSession, TUTOR),
    route("/dashboard/tutor/upload-materials", Page::UploadMaterials, TUTOR),
    route(
        "/dashboard/tutor/upload-materials/:sessionId",
        Page::UploadSessionMaterials,
        TUTOR,
    ),
    route("/dashboard/tutor/materials", Page::TutorMaterials, TUTOR),
    route("/dashboard/admin/users", Page::AdminUsers, ADMIN),
    route("/dashboard/admin/users/:id", Page::AdminUserDetails, ADMIN),
    route("/dashboard/admin/sessions", Page::AdminSessions, ADMIN),
    route("/dashboard/admin/sessions/:id", Page::AdminSessionDetails, ADMIN),
    route("/dashboard/admin/materials", Page::AdminMaterials, ADMIN),
    route("/dashboard/admin/announcements", Page::AdminAnnouncements, ADMIN),
];

/// A matched route with its captured parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub page: Page,
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn matches(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern: Vec<&str> = segments(pattern).collect();
    let path: Vec<&str> = segments(path).collect();
    if pattern.len() != path.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (expected, actual) in pattern.iter().zip(&path) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), actual.to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

/// Find the route for `path`, ignoring any query string
pub fn match_path(path: &str) -> Option<(&'static Route, HashMap<String, String>)> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    ROUTES
        .iter()
        .find_map(|route| matches(route.pattern, path).map(|params| (route, params)))
}

/// What the router does with a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Suspend navigation until the role is known
    Loading,
    /// Send the user elsewhere, remembering where they were going
    Redirect { to: &'static str, from: String },
    Render(RouteMatch),
}

/// Resolve `path` for a user in `state`
pub fn resolve(path: &str, state: RoleState) -> RouteOutcome {
    let Some((route, params)) = match_path(path) else {
        return RouteOutcome::Render(RouteMatch {
            page: Page::NotFound,
            params: HashMap::new(),
        });
    };

    match evaluate_all(route.gates, state, path) {
        GateDecision::Loading => RouteOutcome::Loading,
        GateDecision::Redirect { to, from } => RouteOutcome::Redirect { to, from },
        GateDecision::Render => RouteOutcome::Render(RouteMatch {
            page: route.page,
            params,
        }),
    }
}
