//! In-process mock of the marketplace backend
//!
//! The mock keeps its data in memory, authenticates bearer tokens against a
//! fixed table and counts requests per `METHOD /path` so tests can tell
//! whether a call reached the network.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, put},
};
use client::auth::StaticIdentity;
use client::config::ClientConfig;
use client::state::AppState;
use common::models::{
    Announcement, Booking, Material, NewMaterial, NewNote, NewSession, Note, Role, Session,
    SessionStatus, StatusUpdate, UpdateMaterial, UpdateNote, UpdateRole, UpdateSession, User,
};
use common::workflow::{RemoteCall, apply};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ADMIN: (&str, &str) = ("admin@edu.io", "admin-token");
pub const TUTOR: (&str, &str) = ("tutor@edu.io", "tutor-token");
pub const OTHER_TUTOR: (&str, &str) = ("other@edu.io", "other-token");
pub const STUDENT: (&str, &str) = ("student@edu.io", "student-token");

/// Error responses in the backend's `{ "message": ... }` shape
#[derive(Debug)]
pub enum MockError {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            MockError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized access".to_string()),
            MockError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden access".to_string()),
            MockError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            MockError::Conflict(message) => (StatusCode::CONFLICT, message),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

type MockResult<T> = Result<T, MockError>;

#[derive(Default)]
struct Store {
    sessions: Vec<Session>,
    materials: Vec<Material>,
    notes: Vec<Note>,
    users: Vec<User>,
    announcements: Vec<Announcement>,
    bookings: Vec<Booking>,
    hits: HashMap<String, usize>,
    last_bodies: HashMap<String, Value>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// Shared handle on the mock's data
#[derive(Clone)]
pub struct Mock {
    store: Arc<Mutex<Store>>,
    tokens: Arc<HashMap<&'static str, (&'static str, Role)>>,
}

#[derive(Debug, Clone, Copy)]
struct Caller {
    email: &'static str,
    role: Role,
}

fn user(email: &str, name: &str, role: Role, specialty: Option<&str>) -> User {
    User {
        email: email.to_string(),
        name: Some(name.to_string()),
        photo_url: None,
        role,
        specialty: specialty.map(str::to_string),
        created_at: None,
    }
}

/// Re-read `value` with an `_id` field added
fn with_id<T: Serialize, U: DeserializeOwned>(value: &T, id: &str) -> U {
    let mut json = serde_json::to_value(value).expect("serializable payload");
    json["_id"] = Value::String(id.to_string());
    serde_json::from_value(json).expect("payload with id")
}

impl Mock {
    fn new() -> Self {
        let tokens = HashMap::from([
            (ADMIN.1, (ADMIN.0, Role::Admin)),
            (TUTOR.1, (TUTOR.0, Role::Tutor)),
            (OTHER_TUTOR.1, (OTHER_TUTOR.0, Role::Tutor)),
            (STUDENT.1, (STUDENT.0, Role::Student)),
        ]);
        let store = Store {
            users: vec![
                user(ADMIN.0, "Ada Admin", Role::Admin, None),
                user(TUTOR.0, "Rosalind", Role::Tutor, Some("Chemistry")),
                user(OTHER_TUTOR.0, "Emmy", Role::Tutor, Some("Mathematics")),
                user(STUDENT.0, "Sam", Role::Student, None),
            ],
            ..Store::default()
        };
        Self {
            store: Arc::new(Mutex::new(store)),
            tokens: Arc::new(tokens),
        }
    }

    fn caller(&self, headers: &HeaderMap) -> MockResult<Caller> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(MockError::Unauthorized)?;
        self.tokens
            .get(token)
            .map(|&(email, role)| Caller { email, role })
            .ok_or(MockError::Unauthorized)
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut store = self.store.lock().expect("mock store lock");
        f(&mut store)
    }

    pub fn insert_session(&self, session: Session) {
        self.with_store(|store| store.sessions.push(session));
    }

    pub fn insert_material(&self, material: Material) {
        self.with_store(|store| store.materials.push(material));
    }

    pub fn insert_user(&self, email: &str, name: &str, role: Role) {
        self.with_store(|store| store.users.push(user(email, name, role, None)));
    }

    pub fn insert_announcement(&self, category: Option<&str>, content: &str) {
        self.with_store(|store| {
            store.announcements.push(Announcement {
                title: None,
                category: category.map(str::to_string),
                content: content.to_string(),
                created_at: None,
            })
        });
    }

    pub fn insert_booking(&self, booking: Booking) {
        self.with_store(|store| store.bookings.push(booking));
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        self.with_store(|store| store.sessions.iter().find(|s| s.id == id).cloned())
    }

    pub fn sessions_of(&self, tutor_email: &str) -> Vec<Session> {
        self.with_store(|store| {
            store
                .sessions
                .iter()
                .filter(|s| s.tutor_email == tutor_email)
                .cloned()
                .collect()
        })
    }

    pub fn role_of(&self, email: &str) -> Option<Role> {
        self.with_store(|store| store.users.iter().find(|u| u.email == email).map(|u| u.role))
    }

    /// Requests received for `key`, e.g. `"PATCH /sessions/s1/status"`
    pub fn hits(&self, key: &str) -> usize {
        self.with_store(|store| store.hits.get(key).copied().unwrap_or(0))
    }

    /// Body of the last request to `key`
    pub fn last_body(&self, key: &str) -> Option<Value> {
        self.with_store(|store| store.last_bodies.get(key).cloned())
    }

    fn record_body(&self, key: String, body: &impl Serialize) {
        let value = serde_json::to_value(body).expect("serializable body");
        self.with_store(|store| store.last_bodies.insert(key, value));
    }

    fn find_session(&self, id: &str) -> MockResult<Session> {
        self.session(id).ok_or(MockError::NotFound)
    }

    fn update_session(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> MockResult<()>,
    ) -> MockResult<Json<Value>> {
        self.with_store(|store| {
            let session = store
                .sessions
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(MockError::NotFound)?;
            f(session)?;
            Ok(Json(json!({ "acknowledged": true, "modifiedCount": 1 })))
        })
    }
}

fn may_manage(caller: Caller, owner_email: &str) -> bool {
    caller.role == Role::Admin || (caller.role == Role::Tutor && caller.email == owner_email)
}

async fn count_hits(State(mock): State<Mock>, request: Request, next: Next) -> Response {
    let key = format!("{} {}", request.method(), request.uri().path());
    mock.with_store(|store| *store.hits.entry(key).or_default() += 1);
    next.run(request).await
}

async fn available_sessions(State(mock): State<Mock>) -> Json<Vec<Session>> {
    Json(mock.with_store(|store| {
        store
            .sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Approved)
            .cloned()
            .collect()
    }))
}

async fn public_sessions(
    State(mock): State<Mock>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let Json(approved) = available_sessions(State(mock)).await;
    let total = approved.len();
    let sessions: Vec<Session> = approved
        .into_iter()
        .skip((page.max(1) - 1) * limit)
        .take(limit)
        .collect();
    Json(json!({
        "sessions": sessions,
        "totalPages": total.div_ceil(limit.max(1)).max(1),
        "totalItems": total,
    }))
}

async fn list_sessions(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> MockResult<Json<Vec<Session>>> {
    let caller = mock.caller(&headers)?;
    match query.get("email") {
        Some(email) if caller.role == Role::Admin || email == caller.email => {
            Ok(Json(mock.sessions_of(email)))
        }
        None if caller.role == Role::Admin => {
            Ok(Json(mock.with_store(|store| store.sessions.clone())))
        }
        _ => Err(MockError::Forbidden),
    }
}

async fn create_session(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(payload): Json<NewSession>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    if !may_manage(caller, &payload.tutor_email) {
        return Err(MockError::Forbidden);
    }
    let id = mock.with_store(|store| store.next_id("session-"));
    let session: Session = with_id(&payload, &id);
    mock.insert_session(session);
    Ok(Json(json!({ "acknowledged": true, "insertedId": id })))
}

async fn session_details(
    State(mock): State<Mock>,
    Path(id): Path<String>,
) -> MockResult<Json<Session>> {
    mock.find_session(&id).map(Json)
}

async fn update_session(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<UpdateSession>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    mock.update_session(&id, |session| {
        if !may_manage(caller, &session.tutor_email) {
            return Err(MockError::Forbidden);
        }
        if let Some(title) = update.title {
            session.title = title;
        }
        if let Some(description) = update.description {
            session.description = description;
        }
        if let Some(duration) = update.duration {
            session.duration = duration;
        }
        Ok(())
    })
}

async fn delete_session(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    let session = mock.find_session(&id)?;
    if !may_manage(caller, &session.tutor_email) {
        return Err(MockError::Forbidden);
    }
    mock.with_store(|store| store.sessions.retain(|s| s.id != id));
    Ok(Json(json!({ "acknowledged": true, "deletedCount": 1 })))
}

async fn set_status(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    if caller.role != Role::Admin {
        return Err(MockError::Forbidden);
    }
    mock.record_body(format!("PATCH /sessions/{id}/status"), &update);
    mock.update_session(&id, |session| {
        apply(session, &RemoteCall::SetStatus(update))
            .map(|_| ())
            .map_err(|e| MockError::Conflict(e.to_string()))
    })
}

async fn resubmit(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    mock.update_session(&id, |session| {
        if !may_manage(caller, &session.tutor_email) {
            return Err(MockError::Forbidden);
        }
        apply(session, &RemoteCall::Resubmit)
            .map(|_| ())
            .map_err(|e| MockError::Conflict(e.to_string()))
    })
}

async fn list_materials(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> MockResult<Json<Vec<Material>>> {
    let caller = mock.caller(&headers)?;
    let tutor = query.get("tutorEmail");
    if tutor.is_none() && caller.role != Role::Admin {
        return Err(MockError::Forbidden);
    }
    Ok(Json(mock.with_store(|store| {
        store
            .materials
            .iter()
            .filter(|m| tutor.is_none_or(|email| &m.tutor_email == email))
            .cloned()
            .collect()
    })))
}

async fn create_material(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(payload): Json<NewMaterial>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    if !may_manage(caller, &payload.tutor_email) {
        return Err(MockError::Forbidden);
    }
    let id = mock.with_store(|store| store.next_id("material-"));
    mock.insert_material(with_id(&payload, &id));
    Ok(Json(json!({ "acknowledged": true, "insertedId": id })))
}

async fn update_material(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<UpdateMaterial>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    mock.with_store(|store| {
        let material = store
            .materials
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(MockError::NotFound)?;
        if !may_manage(caller, &material.tutor_email) {
            return Err(MockError::Forbidden);
        }
        material.title = update.title;
        material.resource_link = update.resource_link;
        Ok(Json(json!({ "acknowledged": true, "modifiedCount": 1 })))
    })
}

async fn delete_material(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    mock.with_store(|store| {
        let material = store
            .materials
            .iter()
            .find(|m| m.id == id)
            .ok_or(MockError::NotFound)?;
        if !may_manage(caller, &material.tutor_email) {
            return Err(MockError::Forbidden);
        }
        store.materials.retain(|m| m.id != id);
        Ok(Json(json!({ "acknowledged": true, "deletedCount": 1 })))
    })
}

async fn list_notes(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> MockResult<Json<Vec<Note>>> {
    let caller = mock.caller(&headers)?;
    let email = query.get("email").ok_or(MockError::Forbidden)?;
    if email != caller.email {
        return Err(MockError::Forbidden);
    }
    Ok(Json(mock.with_store(|store| {
        store
            .notes
            .iter()
            .filter(|n| &n.email == email)
            .cloned()
            .collect()
    })))
}

async fn create_note(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(payload): Json<NewNote>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    if payload.email != caller.email {
        return Err(MockError::Forbidden);
    }
    mock.with_store(|store| {
        let id = store.next_id("note-");
        store.notes.push(with_id(&payload, &id));
        Ok(Json(json!({ "acknowledged": true, "insertedId": id })))
    })
}

async fn update_note(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<UpdateNote>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    mock.with_store(|store| {
        let note = store
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(MockError::NotFound)?;
        if note.email != caller.email {
            return Err(MockError::Forbidden);
        }
        note.title = update.title;
        note.description = update.description;
        Ok(Json(json!({ "acknowledged": true, "modifiedCount": 1 })))
    })
}

async fn delete_note(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    mock.with_store(|store| {
        let before = store.notes.len();
        store
            .notes
            .retain(|n| !(n.id == id && n.email == caller.email));
        if store.notes.len() == before {
            return Err(MockError::NotFound);
        }
        Ok(Json(json!({ "acknowledged": true, "deletedCount": 1 })))
    })
}

async fn list_users(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> MockResult<Json<Vec<User>>> {
    let caller = mock.caller(&headers)?;
    if caller.role != Role::Admin {
        return Err(MockError::Forbidden);
    }
    let search = query.get("search").map(|s| s.to_lowercase());
    Ok(Json(mock.with_store(|store| {
        store
            .users
            .iter()
            .filter(|u| {
                search.as_deref().is_none_or(|term| {
                    u.email.contains(term)
                        || u.display_name().to_lowercase().contains(term)
                })
            })
            .cloned()
            .collect()
    })))
}

async fn user_role(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> MockResult<Json<UpdateRole>> {
    mock.caller(&headers)?;
    mock.role_of(&email)
        .map(|role| Json(UpdateRole { role }))
        .ok_or(MockError::NotFound)
}

async fn set_user_role(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(email): Path<String>,
    Json(update): Json<UpdateRole>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    if caller.role != Role::Admin {
        return Err(MockError::Forbidden);
    }
    mock.with_store(|store| {
        let user = store
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or(MockError::NotFound)?;
        user.role = update.role;
        Ok(Json(json!({ "acknowledged": true, "modifiedCount": 1 })))
    })
}

async fn tutors(State(mock): State<Mock>) -> Json<Vec<User>> {
    Json(mock.with_store(|store| {
        store
            .users
            .iter()
            .filter(|u| u.role == Role::Tutor)
            .cloned()
            .collect()
    }))
}

async fn students(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> MockResult<Json<Value>> {
    let caller = mock.caller(&headers)?;
    if caller.role != Role::Admin {
        return Err(MockError::Forbidden);
    }
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(5);
    let all: Vec<User> = mock.with_store(|store| {
        store
            .users
            .iter()
            .filter(|u| u.role == Role::Student)
            .cloned()
            .collect()
    });
    let students: Vec<&User> = all.iter().skip((page.max(1) - 1) * limit).take(limit).collect();
    Ok(Json(json!({
        "students": students,
        "totalPages": all.len().div_ceil(limit.max(1)).max(1),
        "totalItems": all.len(),
    })))
}

async fn announcements(State(mock): State<Mock>) -> Json<Vec<Announcement>> {
    Json(mock.with_store(|store| store.announcements.clone()))
}

async fn student_bookings(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> MockResult<Json<Vec<Booking>>> {
    let caller = mock.caller(&headers)?;
    if caller.email != email && caller.role != Role::Admin {
        return Err(MockError::Forbidden);
    }
    Ok(Json(mock.with_store(|store| {
        store
            .bookings
            .iter()
            .filter(|b| b.student_email == email)
            .cloned()
            .collect()
    })))
}

fn router(mock: Mock) -> Router {
    Router::new()
        .route("/available-sessions", get(available_sessions))
        .route("/public-sessions", get(public_sessions))
        .route("/sessions", get(list_sessions).post(create_session))
        .route(
            "/sessions/:id",
            get(session_details).put(update_session).delete(delete_session),
        )
        .route("/sessions/:id/status", patch(set_status))
        .route("/sessions/:id/resubmit", patch(resubmit))
        .route("/materials", get(list_materials).post(create_material))
        .route("/materials/:id", put(update_material).delete(delete_material))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", patch(update_note).delete(delete_note))
        .route("/users", get(list_users))
        .route("/users/:email/role", get(user_role).patch(set_user_role))
        .route("/tutors", get(tutors))
        .route("/students", get(students))
        .route("/announcements", get(announcements))
        .route("/bookedSessions/student/:email", get(student_bookings))
        .layer(middleware::from_fn_with_state(mock.clone(), count_hits))
        .with_state(mock)
}

/// A running mock backend
pub struct MockBackend {
    pub url: String,
    pub mock: Mock,
}

impl MockBackend {
    pub async fn start() -> Self {
        let mock = Mock::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let app = router(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self {
            url: format!("http://{addr}"),
            mock,
        }
    }

    /// Configuration pointing at this backend
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_url(&self.url)
    }

    /// Client state signed in as `who` (an email and token pair)
    pub async fn client(&self, who: (&str, &str)) -> AppState {
        self.client_with(self.config(), who).await
    }

    /// Like [`MockBackend::client`] with a custom configuration
    pub async fn client_with(&self, config: ClientConfig, who: (&str, &str)) -> AppState {
        let (email, token) = who;
        AppState::start(config, Arc::new(StaticIdentity::with_token(email, token)))
            .await
            .expect("client state")
    }

    /// Client state with nobody signed in
    pub async fn anonymous(&self) -> AppState {
        AppState::start(self.config(), Arc::new(StaticIdentity::default()))
        .await
        .expect("client state")
    }
}

/// A session owned by `tutor_email` with an open registration window
pub fn session(id: &str, status: SessionStatus, tutor_email: &str) -> Session {
    let now = chrono::Utc::now();
    serde_json::from_value(json!({
        "_id": id,
        "title": format!("Session {id}"),
        "description": "Weekly problem solving",
        "tutorName": "Rosalind",
        "tutorEmail": tutor_email,
        "registrationStart": (now - chrono::Duration::days(7)).to_rfc3339(),
        "registrationEnd": (now + chrono::Duration::days(7)).to_rfc3339(),
        "classStart": (now + chrono::Duration::days(10)).to_rfc3339(),
        "classEnd": (now + chrono::Duration::days(40)).to_rfc3339(),
        "duration": "2 hours",
        "registrationFee": 0,
        "status": status.as_str(),
    }))
    .expect("session fixture")
}
