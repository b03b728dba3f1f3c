//! Users, tutors and students

use common::access::RoleState;
use common::error::WorkflowError;
use common::models::{Role, StudentPage, UpdateRole, User};
use common::workflow::Actor;
use tracing::{info, warn};

use super::Backend;
use crate::auth::AuthUser;
use crate::cache::{QueryKey, tags};
use crate::error::{ClientResult, OperationExt};
use crate::http::MutationAck;

/// Users repository
#[derive(Clone)]
pub struct UserRepository {
    backend: Backend,
}

impl UserRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Every user, optionally narrowed by a name or email search
    pub async fn list(&self, search: Option<&str>) -> ClientResult<Vec<User>> {
        let search = search.map(str::trim).filter(|term| !term.is_empty());
        let query: Vec<(&str, String)> = search
            .map(|term| vec![("search", term.to_string())])
            .unwrap_or_default();

        let secure = &self.backend.secure;
        let key = QueryKey::new(tags::USERS).with(search.unwrap_or_default());
        self.backend
            .cache
            .fetch(key, || async move { secure.get("/users", &query).await })
            .await
            .during("load users")
    }

    /// Role stored by the backend for `email`
    pub async fn role_of(&self, email: &str) -> ClientResult<Role> {
        let secure = &self.backend.secure;
        let path = secure.path(&["users", email, "role"]);
        let found: UpdateRole = self
            .backend
            .cache
            .fetch(QueryKey::new(tags::USER_ROLE).with(email), || async move {
                secure.get(&path, &[]).await
            })
            .await
            .during("load user role")?;
        Ok(found.role)
    }

    /// Role state for the signed-in user
    ///
    /// A failed lookup resolves to the least privileged role, unless the
    /// backend rejected the token and the user was signed out.
    pub async fn role_state(&self, user: Option<&AuthUser>) -> RoleState {
        let Some(user) = user else {
            return RoleState::SignedOut;
        };

        match self.role_of(&user.email).await {
            Ok(role) => RoleState::Resolved(role),
            Err(e) if e.is_auth_failure() => {
                warn!("Role lookup for {} ended the session: {}", user.email, e);
                RoleState::SignedOut
            }
            Err(e) => {
                warn!("Role lookup for {} failed, treating as student: {}", user.email, e);
                RoleState::Resolved(Role::Student)
            }
        }
    }

    /// Change another user's role; admins only
    pub async fn update_role(
        &self,
        actor: &Actor,
        email: &str,
        role: Role,
    ) -> ClientResult<MutationAck> {
        if actor.role != Role::Admin {
            return Err(WorkflowError::NotPermitted {
                email: actor.email.clone(),
                role: actor.role,
                action: "change roles",
            })
            .during("update role");
        }
        let _guard = self.backend.inflight.begin(format!("user:{email}"))?;

        let ack = self
            .backend
            .secure
            .patch(
                &self.backend.secure.path(&["users", email, "role"]),
                &UpdateRole { role },
            )
            .await
            .during("update role")?;

        info!("{} set the role of {} to {}", actor.email, email, role);
        self.backend
            .cache
            .invalidate(&[tags::USERS, tags::USER_ROLE, tags::TUTORS, tags::STUDENTS])
            .await;
        Ok(ack)
    }

    /// Public tutor directory
    pub async fn tutors(&self) -> ClientResult<Vec<User>> {
        let public = &self.backend.public;
        self.backend
            .cache
            .fetch(QueryKey::new(tags::TUTORS), || async move {
                public.get("/tutors", &[]).await
            })
            .await
            .during("load tutors")
    }

    /// One page of students; pages start at 1
    pub async fn students(&self, page: u32, limit: u32) -> ClientResult<StudentPage> {
        let page = page.max(1);
        let secure = &self.backend.secure;
        let key = QueryKey::new(tags::STUDENTS).with(page).with(limit);
        self.backend
            .cache
            .fetch(key, || async move {
                secure
                    .get(
                        "/students",
                        &[("page", page.to_string()), ("limit", limit.to_string())],
                    )
                    .await
            })
            .await
            .during("load students")
    }
}
