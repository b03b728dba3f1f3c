//! Study session reads and the moderation workflow

use chrono::Utc;
use common::models::{
    ApprovalTerms, NewSession, PublicSessionPage, Rejection, Session, SessionForm, SessionStatus,
    UpdateSession,
};
use common::validation::validate_session_form;
use common::workflow::{Actor, PlannedTransition, RemoteCall, SessionAction, plan};
use tracing::info;

use super::Backend;
use crate::cache::{QueryKey, tags};
use crate::error::{ClientResult, OperationExt};
use crate::http::MutationAck;

/// How many sessions the details page recommends
pub const RECOMMENDATIONS: usize = 3;

/// Sessions repository
#[derive(Clone)]
pub struct SessionRepository {
    backend: Backend,
}

impl SessionRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Approved sessions open to the public
    pub async fn available(&self) -> ClientResult<Vec<Session>> {
        let public = &self.backend.public;
        self.backend
            .cache
            .fetch(QueryKey::new(tags::AVAILABLE_SESSIONS), || async move {
                public.get("/available-sessions", &[]).await
            })
            .await
            .during("load available sessions")
    }

    /// Up to three other available sessions
    pub async fn recommended(&self, current_id: &str) -> ClientResult<Vec<Session>> {
        let sessions = self.available().await?;
        Ok(sessions
            .into_iter()
            .filter(|session| session.id != current_id)
            .take(RECOMMENDATIONS)
            .collect())
    }

    pub async fn public_page(&self, page: u32, limit: u32) -> ClientResult<PublicSessionPage> {
        let public = &self.backend.public;
        let key = QueryKey::new(tags::PUBLIC_SESSIONS).with(page).with(limit);
        self.backend
            .cache
            .fetch(key, || async move {
                public
                    .get(
                        "/public-sessions",
                        &[("page", page.to_string()), ("limit", limit.to_string())],
                    )
                    .await
            })
            .await
            .during("load sessions")
    }

    pub async fn details(&self, id: &str) -> ClientResult<Session> {
        let public = &self.backend.public;
        let path = format!("/sessions/{id}");
        self.backend
            .cache
            .fetch(QueryKey::new(tags::SESSION_DETAILS).with(id), || async move {
                public.get(&path, &[]).await
            })
            .await
            .during("load session details")
    }

    /// Sessions created by `tutor_email`
    pub async fn by_tutor(&self, tutor_email: &str) -> ClientResult<Vec<Session>> {
        let secure = &self.backend.secure;
        let email = tutor_email.to_string();
        self.backend
            .cache
            .fetch(QueryKey::new(tags::SESSIONS).with(tutor_email), || async move {
                secure.get("/sessions", &[("email", email)]).await
            })
            .await
            .during("load your sessions")
    }

    /// Every session, for moderation
    pub async fn all(&self) -> ClientResult<Vec<Session>> {
        let secure = &self.backend.secure;
        self.backend
            .cache
            .fetch(QueryKey::new(tags::SESSIONS).with("all"), || async move {
                secure.get("/sessions", &[]).await
            })
            .await
            .during("load sessions")
    }

    /// The tutor's approved sessions, the only ones that accept materials
    pub async fn approved_by_tutor(&self, tutor_email: &str) -> ClientResult<Vec<Session>> {
        let key = QueryKey::new(tags::APPROVED_SESSIONS).with(tutor_email);
        self.backend
            .cache
            .fetch(key, move || async move {
                let sessions = self.by_tutor(tutor_email).await?;
                Ok(filter_by_status(&sessions, SessionStatus::Approved))
            })
            .await
    }

    /// Create a pending session from a tutor's form
    pub async fn create(
        &self,
        actor: &Actor,
        tutor_name: &str,
        form: SessionForm,
    ) -> ClientResult<MutationAck> {
        validate_session_form(&form).during("create session")?;
        let _guard = self.backend.inflight.begin("session:create")?;

        let payload = NewSession::pending(form, tutor_name, &actor.email, Utc::now());
        let ack = self
            .backend
            .secure
            .post("/sessions", &payload)
            .await
            .during("create session")?;

        info!("Created session {:?} for {}", payload.title, actor.email);
        self.backend.cache.invalidate(tags::SESSION_LISTS).await;
        Ok(ack)
    }

    /// Edit the schedule or description of a session
    pub async fn update(&self, id: &str, update: &UpdateSession) -> ClientResult<MutationAck> {
        let _guard = self.backend.inflight.begin(format!("session:{id}"))?;
        let ack = self
            .backend
            .secure
            .put(&format!("/sessions/{id}"), update)
            .await
            .during("update session")?;

        self.backend.cache.invalidate(tags::SESSION_LISTS).await;
        Ok(ack)
    }

    /// Check `action` locally, then send the one call that performs it
    ///
    /// The session's control stays busy until the call returns.
    pub async fn perform(
        &self,
        session: &Session,
        actor: &Actor,
        action: SessionAction,
    ) -> ClientResult<PlannedTransition> {
        let operation = operation_name(&action);
        let transition = plan(session, actor, action).during(operation)?;
        let _guard = self.backend.inflight.begin(format!("session:{}", session.id))?;

        let secure = &self.backend.secure;
        let id = &transition.session_id;
        let result = match &transition.call {
            RemoteCall::SetStatus(update) => {
                secure.patch(&format!("/sessions/{id}/status"), update).await
            }
            RemoteCall::Resubmit => secure.patch_empty(&format!("/sessions/{id}/resubmit")).await,
            RemoteCall::Delete => secure.delete(&format!("/sessions/{id}")).await,
        };
        result.during(operation)?;

        match transition.to {
            Some(to) => info!("Session {} moved from {} to {}", id, transition.from, to),
            None => info!("Session {} deleted by {}", id, actor.email),
        }
        self.backend.cache.invalidate(tags::SESSION_LISTS).await;
        Ok(transition)
    }

    pub async fn approve(
        &self,
        session: &Session,
        actor: &Actor,
        terms: ApprovalTerms,
    ) -> ClientResult<PlannedTransition> {
        self.perform(session, actor, SessionAction::Approve(terms)).await
    }

    pub async fn reject(
        &self,
        session: &Session,
        actor: &Actor,
        rejection: Rejection,
    ) -> ClientResult<PlannedTransition> {
        self.perform(session, actor, SessionAction::Reject(rejection)).await
    }

    pub async fn resubmit(
        &self,
        session: &Session,
        actor: &Actor,
    ) -> ClientResult<PlannedTransition> {
        self.perform(session, actor, SessionAction::Resubmit).await
    }

    pub async fn delete(
        &self,
        session: &Session,
        actor: &Actor,
    ) -> ClientResult<PlannedTransition> {
        self.perform(session, actor, SessionAction::Delete).await
    }

    /// Whether the session's moderation control is waiting on a request
    pub fn is_busy(&self, session_id: &str) -> bool {
        self.backend.inflight.is_busy(&format!("session:{session_id}"))
    }
}

fn operation_name(action: &SessionAction) -> &'static str {
    match action {
        SessionAction::Approve(_) => "approve session",
        SessionAction::Reject(_) => "reject session",
        SessionAction::Resubmit => "resubmit session",
        SessionAction::Delete => "delete session",
    }
}

/// Sessions in `status`, in their original order
pub fn filter_by_status(sessions: &[Session], status: SessionStatus) -> Vec<Session> {
    sessions
        .iter()
        .filter(|session| session.status == status)
        .cloned()
        .collect()
}
