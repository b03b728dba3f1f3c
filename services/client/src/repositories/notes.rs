//! Student notes

use chrono::Utc;
use common::models::{NewNote, Note, UpdateNote};
use common::validation::validate_note;
use common::workflow::{Actor, ensure_note_owner};
use tracing::info;

use super::Backend;
use crate::cache::{QueryKey, tags};
use crate::error::{ClientResult, OperationExt};
use crate::http::MutationAck;

/// Notes repository
#[derive(Clone)]
pub struct NoteRepository {
    backend: Backend,
}

impl NoteRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Notes written by `email`
    pub async fn list(&self, email: &str) -> ClientResult<Vec<Note>> {
        let secure = &self.backend.secure;
        let owner = email.to_string();
        self.backend
            .cache
            .fetch(QueryKey::new(tags::NOTES).with(email), || async move {
                secure.get("/notes", &[("email", owner)]).await
            })
            .await
            .during("load notes")
    }

    pub async fn create(
        &self,
        actor: &Actor,
        title: &str,
        description: &str,
    ) -> ClientResult<MutationAck> {
        validate_note(title, description).during("create note")?;
        let _guard = self.backend.inflight.begin("note:create")?;

        let payload = NewNote {
            email: actor.email.clone(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            created_at: Utc::now(),
        };
        let ack = self
            .backend
            .secure
            .post("/notes", &payload)
            .await
            .during("create note")?;

        info!("Created note {:?} for {}", payload.title, actor.email);
        self.backend.cache.invalidate(&[tags::NOTES]).await;
        Ok(ack)
    }

    pub async fn update(
        &self,
        note: &Note,
        actor: &Actor,
        update: &UpdateNote,
    ) -> ClientResult<MutationAck> {
        ensure_note_owner(note, actor, "edit").during("update note")?;
        validate_note(&update.title, &update.description).during("update note")?;
        let _guard = self.backend.inflight.begin(format!("note:{}", note.id))?;

        let ack = self
            .backend
            .secure
            .patch(&format!("/notes/{}", note.id), update)
            .await
            .during("update note")?;

        self.backend.cache.invalidate(&[tags::NOTES]).await;
        Ok(ack)
    }

    pub async fn delete(&self, note: &Note, actor: &Actor) -> ClientResult<MutationAck> {
        ensure_note_owner(note, actor, "delete").during("delete note")?;
        let _guard = self.backend.inflight.begin(format!("note:{}", note.id))?;

        let ack = self
            .backend
            .secure
            .delete(&format!("/notes/{}", note.id))
            .await
            .during("delete note")?;

        info!("Deleted note {}", note.id);
        self.backend.cache.invalidate(&[tags::NOTES]).await;
        Ok(ack)
    }
}
