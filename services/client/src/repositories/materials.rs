//! Study materials attached to approved sessions

use common::models::{Material, NewMaterial, Session, UpdateMaterial};
use common::validation::validate_material;
use common::workflow::{Actor, ensure_material_owner, ensure_material_upload};
use tracing::info;

use super::Backend;
use crate::cache::{QueryKey, tags};
use crate::error::{ClientResult, OperationExt};
use crate::http::MutationAck;

/// Materials repository
#[derive(Clone)]
pub struct MaterialRepository {
    backend: Backend,
}

impl MaterialRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Materials uploaded by `tutor_email`
    pub async fn by_tutor(&self, tutor_email: &str) -> ClientResult<Vec<Material>> {
        let secure = &self.backend.secure;
        let email = tutor_email.to_string();
        self.backend
            .cache
            .fetch(QueryKey::new(tags::MATERIALS).with(tutor_email), || async move {
                secure.get("/materials", &[("tutorEmail", email)]).await
            })
            .await
            .during("load materials")
    }

    /// Every material, for admins
    pub async fn all(&self) -> ClientResult<Vec<Material>> {
        let secure = &self.backend.secure;
        self.backend
            .cache
            .fetch(QueryKey::new(tags::MATERIALS).with("all"), || async move {
                secure.get("/materials", &[]).await
            })
            .await
            .during("load materials")
    }

    /// Attach a material to an approved session
    pub async fn create(
        &self,
        session: &Session,
        actor: &Actor,
        title: &str,
        resource_link: &str,
        image_url: Option<String>,
    ) -> ClientResult<MutationAck> {
        ensure_material_upload(session, actor).during("upload material")?;
        validate_material(title, resource_link).during("upload material")?;
        let _guard = self
            .backend
            .inflight
            .begin(format!("materials:{}", session.id))?;

        let payload = NewMaterial {
            title: title.to_string(),
            resource_link: resource_link.to_string(),
            image_url,
            tutor_email: actor.email.clone(),
            session_id: session.id.clone(),
        };
        let ack = self
            .backend
            .secure
            .post("/materials", &payload)
            .await
            .during("upload material")?;

        info!("Uploaded material {:?} for session {}", title, session.id);
        self.backend.cache.invalidate(&[tags::MATERIALS]).await;
        Ok(ack)
    }

    /// Replace the title and link of a material; values are sent verbatim
    pub async fn update(
        &self,
        material: &Material,
        actor: &Actor,
        update: &UpdateMaterial,
    ) -> ClientResult<MutationAck> {
        ensure_material_owner(material, actor, "edit").during("update material")?;
        validate_material(&update.title, &update.resource_link).during("update material")?;
        let _guard = self
            .backend
            .inflight
            .begin(format!("material:{}", material.id))?;

        let ack = self
            .backend
            .secure
            .put(&format!("/materials/{}", material.id), update)
            .await
            .during("update material")?;

        info!("Updated material {}", material.id);
        self.backend.cache.invalidate(&[tags::MATERIALS]).await;
        Ok(ack)
    }

    pub async fn delete(&self, material: &Material, actor: &Actor) -> ClientResult<MutationAck> {
        ensure_material_owner(material, actor, "delete").during("delete material")?;
        let _guard = self
            .backend
            .inflight
            .begin(format!("material:{}", material.id))?;

        let ack = self
            .backend
            .secure
            .delete(&format!("/materials/{}", material.id))
            .await
            .during("delete material")?;

        info!("Deleted material {}", material.id);
        self.backend.cache.invalidate(&[tags::MATERIALS]).await;
        Ok(ack)
    }
}
