//! Public announcements

use common::models::Announcement;

use super::Backend;
use crate::cache::{QueryKey, tags};
use crate::error::{ClientResult, OperationExt};

#[derive(Clone)]
pub struct AnnouncementRepository {
    backend: Backend,
}

impl AnnouncementRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn list(&self) -> ClientResult<Vec<Announcement>> {
        let public = &self.backend.public;
        self.backend
            .cache
            .fetch(QueryKey::new(tags::ANNOUNCEMENTS), || async move {
                public.get("/announcements", &[]).await
            })
            .await
            .during("load announcements")
    }
}
