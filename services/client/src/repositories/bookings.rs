//! Student bookings
//!
//! Bookings are read from the backend. Creating one belongs to the payment
//! flow, which is reached through [`BookingGateway`].

use async_trait::async_trait;
use chrono::Utc;
use common::models::{Booking, Session};
use common::workflow::Actor;
use std::sync::Arc;
use tracing::info;

use super::Backend;
use crate::cache::{QueryKey, tags};
use crate::error::{ClientError, ClientResult, OperationExt};

/// External collaborator that records a booking once it is paid for
#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Book `session_id` for `student_email`, charging `amount`
    async fn create_booking(
        &self,
        student_email: &str,
        session_id: &str,
        amount: f64,
    ) -> ClientResult<Booking>;
}

/// Bookings repository
#[derive(Clone)]
pub struct BookingRepository {
    backend: Backend,
    gateway: Option<Arc<dyn BookingGateway>>,
}

impl BookingRepository {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            gateway: None,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn BookingGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Sessions booked by `student_email`
    pub async fn by_student(&self, student_email: &str) -> ClientResult<Vec<Booking>> {
        let secure = &self.backend.secure;
        let path = secure.path(&["bookedSessions", "student", student_email]);
        self.backend
            .cache
            .fetch(QueryKey::new(tags::BOOKINGS).with(student_email), || async move {
                secure.get(&path, &[]).await
            })
            .await
            .during("load bookings")
    }

    /// Book `session` while its registration window is open
    pub async fn book(&self, session: &Session, actor: &Actor) -> ClientResult<Booking> {
        if !session.registration_status(Utc::now()).is_open() {
            return Err(ClientError::RegistrationClosed(session.id.clone()));
        }
        let gateway = self.gateway.as_ref().ok_or(ClientError::NoBookingGateway)?;
        let _guard = self.backend.inflight.begin(format!("booking:{}", session.id))?;

        let booking = gateway
            .create_booking(&actor.email, &session.id, session.registration_fee)
            .await
            .during("book session")?;

        info!("{} booked session {}", actor.email, session.id);
        self.backend.cache.invalidate(&[tags::BOOKINGS]).await;
        Ok(booking)
    }
}
