//! Repositories for backend resources
//!
//! Reads go through the query cache under semantic keys. Writes are single
//! remote calls guarded against double submission; on success they
//! invalidate the cache tags they affect.

use crate::cache::QueryCache;
use crate::http::{PublicClient, SecureClient};
use crate::inflight::InFlight;

pub mod announcements;
pub mod bookings;
pub mod materials;
pub mod notes;
pub mod sessions;
pub mod users;

pub use announcements::AnnouncementRepository;
pub use bookings::{BookingGateway, BookingRepository};
pub use materials::MaterialRepository;
pub use notes::NoteRepository;
pub use sessions::SessionRepository;
pub use users::UserRepository;

/// Everything a repository needs to reach the backend
#[derive(Clone)]
pub struct Backend {
    pub public: PublicClient,
    pub secure: SecureClient,
    pub cache: QueryCache,
    pub inflight: InFlight,
}

impl Backend {
    pub fn new(public: PublicClient, secure: SecureClient, cache: QueryCache) -> Self {
        Self {
            public,
            secure,
            cache,
            inflight: InFlight::new(),
        }
    }
}
