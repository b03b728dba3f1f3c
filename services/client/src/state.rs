//! Application state shared by every screen and command

use common::access::RoleState;
use common::models::StudentPage;
use common::stats::{FeeBar, Slice, announcements_by_category, fee_chart, tutors_by_specialty};
use common::workflow::Actor;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::{AuthContext, AuthState, IdentityProvider};
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::{ApiClient, PublicClient, SecureClient};
use crate::navigation::Navigator;
use crate::repositories::{
    AnnouncementRepository, Backend, BookingRepository, MaterialRepository, NoteRepository,
    SessionRepository, UserRepository,
};
use crate::routes::{RouteOutcome, resolve};

/// Sessions shown on the statistics page
const STATISTICS_SESSIONS: u32 = 12;

/// Data behind the public statistics page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicStatistics {
    pub fees: Vec<FeeBar>,
    pub announcements: Vec<Slice>,
    pub specialties: Vec<Slice>,
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub auth: AuthContext,
    pub navigator: Navigator,
    pub cache: QueryCache,
    pub sessions: SessionRepository,
    pub materials: MaterialRepository,
    pub notes: NoteRepository,
    pub users: UserRepository,
    pub bookings: BookingRepository,
    pub announcements: AnnouncementRepository,
}

impl AppState {
    /// Wire the repositories without contacting the identity provider
    pub fn new(config: ClientConfig, identity: Arc<dyn IdentityProvider>) -> ClientResult<Self> {
        let api = ApiClient::new(&config)?;
        let auth = AuthContext::new(identity);
        let navigator = Navigator::new();
        let cache = QueryCache::new();

        let backend = Backend::new(
            PublicClient::new(api.clone()),
            SecureClient::new(api, auth.clone(), navigator.clone(), cache.clone()),
            cache.clone(),
        );

        Ok(Self {
            config,
            auth,
            navigator,
            cache,
            sessions: SessionRepository::new(backend.clone()),
            materials: MaterialRepository::new(backend.clone()),
            notes: NoteRepository::new(backend.clone()),
            users: UserRepository::new(backend.clone()),
            bookings: BookingRepository::new(backend.clone()),
            announcements: AnnouncementRepository::new(backend),
        })
    }

    /// Create the state and load the current user
    pub async fn start(
        config: ClientConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> ClientResult<Self> {
        let state = Self::new(config, identity)?;
        state.auth.refresh().await?;
        info!("Client ready against {}", state.config.api_url);
        Ok(state)
    }

    pub async fn role_state(&self) -> RoleState {
        match self.auth.state() {
            AuthState::Initializing => RoleState::Loading,
            AuthState::SignedOut => RoleState::SignedOut,
            AuthState::SignedIn(user) => self.users.role_state(Some(&user)).await,
        }
    }

    /// The signed-in user with their resolved role
    pub async fn actor(&self) -> ClientResult<Actor> {
        let user = self.auth.require_user()?;
        match self.role_state().await {
            RoleState::Resolved(role) => Ok(Actor::new(user.email, role)),
            _ => Err(ClientError::NotSignedIn),
        }
    }

    /// Navigate to `path`, following whatever the route's gates decide
    pub async fn visit(&self, path: &str) -> RouteOutcome {
        let outcome = resolve(path, self.role_state().await);
        match &outcome {
            RouteOutcome::Redirect { to, from } => self.navigator.navigate(to, Some(from.clone())),
            RouteOutcome::Render(_) => self.navigator.navigate(path, None),
            RouteOutcome::Loading => {}
        }
        outcome
    }

    /// One page of the admin student listing, sized by `students_page_size`
    pub async fn students_page(&self, page: u32) -> ClientResult<StudentPage> {
        self.users
            .students(page, self.config.students_page_size)
            .await
    }

    pub async fn public_statistics(&self) -> ClientResult<PublicStatistics> {
        let (page, announcements, tutors) = tokio::try_join!(
            self.sessions.public_page(1, STATISTICS_SESSIONS),
            self.announcements.list(),
            self.users.tutors(),
        )?;

        Ok(PublicStatistics {
            fees: fee_chart(&page.sessions),
            announcements: announcements_by_category(&announcements),
            specialties: tutors_by_specialty(&tutors),
        })
    }

    /// Sign out and forget everything cached for the user
    pub async fn sign_out(&self) -> ClientResult<()> {
        let result = self.auth.sign_out().await;
        self.cache.clear().await;
        self.navigator.navigate("/", None);
        result
    }

    pub async fn shutdown(&self) {
        self.cache.clear().await;
        self.auth.shutdown();
        info!("Client shut down");
    }
}
