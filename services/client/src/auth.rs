//! Authentication context
//!
//! The identity provider is an external collaborator reached through the
//! [`IdentityProvider`] trait. [`AuthContext`] is the explicit object that
//! carries the signed-in user through the application: it is started once,
//! updated on sign-in and sign-out, and shut down when the application stops.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::validation::{SignUpForm, validate_sign_up};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

/// Sign-in timestamps kept by the identity provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub creation_time: Option<DateTime<Utc>>,
    pub last_sign_in_time: Option<DateTime<Utc>>,
}

/// The identity provider's view of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub email_verified: bool,
    pub access_token: String,
    #[serde(default)]
    pub metadata: UserMetadata,
}

impl AuthUser {
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// External identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The user the provider currently considers signed in
    async fn current_user(&self) -> ClientResult<Option<AuthUser>>;

    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthUser>;

    async fn sign_up(&self, email: &str, password: &str) -> ClientResult<AuthUser>;

    async fn sign_out(&self) -> ClientResult<()>;
}

/// Authentication state observed by the rest of the client
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// The provider has not reported yet
    #[default]
    Initializing,
    SignedOut,
    SignedIn(AuthUser),
}

/// Explicit holder of the current user
#[derive(Clone)]
pub struct AuthContext {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthContext {
    /// Context that has not asked the provider anything yet
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (tx, _rx) = watch::channel(AuthState::Initializing);
        Self {
            provider,
            state: Arc::new(tx),
        }
    }

    /// Create the context and load the provider's current user
    pub async fn start(provider: Arc<dyn IdentityProvider>) -> ClientResult<Self> {
        let context = Self::new(provider);
        context.refresh().await?;
        Ok(context)
    }

    /// Re-read the current user from the provider
    pub async fn refresh(&self) -> ClientResult<()> {
        let user = self.provider.current_user().await?;
        self.set_user(user);
        Ok(())
    }

    fn set_user(&self, user: Option<AuthUser>) {
        let state = match user {
            Some(user) => {
                info!("Signed in as {}", user.email);
                AuthState::SignedIn(user)
            }
            None => AuthState::SignedOut,
        };
        self.state.send_replace(state);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthUser> {
        let user = self.provider.sign_in(email, password).await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Validate the sign-up form locally, then create the account
    pub async fn sign_up(&self, form: &SignUpForm) -> ClientResult<AuthUser> {
        validate_sign_up(form)?;
        let user = self.provider.sign_up(&form.email, &form.password).await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Sign out at the provider; the local state is cleared even if that fails
    pub async fn sign_out(&self) -> ClientResult<()> {
        let result = self.provider.sign_out().await;
        if let Err(e) = &result {
            warn!("Identity provider failed to sign out: {}", e);
        }
        self.set_user(None);
        result
    }

    /// Stop tracking the user without touching the provider
    pub fn shutdown(&self) {
        self.state.send_replace(AuthState::Initializing);
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        match &*self.state.borrow() {
            AuthState::SignedIn(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        match &*self.state.borrow() {
            AuthState::SignedIn(user) => Some(user.access_token.clone()),
            _ => None,
        }
    }

    /// Signed-in user or [`ClientError::NotSignedIn`]
    pub fn require_user(&self) -> ClientResult<AuthUser> {
        self.current_user().ok_or(ClientError::NotSignedIn)
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

/// Identity backed by a fixed bearer token, for the command line and tests
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user: Mutex<Option<AuthUser>>,
}

impl StaticIdentity {
    pub fn new(user: Option<AuthUser>) -> Self {
        Self {
            user: Mutex::new(user),
        }
    }

    /// Identity for `email` holding `token`
    pub fn with_token(email: impl Into<String>, token: impl Into<String>) -> Self {
        let email = email.into();
        Self::new(Some(AuthUser {
            uid: email.clone(),
            email,
            display_name: None,
            photo_url: None,
            email_verified: true,
            access_token: token.into(),
            metadata: UserMetadata::default(),
        }))
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> ClientResult<Option<AuthUser>> {
        Ok(self.user.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> ClientResult<AuthUser> {
        Err(ClientError::Identity(
            "interactive sign-in is not supported by a static identity".to_string(),
        ))
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> ClientResult<AuthUser> {
        Err(ClientError::Identity(
            "sign-up is not supported by a static identity".to_string(),
        ))
    }

    async fn sign_out(&self) -> ClientResult<()> {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
