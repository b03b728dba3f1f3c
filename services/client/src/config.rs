//! Client configuration
//!
//! Settings are layered with the `config` crate: built-in defaults first,
//! then environment variables prefixed with `EDU_SYNC_`.

use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::error::ClientResult;

/// Default backend used during local development
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend (`EDU_SYNC_API_URL`)
    pub api_url: String,
    /// Optional per-request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Bearer token for the command-line identity (`EDU_SYNC_ACCESS_TOKEN`)
    #[serde(default)]
    pub access_token: Option<String>,
    /// Email of the command-line identity (`EDU_SYNC_EMAIL`)
    #[serde(default)]
    pub email: Option<String>,
    /// Rows per page of the admin student listing
    pub students_page_size: u32,
}

impl ClientConfig {
    /// Create a new ClientConfig from defaults and environment variables
    ///
    /// # Environment Variables
    /// - `EDU_SYNC_API_URL`: backend base URL (default: "http://localhost:5000")
    /// - `EDU_SYNC_REQUEST_TIMEOUT_SECS`: request timeout (default: none)
    /// - `EDU_SYNC_ACCESS_TOKEN`: bearer token for authenticated commands
    /// - `EDU_SYNC_EMAIL`: email the token belongs to
    /// - `EDU_SYNC_STUDENTS_PAGE_SIZE`: students per page (default: 5)
    pub fn from_env() -> ClientResult<Self> {
        let settings = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("students_page_size", 5)?
            .add_source(Environment::with_prefix("EDU_SYNC"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Configuration pointing at `api_url` with every other setting defaulted
    pub fn for_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            request_timeout_secs: None,
            access_token: None,
            email: None,
            students_page_size: 5,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
