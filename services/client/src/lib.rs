//! Edu Sync client
//!
//! Talks to the study-session marketplace backend on behalf of a signed-in
//! user: cached reads, gated navigation and the session moderation workflow.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod image;
pub mod inflight;
pub mod navigation;
pub mod repositories;
pub mod routes;
pub mod state;

pub use error::{ClientError, ClientResult};
pub use state::AppState;
