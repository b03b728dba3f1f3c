//! Current location and programmatic navigation

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Where the user is, plus the path a redirect interrupted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// Path the user attempted before being redirected here
    pub from: Option<String>,
}

impl Location {
    fn root() -> Self {
        Self {
            path: "/".to_string(),
            from: None,
        }
    }
}

/// Shared handle on the current location
#[derive(Debug, Clone)]
pub struct Navigator {
    location: Arc<watch::Sender<Location>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Location::root());
        Self {
            location: Arc::new(tx),
        }
    }

    /// Move to `path`, remembering where the user came from
    pub fn navigate(&self, path: &str, from: Option<String>) {
        debug!("Navigating to {} (from {:?})", path, from);
        self.location.send_replace(Location {
            path: path.to_string(),
            from,
        });
    }

    /// Redirect to `path`, carrying the current path as the attempted one
    pub fn redirect(&self, path: &str) {
        let from = self.current().path;
        self.navigate(path, Some(from));
    }

    pub fn current(&self) -> Location {
        self.location.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }
}
