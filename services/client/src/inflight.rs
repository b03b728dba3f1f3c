//! Per-control guard against double submission
//!
//! A control is "disabled" while a request it started is in flight. Starting
//! a second request under the same key fails with [`ClientError::Busy`]
//! instead of sending a duplicate.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::{ClientError, ClientResult};

/// Set of keys with a request in flight
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// Marks a key busy until dropped
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` busy, failing if it already is
    pub fn begin(&self, key: impl Into<String>) -> ClientResult<InFlightGuard> {
        let key = key.into();
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.clone()) {
            return Err(ClientError::Busy(key));
        }
        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
