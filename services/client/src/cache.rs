//! Query cache with tag invalidation
//!
//! Every read goes through [`QueryCache::fetch`] under a semantic key such as
//! `["sessions", "tutor@edu.io"]`. The first segment of a key is its tag.
//! Mutations never patch cached values; they invalidate the tags they touch
//! and the next read refetches from the backend.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ClientResult;

/// Tags used by the repositories
pub mod tags {
    pub const AVAILABLE_SESSIONS: &str = "available-sessions";
    pub const PUBLIC_SESSIONS: &str = "public-sessions";
    pub const SESSION_DETAILS: &str = "session-details";
    pub const SESSIONS: &str = "sessions";
    pub const APPROVED_SESSIONS: &str = "approved-sessions";
    pub const MATERIALS: &str = "materials";
    pub const NOTES: &str = "notes";
    pub const USERS: &str = "users";
    pub const USER_ROLE: &str = "user-role";
    pub const TUTORS: &str = "tutors";
    pub const STUDENTS: &str = "all-students";
    pub const BOOKINGS: &str = "student-bookings";
    pub const ANNOUNCEMENTS: &str = "announcements";

    /// Everything a session mutation can change
    pub const SESSION_LISTS: &[&str] = &[
        SESSIONS,
        APPROVED_SESSIONS,
        AVAILABLE_SESSIONS,
        PUBLIC_SESSIONS,
        SESSION_DETAILS,
    ];
}

/// Semantic cache key; the first segment is the tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(tag: &str) -> Self {
        Self(vec![tag.to_string()])
    }

    pub fn with(mut self, part: impl ToString) -> Self {
        self.0.push(part.to_string());
        self
    }

    pub fn tag(&self) -> &str {
        &self.0[0]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    stored_at: Instant,
}

/// Shared query cache
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, Entry>>>,
    /// Entries older than this are refetched; `None` keeps them until invalidated
    stale_after: Option<Duration>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose entries also expire after `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::default(),
            stale_after: Some(ttl),
        }
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        self.stale_after
            .map(|ttl| entry.stored_at.elapsed() < ttl)
            .unwrap_or(true)
    }

    /// Cached value for `key`, if present and fresh
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key).filter(|entry| self.is_fresh(entry))?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a value under `key`
    pub async fn set<T: Serialize>(&self, key: QueryKey, value: &T) -> ClientResult<()> {
        let value = serde_json::to_value(value)?;
        self.entries.write().await.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Return the cached value for `key` or run `fetch` and cache its result
    ///
    /// Failed fetches are not cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(value);
        }

        debug!("Cache miss for {}", key);
        let value = fetch().await?;
        self.set(key, &value).await?;
        Ok(value)
    }

    /// Drop every entry whose tag is in `tags`; returns how many were dropped
    pub async fn invalidate(&self, tags: &[&str]) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !tags.contains(&key.tag()));
        let dropped = before - entries.len();
        debug!("Invalidated {} cached queries for tags {:?}", dropped, tags);
        dropped
    }

    /// Drop a single entry
    pub async fn invalidate_key(&self, key: &QueryKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop everything, e.g. when the user signs out
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_fetch_hits_cache_until_invalidated() -> ClientResult<()> {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let key = QueryKey::new(tags::SESSIONS).with("tutor@edu.io");

        for _ in 0..2 {
            let value: Vec<u32> = cache
                .fetch(key.clone(), move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await?;
            assert_eq!(value, vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.invalidate(&[tags::SESSIONS]).await, 1);
        let _: Vec<u32> = cache
            .fetch(key, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(vec![4])
            })
            .await?;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalidate_touches_only_named_tags() -> ClientResult<()> {
        let cache = QueryCache::new();
        cache
            .set(QueryKey::new(tags::NOTES).with("s@edu.io"), &vec!["n1"])
            .await?;
        cache
            .set(QueryKey::new(tags::MATERIALS).with("t@edu.io"), &vec!["m1"])
            .await?;

        assert_eq!(cache.invalidate(&[tags::MATERIALS]).await, 1);
        assert_eq!(cache.len().await, 1);
        let notes: Option<Vec<String>> =
            cache.get(&QueryKey::new(tags::NOTES).with("s@edu.io")).await;
        assert_eq!(notes, Some(vec!["n1".to_string()]));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = QueryCache::new();
        let key = QueryKey::new(tags::TUTORS);
        let result: ClientResult<Vec<String>> = cache
            .fetch(key.clone(), || async { Err(crate::error::ClientError::NotFound) })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() -> ClientResult<()> {
        let cache = QueryCache::with_ttl(Duration::from_millis(0));
        let key = QueryKey::new(tags::ANNOUNCEMENTS);
        cache.set(key.clone(), &1u8).await?;
        assert_eq!(cache.get::<u8>(&key).await, None);
        Ok(())
    }
}
