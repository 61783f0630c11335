//! In-process cache with per-key expiry.
//!
//! Used by tests and by `CACHE_BACKEND=memory` for local runs without Valkey.
//! Entries are not shared across processes. Only presence is tracked; values
//! are not kept. Expired entries are swept on every write.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    // key -> expiry instant
    entries: Arc<Mutex<HashMap<String, Instant>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, HashMap<String, Instant>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::BackendCommand("memory cache lock poisoned".into()))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn set_with_ttl(&self, key: &str, _value: &str, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl.max(Duration::from_secs(1)))
            .ok_or_else(|| CacheError::BackendCommand(format!("ttl out of range: {ttl:?}")))?;

        let mut entries = self.lock()?;
        entries.retain(|_, expires| *expires > now);
        entries.insert(key.to_string(), expires_at);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(expires) if *expires > Instant::now() => Ok(true),
            Some(_) => {
                entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_key_is_visible_until_it_expires() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(cache.exists("k").await.unwrap());
        assert!(!cache.exists("other").await.unwrap());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = MemoryCache::new();
        let clone = cache.clone();
        clone
            .set_with_ttl("shared", "1", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.exists("shared").await.unwrap());
    }

    #[tokio::test]
    async fn writes_sweep_expired_entries() {
        let cache = MemoryCache::new();
        for i in 0..1000 {
            cache
                .set_with_ttl(&format!("old:{i}"), "", Duration::from_secs(1))
                .await
                .unwrap();
        }
        cache
            .set_with_ttl("kept", "", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1001);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        cache
            .set_with_ttl("fresh", "", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.exists("kept").await.unwrap());
        assert!(cache.exists("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn huge_ttl_is_an_error_not_a_panic() {
        let cache = MemoryCache::new();
        let err = cache
            .set_with_ttl("k", "", Duration::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::BackendCommand(_)));
        assert!(!cache.exists("k").await.unwrap());
    }
}
