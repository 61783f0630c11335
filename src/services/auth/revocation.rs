use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use crate::services::cache::{CacheClient, CacheError};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Blocklist of revoked token ids.
///
/// - `revoke`: record `jti` for `ttl`; revoking twice is a no-op
/// - `is_revoked`: presence check
/// - `Err(_)`: backend failure, never a statement about the token itself
pub trait RevocationStore: Send + Sync {
    fn revoke<'a>(&'a self, jti: &'a str, ttl: Duration) -> BoxFuture<'a, Result<(), CacheError>>;

    fn is_revoked<'a>(&'a self, jti: &'a str) -> BoxFuture<'a, Result<bool, CacheError>>;
}

/// Revocation store on top of any `CacheClient` (Valkey in production,
/// `MemoryCache` in tests).
#[derive(Clone, Debug)]
pub struct CacheRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions with other cache users.
    prefix: String,
}

impl<C: CacheClient> CacheRevocationStore<C> {
    pub fn new(cache: Arc<C>) -> Self {
        Self::new_with_prefix(cache, "jti:blocklist")
    }

    pub fn new_with_prefix(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, jti: &str) -> String {
        format!("{}:{}", self.prefix, jti)
    }
}

impl<C: CacheClient> RevocationStore for CacheRevocationStore<C> {
    fn revoke<'a>(&'a self, jti: &'a str, ttl: Duration) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move {
            // SET <key> "" EX <ttl>: plain overwrite, so a second revoke only
            // refreshes the expiry. Backends clamp `ttl` to whole seconds.
            self.cache.set_with_ttl(&self.key(jti), "", ttl).await
        })
    }

    fn is_revoked<'a>(&'a self, jti: &'a str) -> BoxFuture<'a, Result<bool, CacheError>> {
        Box::pin(async move { self.cache.exists(&self.key(jti)).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryCache;

    #[tokio::test]
    async fn revoke_marks_only_that_jti() {
        let store = CacheRevocationStore::new(Arc::new(MemoryCache::new()));
        store.revoke("a", Duration::from_secs(60)).await.unwrap();

        assert!(store.is_revoked("a").await.unwrap());
        assert!(!store.is_revoked("b").await.unwrap());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let store = CacheRevocationStore::new(Arc::new(MemoryCache::new()));
        store.revoke("a", Duration::from_secs(60)).await.unwrap();
        store.revoke("a", Duration::from_secs(60)).await.unwrap();

        assert!(store.is_revoked("a").await.unwrap());
    }

    #[tokio::test]
    async fn keys_are_prefixed() {
        let cache = Arc::new(MemoryCache::new());
        let store = CacheRevocationStore::new_with_prefix(cache.clone(), "test");
        store.revoke("x", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.key("x"), "test:x");
        assert!(cache.exists("test:x").await.unwrap());
        assert!(!cache.exists("x").await.unwrap());
    }
}
