/// Factory: build the `TokenAuthority` (and its revocation store) from `Config`.
use std::sync::Arc;

use tracing::info;

use crate::config::{CacheBackend, Config};
use crate::error::AppError;
use crate::services::auth::{
    authority::TokenAuthority,
    revocation::{CacheRevocationStore, RevocationStore},
};
use crate::services::cache::{CacheClient, MemoryCache, ValkeyClient};

pub async fn build_revocation_store(config: &Config) -> Result<Arc<dyn RevocationStore>, AppError> {
    let store: Arc<dyn RevocationStore> = match config.cache_backend {
        CacheBackend::Valkey => {
            let client = ValkeyClient::new(&config.redis_url).await?;
            info!(backend = client.backend_name(), "revocation store ready");
            Arc::new(CacheRevocationStore::new(Arc::new(client)))
        }
        CacheBackend::Memory => {
            let client = MemoryCache::new();
            info!(backend = client.backend_name(), "revocation store ready (process-local)");
            Arc::new(CacheRevocationStore::new(Arc::new(client)))
        }
    };

    Ok(store)
}

pub async fn build_token_authority(config: &Config) -> Result<Arc<TokenAuthority>, AppError> {
    let revocations = build_revocation_store(config).await?;
    let authority = TokenAuthority::new(&config.auth_config(), revocations)?;
    info!(
        access_ttl_secs = authority.access_ttl().as_secs(),
        refresh_ttl_secs = authority.refresh_ttl().as_secs(),
        revocation_ttl_secs = authority.revocation_ttl().as_secs(),
        "token authority ready"
    );

    Ok(Arc::new(authority))
}
