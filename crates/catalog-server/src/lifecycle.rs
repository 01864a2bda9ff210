//! Startup and shutdown sequencing
//!
//! Startup opens the cache, then storage (behind a readiness probe), then makes
//! sure the items table exists. Shutdown closes the cache, then storage, and
//! skips whichever never opened.

use crate::config::{CacheBackend, ServerConfig};
use crate::services::ItemService;
use crate::storage::{self, MemoryCache, RedisCache};
use anyhow::{Context, Result};
use catalog_core::{CacheStore, ItemStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on a single readiness backoff step
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }

    /// Run `operation` until it succeeds or the attempts are used up; the last
    /// error is returned.
    pub async fn execute<F, Fut, T, E>(&self, what: &str, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what,
                        attempt + 1,
                        self.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[derive(Default)]
pub struct Lifecycle {
    store: Option<Arc<dyn ItemStore>>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&mut self, config: &ServerConfig) -> Result<ItemService> {
        let cache = connect_cache(config)
            .await
            .context("Failed to connect to cache")?;
        self.cache = Some(cache.clone());

        let store = wait_for_storage(config).await?;
        self.store = Some(store.clone());

        store
            .ensure_schema()
            .await
            .context("Failed to create items table")?;
        info!("Storage schema ready");

        Ok(ItemService::new(store, cache))
    }

    pub async fn shutdown(&mut self) {
        if let Some(cache) = self.cache.take() {
            info!("Closing cache connection...");
            cache.close().await;
        }
        if let Some(store) = self.store.take() {
            info!("Closing storage connection...");
            store.close().await;
        }
        info!("Shutdown complete");
    }
}

async fn connect_cache(config: &ServerConfig) -> Result<Arc<dyn CacheStore>> {
    let ttl = config.cache_ttl();
    let cache: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Redis => {
            Arc::new(RedisCache::connect(&config.redis_host, config.redis_port, ttl).await?)
        }
        CacheBackend::Memory => {
            info!("Using in-memory cache");
            Arc::new(MemoryCache::new(ttl))
        }
    };
    info!("Cache connected (ttl: {:?})", ttl);
    Ok(cache)
}

async fn wait_for_storage(config: &ServerConfig) -> Result<Arc<dyn ItemStore>> {
    let url = config.database_url.as_str();
    info!("Connecting to storage at {}", storage::redact_url(url));

    let policy = RetryPolicy::new(config.database_connect_attempts, config.connect_backoff());
    let store = policy
        .execute("Storage connection", || async move {
            let store = storage::connect_item_store(url, config.database_max_connections).await?;
            store.ping().await?;
            Ok::<_, catalog_core::CatalogError>(store)
        })
        .await
        .context("Storage never became ready")?;

    info!("Storage connected");
    Ok(store)
}
