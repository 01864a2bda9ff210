//! Redis cache adapter

use async_trait::async_trait;
use catalog_core::{CacheStore, CatalogError, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis-backed cache.
///
/// The connection manager reconnects on its own and is cheap to clone, so each
/// call works on a clone instead of sharing a lock.
pub struct RedisCache {
    manager: ConnectionManager,
    ttl: Option<Duration>,
}

impl RedisCache {
    pub async fn connect(host: &str, port: u16, ttl: Option<Duration>) -> Result<Self> {
        let url = format!("redis://{}:{}/", host, port);
        tracing::info!("Connecting to Redis at {}", url);

        let client = redis::Client::open(url).map_err(CatalogError::cache)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(CatalogError::cache)?;

        Ok(Self { manager, ttl })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(CatalogError::cache)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = self.ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        cmd.query_async::<_, ()>(&mut conn)
            .await
            .map_err(CatalogError::cache)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await.map_err(CatalogError::cache)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(CatalogError::cache)
    }

    async fn close(&self) {
        // ConnectionManager has no explicit close; the socket goes away with
        // the last clone.
        tracing::debug!("Releasing Redis connection");
    }
}
