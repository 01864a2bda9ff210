//! In-process cache backed by DashMap, for local runs without Redis

use async_trait::async_trait;
use catalog_core::{CacheStore, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// In-memory cache with optional TTL applied to every entry
pub struct MemoryCache {
    data: Arc<DashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
    sweeper: JoinHandle<()>,
}

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|expires| now > expires).unwrap_or(false)
    }
}

impl MemoryCache {
    /// Must be called from within a tokio runtime; spawns the expiry sweeper.
    pub fn new(ttl: Option<Duration>) -> Self {
        let data = Arc::new(DashMap::new());
        let sweeper = Self::start_cleanup_task(data.clone());

        Self { data, ttl, sweeper }
    }

    /// Number of live and not yet swept entries
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn start_cleanup_task(data: Arc<DashMap<String, CacheEntry>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;

                let now = Instant::now();
                data.retain(|_, entry| !entry.is_expired(now));
            }
        })
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.data.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.data.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {
        self.sweeper.abort();
        self.data.clear();
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}
