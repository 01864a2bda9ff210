//! Cache trait for the read-through layer

use crate::Result;
use async_trait::async_trait;

/// String-keyed, string-valued cache.
///
/// Values are opaque to the cache; callers store JSON. Every failure is
/// reported as [`crate::CatalogError::Cache`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;

    async fn close(&self) {}
}
