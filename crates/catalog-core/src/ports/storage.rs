//! Storage trait for item persistence

use crate::item::{Item, ItemDraft, ItemId};
use crate::Result;
use async_trait::async_trait;

/// Item store, the system of record.
///
/// Every failure is reported as [`crate::CatalogError::Storage`].
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>>;

    /// All items, ordered by id.
    async fn get_all(&self) -> Result<Vec<Item>>;

    /// Insert a new item; the store assigns its id.
    async fn create(&self, draft: &ItemDraft) -> Result<Item>;

    /// Overwrite name and description of an existing item.
    async fn save(&self, item: &Item) -> Result<()>;

    async fn delete(&self, item: &Item) -> Result<()>;

    /// Create the items table if it does not exist yet.
    async fn ensure_schema(&self) -> Result<()>;

    /// Cheap round trip used for readiness and health checks.
    async fn ping(&self) -> Result<()>;

    async fn close(&self);
}
