//! Storage layer
//!
//! PostgreSQL or embedded SQLite for items, chosen by the database URL scheme.
//! Redis or an in-process DashMap for the cache.

pub mod memory;
pub mod postgres;
pub mod redis;
pub mod sqlite;

pub use memory::MemoryCache;
pub use postgres::PgItemStore;
pub use self::redis::RedisCache;
pub use sqlite::SqliteItemStore;

use catalog_core::{CatalogError, Item, ItemId, ItemStore, Result};
use std::sync::Arc;

/// Open the item store matching the URL scheme.
pub async fn connect_item_store(url: &str, max_connections: u32) -> Result<Arc<dyn ItemStore>> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(Arc::new(PgItemStore::connect(url, max_connections).await?))
    } else if url.starts_with("sqlite:") {
        Ok(Arc::new(SqliteItemStore::connect(url, max_connections).await?))
    } else {
        Err(CatalogError::Storage(format!(
            "unsupported database URL scheme: {}",
            redact_url(url)
        )))
    }
}

/// Strip credentials from a connection URL before it is logged.
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

// Row shape shared by both SQL backends
#[derive(sqlx::FromRow)]
struct ItemRow {
    id: ItemId,
    name: String,
    description: String,
}

impl From<ItemRow> for Item {
    fn from(r: ItemRow) -> Self {
        Item {
            id: r.id,
            name: r.name,
            description: r.description,
        }
    }
}
