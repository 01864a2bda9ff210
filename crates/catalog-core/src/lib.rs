//! Item Catalog Core Library
//!
//! Domain types, the error taxonomy, cache key conventions and the port
//! traits the catalog server plugs its storage and cache adapters into.

pub mod error;
pub mod item;
pub mod keys;
pub mod ports;

pub use error::{CatalogError, Result};
pub use item::{Item, ItemDraft, ItemId, ItemPayload, MAX_NAME_LEN};
pub use ports::{CacheStore, ItemStore};
