//! Cache key conventions
//!
//! `item:<id>` holds one JSON-encoded item, `items:all` holds the JSON-encoded
//! list of every item ordered by id.

use crate::item::ItemId;

/// Key for the cached list of all items.
pub const ITEMS_ALL_KEY: &str = "items:all";

/// Key for a single cached item.
pub fn item_key(id: ItemId) -> String {
    format!("item:{}", id)
}
