//! Item types

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};

/// Storage-assigned item identifier.
pub type ItemId = i32;

/// Upper bound on `Item::name`, matching the `VARCHAR(255)` column.
pub const MAX_NAME_LEN: usize = 255;

/// Catalog item, as persisted and as cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
}

impl Item {
    /// Overwrite the mutable fields from a validated draft. The id never changes.
    pub fn apply(&mut self, draft: ItemDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// Validated fields for creating or updating an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
}

/// Raw create/update request body.
///
/// Both fields are optional here so that a missing field surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ItemPayload {
    /// Parse a request body. Empty, non-JSON and non-object bodies are all
    /// reported as invalid input.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(CatalogError::Validation("empty request body".to_string()));
        }
        serde_json::from_slice(body).map_err(|e| CatalogError::Validation(e.to_string()))
    }

    pub fn validate(self) -> Result<ItemDraft> {
        let name = self
            .name
            .ok_or_else(|| CatalogError::Validation("missing field `name`".to_string()))?;
        let description = self
            .description
            .ok_or_else(|| CatalogError::Validation("missing field `description`".to_string()))?;

        if name.chars().count() > MAX_NAME_LEN {
            return Err(CatalogError::Validation(format!(
                "`name` exceeds {} characters",
                MAX_NAME_LEN
            )));
        }

        Ok(ItemDraft { name, description })
    }
}
