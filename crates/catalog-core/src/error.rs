//! Error types for the item catalog

use crate::item::ItemId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A required request field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// Any failure reported by the relational store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Any failure reported by the cache engine. Callers treat this as
    /// non-fatal and fall back to storage.
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CatalogError {
    pub fn storage(e: impl std::fmt::Display) -> Self {
        CatalogError::Storage(e.to_string())
    }

    pub fn cache(e: impl std::fmt::Display) -> Self {
        CatalogError::Cache(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}
