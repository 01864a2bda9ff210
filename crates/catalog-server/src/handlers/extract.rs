//! Request extractors whose rejections answer with the catalog error body
//!
//! axum's own `Path` and `Bytes` rejections reply in plain text with their own
//! status codes. These wrappers turn any such rejection into invalid input.

use crate::handlers::ApiError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use catalog_core::{CatalogError, ItemDraft, ItemId, ItemPayload};

/// Item id taken from the `:id` path segment
#[derive(Debug, Clone, Copy)]
pub struct ItemIdPath(pub ItemId);

#[async_trait]
impl<S> FromRequestParts<S> for ItemIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<ItemId>::from_request_parts(parts, state)
            .await
            .map_err(|e| CatalogError::Validation(e.body_text()))?;
        Ok(Self(id))
    }
}

/// Validated `{name, description}` request body.
///
/// The body is read raw so that a missing field is reported as invalid input
/// rather than as a JSON extractor rejection.
#[derive(Debug)]
pub struct ItemInput(pub ItemDraft);

#[async_trait]
impl<S> FromRequest<S> for ItemInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| CatalogError::Validation(e.body_text()))?;
        let draft = ItemPayload::from_json(&body)?.validate()?;
        Ok(Self(draft))
    }
}
