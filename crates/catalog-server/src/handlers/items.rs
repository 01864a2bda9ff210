//! Item handlers

use crate::handlers::extract::{ItemIdPath, ItemInput};
use crate::handlers::ApiError;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use catalog_core::{Item, ItemId};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    data: T,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    id: ItemId,
    name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

pub async fn get(
    State(state): State<AppState>,
    ItemIdPath(id): ItemIdPath,
) -> Result<Json<DataResponse<Item>>, ApiError> {
    let item = state.items.get_item(id).await?;
    Ok(Json(DataResponse { data: item }))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<DataResponse<Vec<Item>>>, ApiError> {
    let items = state.items.list_items().await?;
    Ok(Json(DataResponse { data: items }))
}

pub async fn create(
    State(state): State<AppState>,
    ItemInput(draft): ItemInput,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let item = state.items.create_item(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: item.id,
            name: item.name,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    ItemIdPath(id): ItemIdPath,
    ItemInput(draft): ItemInput,
) -> Result<Json<MessageResponse>, ApiError> {
    state.items.update_item(id, draft).await?;

    Ok(Json(MessageResponse {
        message: "Item updated",
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    ItemIdPath(id): ItemIdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    state.items.delete_item(id).await?;

    Ok(Json(MessageResponse {
        message: "Item deleted",
    }))
}
