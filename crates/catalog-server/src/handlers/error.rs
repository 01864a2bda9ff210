//! Mapping from catalog errors to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::CatalogError;
use serde_json::json;
use tracing::{debug, error};

/// Error response wrapper; every handler failure goes through here
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Storage(_) | CatalogError::Cache(_) | CatalogError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Driver details stay in the logs.
    pub fn message(&self) -> &'static str {
        match self.0 {
            CatalogError::Validation(_) => "Invalid input",
            CatalogError::NotFound(_) => "Item not found",
            CatalogError::Storage(_) => "Storage error",
            CatalogError::Cache(_) | CatalogError::Serialization(_) => "Internal error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            debug!("Request rejected: {}", self.0);
        }

        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CatalogError::Validation("x".into()), StatusCode::BAD_REQUEST, "Invalid input"),
            (CatalogError::NotFound(1), StatusCode::NOT_FOUND, "Item not found"),
            (
                CatalogError::Storage("connection reset".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error",
            ),
            (
                CatalogError::Serialization("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
            ),
        ];

        for (err, status, message) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status(), status);
            assert_eq!(api.message(), message);
        }
    }

    #[tokio::test]
    async fn test_storage_detail_not_exposed() {
        let response = ApiError(CatalogError::Storage("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Storage error" }));
    }
}
