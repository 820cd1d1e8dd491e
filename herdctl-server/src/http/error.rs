//! API error type with IntoResponse
//!
//! Every storage failure is a 500 carrying the backend's own message,
//! duplicate keys included. Unparsable input is a 400. Both use the
//! `{"error": ...}` body shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::RepoError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request could not be parsed (400)
    BadRequest { message: String },

    /// Storage or re-read failure (500, logged)
    Repo(RepoError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::Repo(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        Self::Repo(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StorageError;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_is_400() {
        let response = ApiError::bad_request("invalid id").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "invalid id" }));
    }

    #[tokio::test]
    async fn duplicate_key_is_500_with_backend_message() {
        let err = ApiError::from(RepoError::Storage(StorageError::DuplicateKey {
            message: "UNIQUE constraint failed: animals.earTag".into(),
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "UNIQUE constraint failed: animals.earTag" })
        );
    }

    #[tokio::test]
    async fn vanished_row_is_500() {
        let err = ApiError::from(RepoError::Vanished {
            table: "animals",
            id: 3,
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
