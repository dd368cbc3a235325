//! Mapping domain errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deckhand_common::DeckhandError;
use serde_json::json;

/// Error returned from handlers.
#[derive(Debug)]
pub struct ApiError(DeckhandError);

impl From<DeckhandError> for ApiError {
    fn from(err: DeckhandError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DeckhandError::SessionLimit { .. } | DeckhandError::Unavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DeckhandError::Config { .. } => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self.0, "Request failed");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
