//! Demo action handlers. Each one changes service state and records events.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::state::{AppState, ServiceStatus};

#[derive(Debug, Deserialize)]
pub struct ScaleRequest {
    replicas: i64,
}

pub async fn deploy(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.deploy())
}

pub async fn scale(
    State(state): State<AppState>,
    Json(request): Json<ScaleRequest>,
) -> Json<ServiceStatus> {
    Json(state.scale(request.replicas))
}

pub async fn rotate(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.rotate())
}

pub async fn fail(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.fail())
}
