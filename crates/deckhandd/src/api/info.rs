//! Service information.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// `GET /api/info`: service state, process metrics and cloud metadata.
///
/// Neither provider can fail the request; missing readings render as `null`
/// (metrics) or `"unavailable"` (cloud metadata).
pub async fn info(State(state): State<AppState>) -> Json<Value> {
    let metrics_provider = Arc::clone(&state.metrics);
    let metrics = tokio::task::spawn_blocking(move || metrics_provider.sample())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Metrics sampling task failed");
            None
        });

    let cloud = state
        .metadata
        .fetch()
        .await
        .map_or_else(|| json!("unavailable"), |metadata| json!(metadata));

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": state.status(),
        "metrics": metrics,
        "cloud": cloud,
    }))
}
