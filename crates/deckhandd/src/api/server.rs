//! Router assembly.

use axum::response::Html;
use axum::{Router, routing::get, routing::post};
use tower_http::trace::TraceLayer;

use super::{actions, info, logs};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Build the HTTP application.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/info", get(info::info))
        .route("/api/logs", get(logs::recent))
        .route("/api/logs/stream", get(logs::stream))
        .route("/api/deploy", post(actions::deploy))
        .route("/api/scale", post(actions::scale))
        .route("/api/rotate", post(actions::rotate))
        .route("/api/fail", post(actions::fail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "OK"
}
