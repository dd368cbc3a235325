//! Log history and the live event stream.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use deckhand_events::{EventRecord, Frame, clamp_limit};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    limit: Option<String>,
}

/// `GET /api/logs?limit=k`: the last `k` records, clamped to the configured
/// bound. Missing or unparsable limits fall back to the bound.
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Json<Vec<Arc<EventRecord>>> {
    let bound = state.publisher.config().recent_limit;
    let requested = query
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or_else(|| i64::try_from(bound).unwrap_or(i64::MAX));

    let k = clamp_limit(requested, bound);
    Json(state.publisher.recent(i64::try_from(k).unwrap_or(i64::MAX)))
}

/// `GET /api/logs/stream`: attach a viewer and stream its frames as
/// server-sent events.
pub async fn stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let session = state.publisher.subscribe()?;
    Ok(Sse::new(session.into_stream().map(|frame| to_sse(&frame))))
}

/// Render a frame. Keep-alives become SSE comments, which `EventSource`
/// consumers never surface as messages.
fn to_sse(frame: &Frame) -> Result<Event, axum::Error> {
    match frame {
        Frame::Snapshot(records) => Event::default().event("snapshot").json_data(records),
        Frame::Event(record) => Event::default()
            .event("event")
            .id(record.seq().to_string())
            .json_data(record),
        Frame::KeepAlive => Ok(Event::default().comment("keep-alive")),
    }
}

