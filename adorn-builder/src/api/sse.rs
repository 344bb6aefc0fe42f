//! Server-Sent Events (SSE) broadcaster
//!
//! Streams storefront events to connected clients.

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /api/events - SSE event stream
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    adorn_common::sse::event_sse_stream(&state.events)
}
