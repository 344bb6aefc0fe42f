//! Server-Sent Events (SSE) utilities
//!
//! Bridges the EventBus broadcast channel into an SSE response stream for
//! connected UI clients.

use crate::events::{EventBus, StorefrontEvent};
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Create an SSE stream that forwards all EventBus events to one client
///
/// Sends an initial `ConnectionStatus` event, then one SSE event per
/// `StorefrontEvent`. Lagged receivers skip dropped events and keep
/// streaming; the stream ends when the bus is closed.
pub fn event_sse_stream(
    bus: &EventBus,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected");

    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        // Initial connected status so the client can show link state
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            let event_type = event_type_str(&event);
                            debug!("Broadcasting SSE event: {}", event_type);
                            yield Ok(Event::default().event(event_type).data(json));
                        }
                        Err(e) => {
                            warn!("Failed to serialize event: {}", e);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("Event bus closed, ending SSE stream");
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Extract the SSE event-type string from a StorefrontEvent
fn event_type_str(event: &StorefrontEvent) -> &'static str {
    match event {
        StorefrontEvent::CatalogRefreshed { .. } => "CatalogRefreshed",
        StorefrontEvent::ProductSelected { .. } => "ProductSelected",
        StorefrontEvent::StageChanged { .. } => "StageChanged",
        StorefrontEvent::FlowReset { .. } => "FlowReset",
        StorefrontEvent::SelectionFinalized { .. } => "SelectionFinalized",
        StorefrontEvent::ToastRequested { .. } => "ToastRequested",
    }
}
