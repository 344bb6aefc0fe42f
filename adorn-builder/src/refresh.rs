//! Catalog refresher
//!
//! Fetches product collections from the backend and installs them as
//! snapshots. Runs at startup and on demand via POST /api/catalog/refresh.
//!
//! Each refresh claims a sequence number before fetching, so a slow
//! response that arrives after a newer refresh completed is dropped by the
//! store (last-write-wins). A failed fetch leaves the last-known snapshot
//! in place.

use crate::AppState;
use adorn_catalog::CatalogError;
use adorn_common::events::{Dataset, StorefrontEvent};
use tracing::{error, info};

/// Refresh one product collection
///
/// Returns the number of products installed, or the fetch error. Emits
/// `CatalogRefreshed` only if the snapshot was actually installed (not
/// superseded by a newer refresh).
pub async fn refresh_dataset(state: &AppState, dataset: Dataset) -> Result<usize, CatalogError> {
    let store = state.store(dataset);
    let seq = store.begin_request();

    let (products, total) = state.client.fetch_all(dataset, state.page_size).await?;
    let count = products.len();

    if store.install(seq, products, total).await {
        state.events.emit_lossy(StorefrontEvent::CatalogRefreshed {
            dataset,
            total: count,
            timestamp: chrono::Utc::now(),
        });
        info!(dataset = %dataset, products = count, "Catalog refreshed");
    }

    Ok(count)
}

/// Refresh both collections, logging failures instead of propagating them
///
/// A failure on one collection does not stop the other; the UI keeps
/// operating on whatever snapshots exist.
pub async fn refresh_all(state: AppState) {
    for dataset in [Dataset::Settings, Dataset::Diamonds] {
        if let Err(e) = refresh_dataset(&state, dataset).await {
            error!(dataset = %dataset, "Catalog refresh failed: {}", e);
        }
    }
}
