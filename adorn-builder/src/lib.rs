//! adorn-builder library - ring configurator service
//!
//! Hosts the selection flow state machine and serves the filtered product
//! lists for the "design your own ring" pages. Catalog data is held as
//! in-memory snapshots refreshed from the storefront REST backend.

use adorn_catalog::{CatalogClient, CatalogStore};
use adorn_common::events::{Dataset, EventBus};
use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod flow;
pub mod refresh;

use flow::SelectionFlow;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Ring settings snapshot store
    pub settings: Arc<CatalogStore>,
    /// Loose diamonds snapshot store
    pub diamonds: Arc<CatalogStore>,
    /// The configurator state machine
    pub flow: Arc<RwLock<SelectionFlow>>,
    /// Event broadcaster for SSE clients
    pub events: EventBus,
    /// Backend REST client
    pub client: Arc<CatalogClient>,
    /// Page size for backend list requests
    pub page_size: u32,
}

impl AppState {
    /// Create new application state with empty catalog snapshots
    pub fn new(client: CatalogClient, page_size: u32) -> Self {
        Self {
            settings: Arc::new(CatalogStore::new()),
            diamonds: Arc::new(CatalogStore::new()),
            flow: Arc::new(RwLock::new(SelectionFlow::new())),
            events: EventBus::new(100),
            client: Arc::new(client),
            page_size,
        }
    }

    /// Snapshot store for one collection
    pub fn store(&self, dataset: Dataset) -> &Arc<CatalogStore> {
        match dataset {
            Dataset::Settings => &self.settings,
            Dataset::Diamonds => &self.diamonds,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/products/:dataset", get(api::list_products))
        .route("/api/options/:dataset", get(api::list_options))
        .route("/api/catalog/refresh", post(api::refresh_catalog))
        .route("/api/flow", get(api::flow_state))
        .route("/api/flow/setting", post(api::select_setting))
        .route("/api/flow/diamond", post(api::select_diamond))
        .route("/api/flow/stage", post(api::request_stage))
        .route("/api/flow/reset", post(api::reset_flow))
        .route("/api/flow/order", get(api::get_order))
        .route("/api/events", get(api::event_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
