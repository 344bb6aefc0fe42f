//! HTTP request handlers
//!
//! Implements the REST endpoints for product browsing and configurator
//! flow control.

use crate::flow::{DiamondSelection, FlowError, RingOrder, SettingSelection};
use crate::AppState;
use adorn_catalog::{apply_filters, derive_options, FilterOptions, FilterSpec, Product};
use adorn_common::events::{Dataset, Stage, StorefrontEvent, ToastLevel};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    /// Filtered products, in filtered/sorted order
    items: Vec<Product>,
    /// Number of products after filtering
    count: usize,
    /// Total products in the unfiltered snapshot
    total: u64,
    /// When the snapshot was fetched
    fetched_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct FlowStateResponse {
    session_id: Uuid,
    /// Active stage index (0 = setting, 1 = diamond, 2 = ring)
    active_stage: u8,
    /// Highest stage the user has unlocked
    max_reachable_stage: u8,
    setting: Option<SettingSelection>,
    diamond: Option<DiamondSelection>,
}

#[derive(Debug, Deserialize)]
pub struct StageRequest {
    /// Target stage index
    stage: u8,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn parse_dataset(raw: &str) -> Result<Dataset, ApiError> {
    match raw {
        "settings" => Ok(Dataset::Settings),
        "diamonds" => Ok(Dataset::Diamonds),
        other => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown dataset: {other}"),
        )),
    }
}

async fn flow_response(state: &AppState) -> FlowStateResponse {
    let flow = state.flow.read().await;
    FlowStateResponse {
        session_id: flow.session_id(),
        active_stage: flow.active_stage().index(),
        max_reachable_stage: flow.max_reachable_stage().index(),
        setting: flow.setting().cloned(),
        diamond: flow.diamond().cloned(),
    }
}

// ============================================================================
// Catalog Endpoints
// ============================================================================

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "adorn-builder".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/products/:dataset - filtered, sorted product list
///
/// Query parameters map directly onto `FilterSpec`; absent parameters and
/// the "All" sentinel impose no constraint. Strict filtering: an empty
/// result is returned as-is, never replaced with the unfiltered set.
pub async fn list_products(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
    Query(spec): Query<FilterSpec>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let dataset = parse_dataset(&dataset)?;
    let snapshot = state.store(dataset).snapshot().await;
    let items = apply_filters(&snapshot.products, &spec);

    Ok(Json(ProductListResponse {
        count: items.len(),
        total: snapshot.total,
        fetched_at: snapshot.fetched_at,
        items,
    }))
}

/// GET /api/options/:dataset - derived filter options for the selectors
pub async fn list_options(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
) -> Result<Json<FilterOptions>, ApiError> {
    let dataset = parse_dataset(&dataset)?;
    let snapshot = state.store(dataset).snapshot().await;
    Ok(Json(derive_options(&snapshot.products)))
}

/// POST /api/catalog/refresh - trigger a background refetch of both
/// collections
///
/// Returns immediately; readers keep the last-known snapshots until the
/// new ones land (stale-while-revalidate).
pub async fn refresh_catalog(State(state): State<AppState>) -> (StatusCode, Json<RefreshResponse>) {
    info!("Catalog refresh requested");
    tokio::spawn(crate::refresh::refresh_all(state));
    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            status: "refreshing".to_string(),
        }),
    )
}

// ============================================================================
// Flow Endpoints
// ============================================================================

/// GET /api/flow - current configurator state
pub async fn flow_state(State(state): State<AppState>) -> Json<FlowStateResponse> {
    Json(flow_response(&state).await)
}

/// POST /api/flow/setting - store a setting selection, advance to Diamond
pub async fn select_setting(
    State(state): State<AppState>,
    Json(selection): Json<SettingSelection>,
) -> Json<FlowStateResponse> {
    let product_id = selection.product_id.clone();
    let (session_id, transition) = {
        let mut flow = state.flow.write().await;
        (flow.session_id(), flow.select_setting(selection))
    };

    info!(session_id = %session_id, product_id = %product_id, "Setting selected");
    state.events.emit_lossy(StorefrontEvent::ProductSelected {
        session_id,
        product_id,
        dataset: Dataset::Settings,
        timestamp: chrono::Utc::now(),
    });
    if transition.old_stage != transition.new_stage {
        state.events.emit_lossy(StorefrontEvent::StageChanged {
            session_id,
            old_stage: transition.old_stage,
            new_stage: transition.new_stage,
            timestamp: chrono::Utc::now(),
        });
    }

    Json(flow_response(&state).await)
}

/// POST /api/flow/diamond - store a diamond selection, advance to Ring
///
/// Fails with 409 if no setting has been selected yet (the one hard
/// failure of the flow).
pub async fn select_diamond(
    State(state): State<AppState>,
    Json(selection): Json<DiamondSelection>,
) -> Result<Json<FlowStateResponse>, ApiError> {
    let product_id = selection.product_id.clone();
    let result = {
        let mut flow = state.flow.write().await;
        let session_id = flow.session_id();
        flow.select_diamond(selection).map(|t| (session_id, t))
    };

    match result {
        Ok((session_id, transition)) => {
            info!(session_id = %session_id, product_id = %product_id, "Diamond selected");
            state.events.emit_lossy(StorefrontEvent::ProductSelected {
                session_id,
                product_id,
                dataset: Dataset::Diamonds,
                timestamp: chrono::Utc::now(),
            });
            if transition.old_stage != transition.new_stage {
                state.events.emit_lossy(StorefrontEvent::StageChanged {
                    session_id,
                    old_stage: transition.old_stage,
                    new_stage: transition.new_stage,
                    timestamp: chrono::Utc::now(),
                });
            }

            // Both selections now exist: announce the finalized payload
            let flow = state.flow.read().await;
            if let (Some(setting), Some(diamond)) = (flow.setting(), flow.diamond()) {
                state.events.emit_lossy(StorefrontEvent::SelectionFinalized {
                    session_id,
                    setting_id: setting.product_id.clone(),
                    diamond_id: diamond.product_id.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
            drop(flow);

            Ok(Json(flow_response(&state).await))
        }
        Err(FlowError::InvalidTransition(reason)) => {
            warn!(product_id = %product_id, reason = %reason, "Rejected diamond selection");
            state.events.emit_lossy(StorefrontEvent::ToastRequested {
                level: ToastLevel::Warning,
                message: "Choose a setting before picking a diamond".to_string(),
                timestamp: chrono::Utc::now(),
            });
            Err(api_error(StatusCode::CONFLICT, reason))
        }
    }
}

/// POST /api/flow/stage - navigate the step indicator
///
/// A request for an unreached stage is not an error: the flow stays put
/// and the current state is returned unchanged.
pub async fn request_stage(
    State(state): State<AppState>,
    Json(request): Json<StageRequest>,
) -> Result<Json<FlowStateResponse>, ApiError> {
    let target = Stage::from_index(request.stage).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid stage index: {}", request.stage),
        )
    })?;

    let (session_id, transition) = {
        let mut flow = state.flow.write().await;
        (flow.session_id(), flow.request_stage(target))
    };

    match transition {
        Some(t) if t.old_stage != t.new_stage => {
            state.events.emit_lossy(StorefrontEvent::StageChanged {
                session_id,
                old_stage: t.old_stage,
                new_stage: t.new_stage,
                timestamp: chrono::Utc::now(),
            });
        }
        Some(_) => {}
        None => {
            info!(session_id = %session_id, target = %target, "Blocked forward stage request");
        }
    }

    Ok(Json(flow_response(&state).await))
}

/// POST /api/flow/reset - discard all progress and start over
pub async fn reset_flow(State(state): State<AppState>) -> Json<FlowStateResponse> {
    let (old_session, new_session) = {
        let mut flow = state.flow.write().await;
        let old = flow.session_id();
        (old, flow.reset())
    };

    info!(old_session = %old_session, new_session = %new_session, "Flow reset");
    state.events.emit_lossy(StorefrontEvent::FlowReset {
        session_id: old_session,
        new_session_id: new_session,
        timestamp: chrono::Utc::now(),
    });

    Json(flow_response(&state).await)
}

/// GET /api/flow/order - finalized ring order payload for checkout
///
/// 404 until both a setting and a diamond have been selected.
pub async fn get_order(State(state): State<AppState>) -> Result<Json<RingOrder>, ApiError> {
    let flow = state.flow.read().await;
    flow.order().map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            "Selection not finalized: choose a setting and a diamond first",
        )
    })
}
