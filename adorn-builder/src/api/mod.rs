//! HTTP API handlers for adorn-builder

pub mod handlers;
pub mod sse;

pub use handlers::{
    flow_state, get_order, health, list_options, list_products, refresh_catalog, request_stage,
    reset_flow, select_diamond, select_setting,
};
pub use sse::event_stream;
