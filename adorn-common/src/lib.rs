//! # ADORN Common Library
//!
//! Shared code for the ADORN storefront services including:
//! - Event types (StorefrontEvent enum) and EventBus
//! - Configuration loading and setting resolution
//! - Common error types
//! - SSE stream utilities

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
pub use events::{Dataset, EventBus, Stage, StorefrontEvent};
