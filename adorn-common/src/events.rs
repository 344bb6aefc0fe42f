//! Event types for the ADORN event system
//!
//! Replaces the storefront's ad hoc cross-component signaling with a typed
//! publish/subscribe bus. Components emit `StorefrontEvent`s; the UI layer
//! receives them over SSE.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// One of the three sequential steps of the ring configurator.
///
/// Ordering matters: `Setting < Diamond < Ring`. The numeric index is the
/// wire representation used by the flow API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Choose a ring setting
    Setting,
    /// Choose a diamond
    Diamond,
    /// Review the assembled ring
    Ring,
}

impl Stage {
    /// Numeric index of the stage (0-based)
    pub fn index(self) -> u8 {
        match self {
            Stage::Setting => 0,
            Stage::Diamond => 1,
            Stage::Ring => 2,
        }
    }

    /// Stage for a numeric index, if valid
    pub fn from_index(index: u8) -> Option<Stage> {
        match index {
            0 => Some(Stage::Setting),
            1 => Some(Stage::Diamond),
            2 => Some(Stage::Ring),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Setting => write!(f, "setting"),
            Stage::Diamond => write!(f, "diamond"),
            Stage::Ring => write!(f, "ring"),
        }
    }
}

/// Which remote product collection a catalog operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// Ring settings collection
    Settings,
    /// Loose diamonds collection
    Diamonds,
}

impl Dataset {
    /// Backend tab identifier for list endpoints
    pub fn tab(self) -> &'static str {
        match self {
            Dataset::Settings => "settings",
            Dataset::Diamonds => "diamonds",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tab())
    }
}

/// Severity of a toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// ADORN event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// All cross-component signaling goes through this central enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorefrontEvent {
    /// A catalog snapshot was replaced with freshly fetched data
    CatalogRefreshed {
        /// Which collection was refreshed
        dataset: Dataset,
        /// Number of products in the new snapshot
        total: usize,
        /// When the snapshot was installed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The user selected a product (setting or diamond)
    ProductSelected {
        /// Flow session the selection belongs to
        session_id: Uuid,
        /// Backend product id
        product_id: String,
        /// Collection the product came from
        dataset: Dataset,
        /// When the selection was made
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The configurator moved to a different stage
    StageChanged {
        /// Flow session
        session_id: Uuid,
        /// Stage before the change
        old_stage: Stage,
        /// Stage after the change
        new_stage: Stage,
        /// When the stage changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The configurator was reset to its initial state
    FlowReset {
        /// Session id of the flow that was discarded
        session_id: Uuid,
        /// Fresh session id after the reset
        new_session_id: Uuid,
        /// When the reset happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Both selections exist and the ring order payload is available
    SelectionFinalized {
        /// Flow session
        session_id: Uuid,
        /// Chosen setting product id
        setting_id: String,
        /// Chosen diamond product id
        diamond_id: String,
        /// When the selection was finalized
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A toast notification should be shown to the user
    ToastRequested {
        /// Severity of the toast
        level: ToastLevel,
        /// Message text
        message: String,
        /// When the toast was requested
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast event bus for ADORN services
///
/// Wraps a tokio broadcast channel. Cloning is cheap; all clones share the
/// same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StorefrontEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    ///
    /// `capacity` is the number of events buffered before old events are
    /// dropped for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<StorefrontEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` otherwise.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: StorefrontEvent,
    ) -> Result<usize, broadcast::error::SendError<StorefrontEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Useful for non-critical events where it is acceptable if no
    /// component is currently listening.
    pub fn emit_lossy(&self, event: StorefrontEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Setting < Stage::Diamond);
        assert!(Stage::Diamond < Stage::Ring);
        assert_eq!(Stage::Ring.index(), 2);
        assert_eq!(Stage::from_index(1), Some(Stage::Diamond));
        assert_eq!(Stage::from_index(3), None);
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = StorefrontEvent::StageChanged {
            session_id: Uuid::new_v4(),
            old_stage: Stage::Setting,
            new_stage: Stage::Diamond,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StageChanged");
        assert_eq!(json["old_stage"], "setting");
        assert_eq!(json["new_stage"], "diamond");
    }

    #[tokio::test]
    async fn test_event_bus_delivery() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit_lossy(StorefrontEvent::ToastRequested {
            level: ToastLevel::Info,
            message: "added to cart".to_string(),
            timestamp: chrono::Utc::now(),
        });

        match rx.recv().await.unwrap() {
            StorefrontEvent::ToastRequested { message, .. } => {
                assert_eq!(message, "added to cart");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(4);
        let result = bus.emit(StorefrontEvent::FlowReset {
            session_id: Uuid::new_v4(),
            new_session_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
        });
        assert!(result.is_err());
    }
}
