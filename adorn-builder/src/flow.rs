//! Selection flow state machine
//!
//! The three-stage ring configurator: Setting → Diamond → Ring. Tracks the
//! active stage, the highest stage the user has unlocked, and the payload
//! accumulated at each stage.
//!
//! Invariants:
//! - `active_stage <= max_reachable_stage` at all times
//! - `max_reachable_stage` only increases, except through `reset`
//! - Diamond is reachable only with a stored setting; Ring only with a
//!   stored diamond
//!
//! The only hard failure is selecting a diamond before any setting exists.
//! Requesting an unreached stage is a silent no-op, matching the blocked
//! forward click in the step indicator UI.

use adorn_common::events::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Selection flow errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// A transition was requested that the current state forbids
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// The setting chosen at stage 0, captured at the moment of selection
///
/// Immutable once created; re-selection replaces the record wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingSelection {
    /// Backend product id of the chosen setting
    pub product_id: String,
    /// Chosen metal code (e.g. "14W")
    #[serde(default)]
    pub metal: Option<String>,
    /// Chosen ring size
    #[serde(default)]
    pub ring_size: Option<String>,
    /// Price at selection time
    #[serde(default)]
    pub price: f64,
}

/// The diamond chosen at stage 1, captured at the moment of selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiamondSelection {
    /// Backend product id of the chosen diamond
    pub product_id: String,
    /// Diamond shape (e.g. "round")
    #[serde(default)]
    pub shape: Option<String>,
    /// Carat weight
    #[serde(default)]
    pub carat: Option<f64>,
    /// Price at selection time
    #[serde(default)]
    pub price: f64,
}

/// Finalized payload handed to the cart/order collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingOrder {
    /// Flow session that produced this order
    pub session_id: Uuid,
    pub setting: SettingSelection,
    pub diamond: DiamondSelection,
    /// Combined price of both components
    pub total_price: f64,
    /// When the payload was assembled
    pub assembled_at: DateTime<Utc>,
}

/// A stage movement produced by a flow operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub old_stage: Stage,
    pub new_stage: Stage,
}

/// The ring configurator state machine
#[derive(Debug, Clone)]
pub struct SelectionFlow {
    session_id: Uuid,
    active_stage: Stage,
    max_reachable: Stage,
    setting: Option<SettingSelection>,
    diamond: Option<DiamondSelection>,
}

impl SelectionFlow {
    /// Start a fresh flow at the Setting stage
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            active_stage: Stage::Setting,
            max_reachable: Stage::Setting,
            setting: None,
            diamond: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn active_stage(&self) -> Stage {
        self.active_stage
    }

    pub fn max_reachable_stage(&self) -> Stage {
        self.max_reachable
    }

    pub fn setting(&self) -> Option<&SettingSelection> {
        self.setting.as_ref()
    }

    pub fn diamond(&self) -> Option<&DiamondSelection> {
        self.diamond.as_ref()
    }

    /// Store a setting selection and move to the Diamond stage
    ///
    /// Valid from any state. Re-selecting replaces the stored setting and
    /// always moves `active_stage` back to Diamond; a previously stored
    /// diamond and the unlocked stages are retained, so forward progress
    /// is never lost.
    pub fn select_setting(&mut self, selection: SettingSelection) -> Transition {
        let old_stage = self.active_stage;
        self.setting = Some(selection);
        self.max_reachable = self.max_reachable.max(Stage::Diamond);
        self.active_stage = Stage::Diamond;
        Transition {
            old_stage,
            new_stage: self.active_stage,
        }
    }

    /// Store a diamond selection and move to the Ring stage
    ///
    /// Requires a stored setting; fails with `InvalidTransition` otherwise,
    /// leaving the state unchanged.
    pub fn select_diamond(&mut self, selection: DiamondSelection) -> Result<Transition, FlowError> {
        if self.setting.is_none() {
            return Err(FlowError::InvalidTransition(
                "cannot select a diamond before a setting".to_string(),
            ));
        }

        let old_stage = self.active_stage;
        self.diamond = Some(selection);
        self.max_reachable = self.max_reachable.max(Stage::Ring);
        self.active_stage = Stage::Ring;
        Ok(Transition {
            old_stage,
            new_stage: self.active_stage,
        })
    }

    /// Navigate to a stage the user has already unlocked
    ///
    /// Returns `Some(transition)` and moves iff `target` is at or below
    /// the highest reachable stage; otherwise returns None and changes
    /// nothing (the blocked forward click is not an error).
    pub fn request_stage(&mut self, target: Stage) -> Option<Transition> {
        if target > self.max_reachable {
            return None;
        }
        let old_stage = self.active_stage;
        self.active_stage = target;
        Some(Transition {
            old_stage,
            new_stage: target,
        })
    }

    /// Discard all progress and start over with a fresh session id
    ///
    /// Returns the new session id.
    pub fn reset(&mut self) -> Uuid {
        *self = SelectionFlow::new();
        self.session_id
    }

    /// Finalized order payload, available once the Ring stage is unlocked
    pub fn order(&self) -> Option<RingOrder> {
        if self.max_reachable < Stage::Ring {
            return None;
        }
        let setting = self.setting.clone()?;
        let diamond = self.diamond.clone()?;
        let total_price = setting.price + diamond.price;
        Some(RingOrder {
            session_id: self.session_id,
            setting,
            diamond,
            total_price,
            assembled_at: Utc::now(),
        })
    }
}

impl Default for SelectionFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(id: &str) -> SettingSelection {
        SettingSelection {
            product_id: id.to_string(),
            metal: Some("14W".to_string()),
            ring_size: Some("6".to_string()),
            price: 900.0,
        }
    }

    fn diamond(id: &str) -> DiamondSelection {
        DiamondSelection {
            product_id: id.to_string(),
            shape: Some("round".to_string()),
            carat: Some(1.2),
            price: 3100.0,
        }
    }

    #[test]
    fn test_initial_state() {
        let flow = SelectionFlow::new();
        assert_eq!(flow.active_stage(), Stage::Setting);
        assert_eq!(flow.max_reachable_stage(), Stage::Setting);
        assert!(flow.setting().is_none());
        assert!(flow.diamond().is_none());
        assert!(flow.order().is_none());
    }

    #[test]
    fn test_full_walkthrough_scenario() {
        let mut flow = SelectionFlow::new();

        let t = flow.select_setting(setting("r1"));
        assert_eq!(t.new_stage, Stage::Diamond);
        assert_eq!(flow.active_stage(), Stage::Diamond);
        assert_eq!(flow.max_reachable_stage(), Stage::Diamond);

        // Forward click to an unreached stage silently does nothing
        assert!(flow.request_stage(Stage::Ring).is_none());
        assert_eq!(flow.active_stage(), Stage::Diamond);

        let t = flow.select_diamond(diamond("d1")).unwrap();
        assert_eq!(t.new_stage, Stage::Ring);
        assert_eq!(flow.active_stage(), Stage::Ring);
        assert_eq!(flow.max_reachable_stage(), Stage::Ring);

        // Backward navigation is always allowed
        let t = flow.request_stage(Stage::Setting).unwrap();
        assert_eq!(t.old_stage, Stage::Ring);
        assert_eq!(flow.active_stage(), Stage::Setting);
        // Unlocked stages stay unlocked
        assert_eq!(flow.max_reachable_stage(), Stage::Ring);
    }

    #[test]
    fn test_diamond_before_setting_is_invalid() {
        let mut flow = SelectionFlow::new();
        let err = flow.select_diamond(diamond("d1")).unwrap_err();
        assert!(matches!(err, FlowError::InvalidTransition(_)));
        // State unchanged
        assert_eq!(flow.active_stage(), Stage::Setting);
        assert_eq!(flow.max_reachable_stage(), Stage::Setting);
        assert!(flow.diamond().is_none());
    }

    #[test]
    fn test_reselect_setting_returns_to_diamond_stage_keeping_progress() {
        let mut flow = SelectionFlow::new();
        flow.select_setting(setting("r1"));
        flow.select_diamond(diamond("d1")).unwrap();
        assert_eq!(flow.active_stage(), Stage::Ring);

        let t = flow.select_setting(setting("r2"));
        assert_eq!(t.old_stage, Stage::Ring);
        assert_eq!(t.new_stage, Stage::Diamond);
        assert_eq!(flow.setting().unwrap().product_id, "r2");
        // Diamond and unlocked stages survive the re-selection
        assert_eq!(flow.diamond().unwrap().product_id, "d1");
        assert_eq!(flow.max_reachable_stage(), Stage::Ring);
    }

    #[test]
    fn test_max_reachable_is_monotone() {
        let mut flow = SelectionFlow::new();
        flow.select_setting(setting("r1"));
        flow.select_diamond(diamond("d1")).unwrap();
        flow.request_stage(Stage::Setting);
        flow.select_setting(setting("r2"));
        flow.request_stage(Stage::Diamond);
        assert_eq!(flow.max_reachable_stage(), Stage::Ring);
    }

    #[test]
    fn test_guard_property() {
        let mut flow = SelectionFlow::new();
        flow.select_setting(setting("r1"));

        for target in [Stage::Setting, Stage::Diamond, Stage::Ring] {
            let before = flow.active_stage();
            let moved = flow.request_stage(target);
            if target <= flow.max_reachable_stage() {
                assert!(moved.is_some());
                assert_eq!(flow.active_stage(), target);
            } else {
                assert!(moved.is_none());
                assert_eq!(flow.active_stage(), before);
            }
        }
    }

    #[test]
    fn test_reset_clears_everything_and_rotates_session() {
        let mut flow = SelectionFlow::new();
        let old_session = flow.session_id();
        flow.select_setting(setting("r1"));
        flow.select_diamond(diamond("d1")).unwrap();

        let new_session = flow.reset();
        assert_ne!(new_session, old_session);
        assert_eq!(flow.active_stage(), Stage::Setting);
        assert_eq!(flow.max_reachable_stage(), Stage::Setting);
        assert!(flow.setting().is_none());
        assert!(flow.diamond().is_none());
        assert!(flow.order().is_none());
    }

    #[test]
    fn test_order_payload() {
        let mut flow = SelectionFlow::new();
        flow.select_setting(setting("r1"));
        assert!(flow.order().is_none());

        flow.select_diamond(diamond("d1")).unwrap();
        let order = flow.order().unwrap();
        assert_eq!(order.setting.product_id, "r1");
        assert_eq!(order.diamond.product_id, "d1");
        assert_eq!(order.total_price, 4000.0);
        assert_eq!(order.session_id, flow.session_id());

        // Navigating back from Ring keeps the order available
        flow.request_stage(Stage::Diamond);
        assert!(flow.order().is_some());
    }

    #[test]
    fn test_ring_stage_is_not_terminal() {
        let mut flow = SelectionFlow::new();
        flow.select_setting(setting("r1"));
        flow.select_diamond(diamond("d1")).unwrap();

        // Still usable: swap the diamond from the Ring stage
        let t = flow.select_diamond(diamond("d2")).unwrap();
        assert_eq!(t.old_stage, Stage::Ring);
        assert_eq!(flow.diamond().unwrap().product_id, "d2");
    }
}
