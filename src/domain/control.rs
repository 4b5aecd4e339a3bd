// Pump control record shared with the device through the realtime store
use super::telemetry::{object_or_empty, FeedError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// `{auto, manualPump}` as stored at `irrigation/control`.
///
/// While `auto` is set the device follows its own moisture logic and
/// `manual_pump` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub auto: bool,
    pub manual_pump: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            auto: true,
            manual_pump: false,
        }
    }
}

impl ControlState {
    pub fn new(auto: bool, manual_pump: bool) -> Self {
        Self { auto, manual_pump }
    }

    /// Missing or non-boolean flags read as `false`.
    pub fn decode(value: &Value) -> Result<Self, FeedError> {
        let fields = object_or_empty(value)?;
        let flag = |name: &str| fields.get(name).and_then(Value::as_bool).unwrap_or(false);
        Ok(Self {
            auto: flag("auto"),
            manual_pump: flag("manualPump"),
        })
    }

    /// Switching auto on always drops a pending manual request.
    pub fn toggle_auto(self) -> Self {
        let auto = !self.auto;
        Self {
            auto,
            manual_pump: if auto { false } else { self.manual_pump },
        }
    }

    /// Rejected (`None`) while auto mode is on.
    pub fn toggle_manual(self) -> Option<Self> {
        if self.auto {
            return None;
        }
        Some(Self {
            auto: false,
            manual_pump: !self.manual_pump,
        })
    }

    /// Both fields, always written together.
    pub fn to_update(self) -> Value {
        serde_json::json!({
            "auto": self.auto,
            "manualPump": self.manual_pump,
        })
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Auto = {}, Manual Pump = {}",
            on_off(self.auto),
            on_off(self.manual_pump)
        )
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auto_supersedes_manual() {
        let state = ControlState::new(false, true).toggle_auto();
        assert_eq!(state, ControlState::new(true, false));
    }

    #[test]
    fn test_leaving_auto_keeps_manual_off() {
        let state = ControlState::new(true, false).toggle_auto();
        assert_eq!(state, ControlState::new(false, false));
    }

    #[test]
    fn test_manual_rejected_in_auto() {
        assert_eq!(ControlState::new(true, false).toggle_manual(), None);
        assert_eq!(ControlState::new(true, true).toggle_manual(), None);
    }

    #[test]
    fn test_manual_flips_when_auto_off() {
        let on = ControlState::new(false, false).toggle_manual().unwrap();
        assert_eq!(on, ControlState::new(false, true));
        assert_eq!(on.toggle_manual(), Some(ControlState::new(false, false)));
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            ControlState::decode(&json!({"auto": false, "manualPump": true})).unwrap(),
            ControlState::new(false, true)
        );
        assert_eq!(
            ControlState::decode(&json!({"auto": "yes"})).unwrap(),
            ControlState::new(false, false)
        );
        assert_eq!(
            ControlState::decode(&Value::Null).unwrap(),
            ControlState::new(false, false)
        );
        assert!(ControlState::decode(&json!([true])).is_err());
    }

    #[test]
    fn test_update_has_both_fields() {
        assert_eq!(
            ControlState::new(false, true).to_update(),
            json!({"auto": false, "manualPump": true})
        );
    }

    #[test]
    fn test_status_text() {
        assert_eq!(
            ControlState::new(true, false).to_string(),
            "Auto = ON, Manual Pump = OFF"
        );
    }
}
