// ── Status snapshot ──
//
// Decoded form of the device's status line, e.g. `Fan:1,Light:0,Pump:1`.
//
// Grammar: tokens separated by `,`, each `Key:0` or `Key:1`, whitespace
// around tokens and keys ignored, empty tokens (trailing comma) skipped.
// Keys are case-insensitive and stored lowercased. A key that is absent
// from the line decodes to `false`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::model::actuator::{ActuatorId, ActuatorState};

/// A point-in-time decoded view of the device's outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    values: BTreeMap<String, bool>,
    raw: String,
    received_at: DateTime<Utc>,
}

impl StatusSnapshot {
    /// Decode a raw status line. Rejects the whole line on the first
    /// malformed token.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let body = raw.trim();
        if body.is_empty() {
            return Err(decode_error(raw, "empty status line"));
        }

        let mut values = BTreeMap::new();
        for token in body.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let Some((key, value)) = token.split_once(':') else {
                return Err(decode_error(raw, format!("token '{token}' has no ':'")));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(decode_error(raw, format!("token '{token}' has an empty key")));
            }

            let on = match value.trim() {
                "1" => true,
                "0" => false,
                other => {
                    return Err(decode_error(
                        raw,
                        format!("value '{other}' for '{key}' is not 0 or 1"),
                    ));
                }
            };

            if values.insert(key.to_ascii_lowercase(), on).is_some() {
                return Err(decode_error(raw, format!("key '{key}' appears twice")));
            }
        }

        Ok(Self {
            values,
            raw: raw.to_owned(),
            received_at: Utc::now(),
        })
    }

    /// Value for `key` (case-insensitive); absent keys are `false`.
    pub fn get(&self, key: &str) -> bool {
        self.values
            .get(&key.to_ascii_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// Whether the line mentioned `key` at all.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_ascii_lowercase())
    }

    /// Value reported for an actuator.
    pub fn actuator(&self, id: ActuatorId) -> bool {
        self.get(id.as_str())
    }

    /// Actuator flags as reported by this snapshot, aggregate included.
    pub fn actuator_state(&self) -> ActuatorState {
        ActuatorId::ALL
            .iter()
            .fold(ActuatorState::default(), |state, id| {
                state.with(*id, self.actuator(*id))
            })
    }

    /// Every decoded `(key, value)` pair, lowercased keys, sorted.
    pub fn entries(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

fn decode_error(raw: &str, reason: impl Into<String>) -> CoreError {
    CoreError::Decode {
        body: raw.to_owned(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(raw: &str) -> StatusSnapshot {
        match StatusSnapshot::parse(raw) {
            Ok(snap) => snap,
            Err(e) => panic!("expected {raw:?} to decode, got {e}"),
        }
    }

    #[test]
    fn decodes_reference_line() {
        let snap = parse("Fan:1,Light:0,Pump:1");
        let entries: Vec<_> = snap.entries().collect();
        assert_eq!(entries, [("fan", true), ("light", false), ("pump", true)]);
        assert!(snap.get("Fan"));
        assert!(!snap.get("Light"));
        assert!(snap.actuator(ActuatorId::Pump));
    }

    #[test]
    fn absent_keys_are_off() {
        let snap = parse("Pump:1");
        assert!(!snap.contains("lightroom1"));
        assert!(!snap.actuator(ActuatorId::LightRoom1));
        assert!(!snap.actuator(ActuatorId::LightRoom2));
        assert!(snap.actuator(ActuatorId::Pump));
        assert!(!snap.actuator_state().all());
    }

    #[test]
    fn order_and_case_do_not_matter() {
        let a = parse("pump:1,LIGHTROOM2:1,LightRoom1:1");
        assert!(a.actuator_state().all());
    }

    #[test]
    fn tolerates_whitespace_and_trailing_comma() {
        let snap = parse(" lightroom1 : 1 , pump:0,\r\n");
        assert!(snap.actuator(ActuatorId::LightRoom1));
        assert!(!snap.actuator(ActuatorId::Pump));
        assert_eq!(snap.raw(), " lightroom1 : 1 , pump:0,\r\n");
    }

    #[test]
    fn rejects_malformed_lines() {
        for raw in ["", "  \n", "Fan", "Fan:2", ":1", "Fan:1,Pump", "Fan:on", "Pump:1,pump:0"] {
            let result = StatusSnapshot::parse(raw);
            assert!(
                matches!(result, Err(CoreError::Decode { .. })),
                "expected decode error for {raw:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn decode_error_keeps_body() {
        match StatusSnapshot::parse("Fan:maybe") {
            Err(CoreError::Decode { body, reason }) => {
                assert_eq!(body, "Fan:maybe");
                assert!(reason.contains("maybe"), "{reason}");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
