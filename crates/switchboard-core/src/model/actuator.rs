// ── Actuators ──
//
// The board exposes a fixed set of binary outputs. Each one has a single
// wire name used both as the command path segment and as its status key.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A remote binary-controllable output.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActuatorId {
    LightRoom1,
    LightRoom2,
    Pump,
}

impl ActuatorId {
    /// Every actuator, in display order.
    pub const ALL: [Self; 3] = [Self::LightRoom1, Self::LightRoom2, Self::Pump];

    /// Wire name: command path segment and status key.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::LightRoom1 => "Light (room 1)",
            Self::LightRoom2 => "Light (room 2)",
            Self::Pump => "Pump",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::LightRoom1 => 0,
            Self::LightRoom2 => 1,
            Self::Pump => 2,
        }
    }
}

/// On/off flag per actuator, plus the derived "all" aggregate.
///
/// The aggregate is computed on read, so it can never drift from the
/// individual flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    flags: [bool; ActuatorId::ALL.len()],
}

impl ActuatorState {
    /// State with every actuator set to `on`.
    pub fn uniform(on: bool) -> Self {
        Self {
            flags: [on; ActuatorId::ALL.len()],
        }
    }

    pub fn get(&self, id: ActuatorId) -> bool {
        self.flags[id.index()]
    }

    pub(crate) fn set(&mut self, id: ActuatorId, on: bool) {
        self.flags[id.index()] = on;
    }

    /// Builder-style variant of `set`.
    pub fn with(mut self, id: ActuatorId, on: bool) -> Self {
        self.set(id, on);
        self
    }

    /// Aggregate flag: logical AND of every actuator.
    pub fn all(&self) -> bool {
        self.flags.iter().all(|on| *on)
    }

    /// Iterate `(actuator, on)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ActuatorId, bool)> + '_ {
        ActuatorId::ALL.iter().map(|id| (*id, self.get(*id)))
    }
}

impl Serialize for ActuatorState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ActuatorId::ALL.len() + 1))?;
        for (id, on) in self.iter() {
            map.serialize_entry(id.as_str(), &on)?;
        }
        map.serialize_entry("all", &self.all())?;
        map.end()
    }
}
