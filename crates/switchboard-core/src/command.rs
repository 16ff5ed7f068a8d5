// ── Command API ──
//
// Every user-initiated operation can be expressed as a `Command` and routed
// through `Controller::execute`, which lets front ends dispatch uniformly.

use serde::Serialize;

use crate::model::{ActuatorId, ConnectionState, StatusSnapshot};
use crate::probe::ProbeReport;

/// All operations a front end can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the probe chain.
    Probe,
    /// Pull and reconcile the device status.
    Sync,
    /// Flip an actuator.
    Toggle { actuator: ActuatorId },
    /// Drive an actuator to an explicit state.
    Set { actuator: ActuatorId, on: bool },
}

/// Result of a command execution.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandResult {
    Probe(ProbeReport),
    Snapshot(StatusSnapshot),
    Actuator { actuator: ActuatorId, on: bool },
}

impl CommandResult {
    /// Connection state, for probe results.
    pub fn connection(&self) -> Option<ConnectionState> {
        match self {
            Self::Probe(report) => Some(report.state),
            _ => None,
        }
    }
}
