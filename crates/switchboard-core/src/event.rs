//! Controller event system.
//!
//! Every observable outcome (connection transitions, reconciled state,
//! failed pulls, command results) is broadcast as a [`ControllerEvent`].
//! Front ends render these; the core never writes to a terminal itself.

use serde::Serialize;

use crate::model::{ActuatorId, ActuatorState, ConnectionState, DeviceEndpoint};

/// Events emitted by a [`Controller`](crate::Controller).
///
/// Serializable for logging and `--output json`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ControllerEvent {
    /// The prober published a new connection state.
    ConnectionChanged { state: ConnectionState },
    /// A status pull was applied.
    StateReconciled {
        state: ActuatorState,
        /// Actuators left untouched because a command raced the pull.
        skipped: Vec<ActuatorId>,
    },
    /// A status pull failed; actuator state is unchanged.
    SyncFailed { reason: String },
    /// The device confirmed a command.
    CommandSucceeded {
        actuator: ActuatorId,
        on: bool,
        state: ActuatorState,
    },
    /// A command failed and was rolled back.
    CommandFailed {
        actuator: ActuatorId,
        reason: String,
        state: ActuatorState,
    },
    /// The controller now talks to a different device.
    EndpointChanged { endpoint: DeviceEndpoint },
}
