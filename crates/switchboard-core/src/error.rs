// ── Core error types ──
//
// User-facing errors from switchboard-core. Consumers never see reqwest
// errors directly: the `From<switchboard_api::Error>` impl folds transport
// failures into the reconciliation error kinds.

use std::time::Duration;

use thiserror::Error;

use crate::model::ActuatorId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Device at {url} is unreachable: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to device timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    // ── Device errors ────────────────────────────────────────────────
    #[error("Device returned HTTP {status} for {path}")]
    Http { status: u16, path: String },

    #[error("Malformed status line {body:?}: {reason}")]
    Decode { body: String, reason: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Failed to control {actuator}: {source}")]
    CommandFailed {
        actuator: ActuatorId,
        #[source]
        source: Box<CoreError>,
    },

    #[error("{operation} skipped: device is not connected and confirmation was declined")]
    UserDeclined { operation: String },

    #[error("{operation} superseded by a newer request")]
    Cancelled { operation: &'static str },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid device endpoint: {reason}")]
    InvalidEndpoint { reason: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` when the device never answered (timeout, refused,
    /// DNS). These are the failures that flip the connection to
    /// `Disconnected`.
    pub fn is_transport_level(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::CommandFailed { source, .. } => source.is_transport_level(),
            _ => false,
        }
    }

    /// Actuator named by a command failure, if any.
    pub fn actuator(&self) -> Option<ActuatorId> {
        match self {
            Self::CommandFailed { actuator, .. } => Some(*actuator),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<switchboard_api::Error> for CoreError {
    fn from(err: switchboard_api::Error) -> Self {
        match err {
            switchboard_api::Error::Transport(e) => CoreError::Transport {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            switchboard_api::Error::Timeout { timeout } => CoreError::Timeout { timeout },
            switchboard_api::Error::Http { status, path } => CoreError::Http { status, path },
            switchboard_api::Error::InvalidUrl(e) => CoreError::InvalidEndpoint {
                reason: e.to_string(),
            },
            switchboard_api::Error::ClientBuild(msg) => CoreError::Internal(msg),
            switchboard_api::Error::InvalidActuator(name) => {
                CoreError::Internal(format!("actuator name {name:?} is not a path segment"))
            }
        }
    }
}
