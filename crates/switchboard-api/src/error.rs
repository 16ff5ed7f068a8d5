use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `switchboard-api` crate.
///
/// Covers every failure mode of the device's HTTP surface. `switchboard-core`
/// maps these into the reconciliation error kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request did not complete within its bounded timeout.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Device ──────────────────────────────────────────────────────
    /// Device answered with a non-2xx status.
    #[error("Device returned HTTP {status} for {path}")]
    Http { status: u16, path: String },

    /// Actuator name cannot be used as a path segment.
    #[error("Invalid actuator name: {0:?}")]
    InvalidActuator(String),
}

impl Error {
    /// Classify a `reqwest` error, folding timeouts into [`Error::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout }
        } else {
            Self::Transport(err)
        }
    }

    /// Returns `true` if the request never produced an HTTP response
    /// (timeout, connection refused, DNS, TLS). Such failures say the device
    /// is unreachable; an [`Error::Http`] says it is reachable but unhappy.
    pub fn is_transport_level(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_status() && !e.is_decode(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status code returned by the device, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
