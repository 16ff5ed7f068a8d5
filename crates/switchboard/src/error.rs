//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use switchboard_config::ConfigError;
use switchboard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DECLINED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the device at {endpoint}: {reason}")]
    #[diagnostic(
        code(switchboard::connection_failed),
        help(
            "Check that the board is powered and on the same network.\n\
             Address: {endpoint}\n\
             Try: switchboard probe --host <address>"
        )
    )]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Request timed out after {timeout:?}")]
    #[diagnostic(
        code(switchboard::timeout),
        help("Increase timeout with --timeout or check that the board is responsive.")
    )]
    Timeout { timeout: Duration },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device returned HTTP {status} for {path}")]
    #[diagnostic(code(switchboard::http_status))]
    DeviceStatus { status: u16, path: String },

    #[error("Device sent an unreadable status line: {reason}")]
    #[diagnostic(
        code(switchboard::bad_status),
        help("Expected comma-separated Key:0|1 pairs, got: {body}")
    )]
    BadStatus { body: String, reason: String },

    #[error("Failed to switch {actuator}")]
    #[diagnostic(
        code(switchboard::command_failed),
        help("{actuator} was restored to its previous state.")
    )]
    CommandFailed {
        actuator: String,
        #[source]
        source: Box<CliError>,
    },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("{operation} cancelled: the device is not connected")]
    #[diagnostic(
        code(switchboard::declined),
        help(
            "Re-run with --yes (-y) to try anyway, or check the address with: switchboard probe"
        )
    )]
    Declined { operation: String },

    #[error("{operation} was superseded by a newer request")]
    #[diagnostic(code(switchboard::cancelled))]
    Cancelled { operation: String },

    #[error("Prompt failed: {reason}")]
    #[diagnostic(
        code(switchboard::interactive),
        help("Pass the value as a flag in non-interactive contexts.")
    )]
    Interactive { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(switchboard::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(switchboard::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: switchboard config set-host <address> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(switchboard::config))]
    Config(Box<ConfigError>),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(switchboard::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(switchboard::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode config: {0}")]
    #[diagnostic(code(switchboard::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Declined { .. } => exit_code::DECLINED,
            Self::Validation { .. } | Self::Interactive { .. } => exit_code::USAGE,
            Self::CommandFailed { source, .. } => source.exit_code(),
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport { url, reason } => CliError::ConnectionFailed {
                endpoint: url,
                reason,
            },

            CoreError::Timeout { timeout } => CliError::Timeout { timeout },

            CoreError::Http { status, path } => CliError::DeviceStatus { status, path },

            CoreError::Decode { body, reason } => CliError::BadStatus { body, reason },

            CoreError::CommandFailed { actuator, source } => CliError::CommandFailed {
                actuator: actuator.to_string(),
                source: Box::new(CliError::from(*source)),
            },

            CoreError::UserDeclined { operation } => CliError::Declined { operation },

            CoreError::Cancelled { operation } => CliError::Cancelled {
                operation: operation.into(),
            },

            CoreError::InvalidEndpoint { reason } => CliError::Validation {
                field: "host".into(),
                reason,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
