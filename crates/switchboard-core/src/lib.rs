//! Connection and actuator-state reconciliation for switchboard relay boards.
//!
//! Sits between `switchboard-api` and the front ends:
//!
//! - **[`Controller`]**: Central facade. [`probe()`](Controller::probe) runs
//!   the connectivity strategy chain and publishes a [`ConnectionState`];
//!   [`sync()`](Controller::sync) pulls the device status and reconciles it
//!   into the store; [`toggle()`](Controller::toggle) flips an actuator
//!   optimistically and rolls back when the device does not confirm.
//!   [`Controller::oneshot()`](Controller::oneshot) runs a single CLI request
//!   without background work.
//!
//! - **[`ActuatorStore`]**: Reactive flag storage on a `tokio::sync::watch`
//!   channel, with per-actuator command locks and a generation guard so a
//!   stale status pull never overwrites a newer command.
//!
//! - **[`StateStream`]**: Subscription handle for actuator flags.
//!
//! - **[`Command`]**: Typed operation requests routed through
//!   [`Controller::execute()`](Controller::execute).
//!
//! - **Domain model** ([`model`]): [`ActuatorId`], [`ActuatorState`],
//!   [`StatusSnapshot`] (the decoded `Key:0|1` status line) and
//!   [`DeviceEndpoint`].

pub mod command;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod error;
pub mod event;
pub mod model;
pub mod probe;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::DeviceConfig;
pub use confirm::{AutoConfirm, Confirm, ConfirmFn, Decline};
pub use controller::Controller;
pub use error::CoreError;
pub use event::ControllerEvent;
pub use probe::{ProbeReport, ProbeStrategy, Prober};
pub use store::{ActuatorStore, ApplyReport};
pub use stream::{StateStream, StateWatchStream};

pub use model::{
    ActuatorId, ActuatorState, ConnectionState, DeviceEndpoint, StatusSnapshot,
};
