//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod actuators;
pub mod config_cmd;
pub mod probe;
pub mod status;
pub mod util;
pub mod watch;

use switchboard_core::DeviceConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output::Output;

use self::actuators::Switch;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    device: DeviceConfig,
    global: &GlobalOpts,
    out: &Output,
) -> Result<(), CliError> {
    match cmd {
        Command::Probe => probe::handle(device, out).await,
        Command::Status => status::handle(device, global, out).await,
        Command::Toggle { actuator } => {
            actuators::handle(device, actuator.into(), Switch::Toggle, global, out).await
        }
        Command::On { actuator } => {
            actuators::handle(device, actuator.into(), Switch::Set(true), global, out).await
        }
        Command::Off { actuator } => {
            actuators::handle(device, actuator.into(), Switch::Set(false), global, out).await
        }
        Command::Watch(args) => watch::handle(device, args, out).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not talk to a device".into(),
        )),
    }
}
