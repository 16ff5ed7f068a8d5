//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};

use switchboard_core::{ActuatorId, AutoConfirm, Confirm};

use crate::cli::{ActuatorArg, GlobalOpts};
use crate::error::CliError;

impl From<ActuatorArg> for ActuatorId {
    fn from(arg: ActuatorArg) -> Self {
        match arg {
            ActuatorArg::LightRoom1 => Self::LightRoom1,
            ActuatorArg::LightRoom2 => Self::LightRoom2,
            ActuatorArg::Pump => Self::Pump,
        }
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Interactive {
        reason: e.to_string(),
    }
}

/// Terminal prompt used when the device is not known to be connected.
///
/// Declines without asking when stdin is not a terminal.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if !io::stdin().is_terminal() {
            tracing::debug!(prompt, "not a terminal, declining");
            return false;
        }
        match confirm(prompt, false) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "confirmation prompt failed");
                false
            }
        }
    }
}

/// The confirmation policy selected by `--yes`.
pub fn confirmer(global: &GlobalOpts) -> Box<dyn Confirm> {
    if global.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirm)
    }
}
