//! `switchboard toggle|on|off <actuator>`.

use serde::Serialize;

use switchboard_core::{ActuatorId, ActuatorState, AutoConfirm, Controller, DeviceConfig};

use crate::cli::GlobalOpts;
use crate::commands::util;
use crate::error::CliError;
use crate::output::{self, Output};

/// What to do with the actuator.
#[derive(Debug, Clone, Copy)]
pub enum Switch {
    Toggle,
    Set(bool),
}

#[derive(Serialize)]
struct SwitchView {
    actuator: ActuatorId,
    on: bool,
    state: ActuatorState,
}

pub async fn handle(
    device: DeviceConfig,
    actuator: ActuatorId,
    switch: Switch,
    global: &GlobalOpts,
    out: &Output,
) -> Result<(), CliError> {
    let confirm = util::confirmer(global);
    let out_copy = *out;

    let view = Controller::oneshot(device, |ctrl| async move {
        let spinner = out_copy.spinner(&format!("Probing {}...", ctrl.endpoint()));
        ctrl.probe().await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let on = match switch {
            // Flip from the board's real value. Confirmation, if any, was
            // given for the pull.
            Switch::Toggle => {
                ctrl.sync(confirm.as_ref()).await?;
                ctrl.toggle(actuator, &AutoConfirm).await?
            }
            Switch::Set(on) => ctrl.set(actuator, on, confirm.as_ref()).await?,
        };

        Ok(SwitchView {
            actuator,
            on,
            state: ctrl.state(),
        })
    })
    .await?;

    tracing::info!(%actuator, on = view.on, "actuator switched");

    let color = out.color;
    let rendered = output::render_single(
        out.format,
        &view,
        |v| format!("{} -> {}", v.actuator.label(), output::on_off(v.on, color)),
        |v| if v.on { "on".into() } else { "off".into() },
    )?;
    out.print(&rendered);
    Ok(())
}
