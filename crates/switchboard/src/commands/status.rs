//! `switchboard status`: probe, pull the status line, show actuator states.

use chrono::Local;
use serde::Serialize;
use tabled::Tabled;

use switchboard_core::{
    ActuatorId, ActuatorState, ConnectionState, Controller, DeviceConfig, DeviceEndpoint,
    StatusSnapshot,
};

use crate::cli::GlobalOpts;
use crate::commands::util;
use crate::error::CliError;
use crate::output::{self, Output};

#[derive(Serialize)]
struct StatusView {
    endpoint: DeviceEndpoint,
    connection: ConnectionState,
    actuators: ActuatorState,
    /// Every key the device reported, including ones with no actuator.
    snapshot: StatusSnapshot,
}

#[derive(Tabled)]
pub(crate) struct ActuatorRow {
    #[tabled(rename = "Actuator")]
    label: &'static str,
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "State")]
    state: String,
}

pub async fn handle(device: DeviceConfig, global: &GlobalOpts, out: &Output) -> Result<(), CliError> {
    let endpoint = device.endpoint.clone();
    let confirm = util::confirmer(global);
    let out_copy = *out;

    let (connection, snapshot, actuators) = Controller::oneshot(device, |ctrl| async move {
        let spinner = out_copy.spinner(&format!("Probing {}...", ctrl.endpoint()));
        let connection = ctrl.probe().await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let snapshot = ctrl.sync(confirm.as_ref()).await?;
        Ok((connection, snapshot, ctrl.state()))
    })
    .await?;

    let view = StatusView {
        endpoint,
        connection,
        actuators,
        snapshot,
    };
    let color = out.color;
    let rendered = output::render_single(
        out.format,
        &view,
        |v| detail(v, color),
        |v| plain(&v.actuators),
    )?;
    out.print(&rendered);
    Ok(())
}

pub(crate) fn actuator_rows(state: &ActuatorState, color: bool) -> Vec<ActuatorRow> {
    ActuatorId::ALL
        .iter()
        .map(|&id| ActuatorRow {
            label: id.label(),
            key: id.as_str(),
            state: output::on_off(state.get(id), color),
        })
        .collect()
}

fn detail(view: &StatusView, color: bool) -> String {
    let mut out = format!(
        "{}  {}\n{}\nall: {}",
        output::connection_indicator(view.connection, color),
        view.endpoint,
        output::render_table(&actuator_rows(&view.actuators, color)),
        output::on_off(view.actuators.all(), color),
    );

    let extra: Vec<String> = view
        .snapshot
        .entries()
        .filter(|(key, _)| key.parse::<ActuatorId>().is_err())
        .map(|(key, on)| format!("{key}={}", if on { "1" } else { "0" }))
        .collect();
    if !extra.is_empty() {
        out.push_str(&format!("\nother keys: {}", extra.join(", ")));
    }

    let updated = view.snapshot.received_at().with_timezone(&Local);
    out.push_str(&format!("\nLast updated: {}", updated.format("%Y-%m-%d %H:%M:%S")));
    out
}

fn plain(state: &ActuatorState) -> String {
    state
        .iter()
        .map(|(id, on)| format!("{id}={}", if on { "on" } else { "off" }))
        .chain(std::iter::once(format!(
            "all={}",
            if state.all() { "on" } else { "off" }
        )))
        .collect::<Vec<_>>()
        .join("\n")
}
