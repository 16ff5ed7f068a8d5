//! `switchboard watch`: follow the device until interrupted.
//!
//! Starts the full controller lifecycle (probe, post-connect pull, periodic
//! polling) and prints every controller event as it happens.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use switchboard_core::{ActuatorState, ConnectionState, Controller, ControllerEvent, DeviceConfig};

use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, Output};

#[derive(Serialize)]
struct EventLine<'a> {
    at: DateTime<Local>,
    #[serde(flatten)]
    event: &'a ControllerEvent,
}

pub async fn handle(mut device: DeviceConfig, args: WatchArgs, out: &Output) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        device.poll_interval = (secs > 0).then(|| Duration::from_secs(secs));
    }

    let controller = Controller::new(device)?;
    let mut events = controller.events();

    if !out.quiet && out.format == OutputFormat::Table {
        eprintln!("Watching {} (Ctrl-C to stop)", controller.endpoint());
    }

    let stop = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }
        }
    };
    tokio::pin!(stop);

    controller.start().await;

    let result = loop {
        tokio::select! {
            () = &mut stop => break Ok(()),
            event = events.recv() => match event {
                Ok(event) => {
                    if let Err(e) = print_event(&event, out) {
                        break Err(e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    controller.shutdown().await;
    result
}

fn print_event(event: &ControllerEvent, out: &Output) -> Result<(), CliError> {
    let line = EventLine {
        at: Local::now(),
        event,
    };

    let rendered = match out.format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(&line, true)?,
        OutputFormat::Table => text_line(&line, out.color),
        OutputFormat::Plain => text_line(&line, false),
    };
    out.print(&rendered);
    Ok(())
}

fn text_line(line: &EventLine<'_>, color: bool) -> String {
    let body = match line.event {
        ControllerEvent::ConnectionChanged { state } => {
            let indicator = output::connection_indicator(*state, color);
            if *state == ConnectionState::Disconnected {
                format!("{indicator} (status polling paused, restart watch to reconnect)")
            } else {
                indicator
            }
        }
        ControllerEvent::StateReconciled { state, skipped } => {
            let mut text = format!("status  {}", summary(state, color));
            if !skipped.is_empty() {
                let kept: Vec<String> = skipped.iter().map(ToString::to_string).collect();
                text.push_str(&format!(" (kept {})", kept.join(", ")));
            }
            text
        }
        ControllerEvent::SyncFailed { reason } => format!("status pull failed: {reason}"),
        ControllerEvent::CommandSucceeded { actuator, on, .. } => {
            format!("{actuator} -> {}", output::on_off(*on, color))
        }
        ControllerEvent::CommandFailed {
            actuator, reason, ..
        } => format!("{actuator} command failed: {reason}"),
        ControllerEvent::EndpointChanged { endpoint } => format!("now watching {endpoint}"),
        other => format!("{other:?}"),
    };
    format!("[{}] {body}", line.at.format("%H:%M:%S"))
}

fn summary(state: &ActuatorState, color: bool) -> String {
    state
        .iter()
        .map(|(id, on)| format!("{id}={}", output::on_off(on, color)))
        .chain(std::iter::once(format!(
            "all={}",
            output::on_off(state.all(), color)
        )))
        .collect::<Vec<_>>()
        .join(" ")
}
