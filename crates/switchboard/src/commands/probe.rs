//! `switchboard probe`: run the connectivity strategy chain.

use serde::Serialize;

use switchboard_core::{ConnectionState, Controller, DeviceConfig, DeviceEndpoint, ProbeReport};

use crate::error::CliError;
use crate::output::{self, Output};

#[derive(Serialize)]
struct ProbeView {
    endpoint: DeviceEndpoint,
    #[serde(flatten)]
    report: ProbeReport,
}

pub async fn handle(device: DeviceConfig, out: &Output) -> Result<(), CliError> {
    let endpoint = device.endpoint.clone();

    let spinner = out.spinner(&format!("Probing {endpoint}..."));
    let report = Controller::oneshot(device, |ctrl| async move { Ok(ctrl.probe_report().await) })
        .await?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let view = ProbeView { endpoint, report };
    let color = out.color;
    let rendered = output::render_single(
        out.format,
        &view,
        |v| detail(v, color),
        |v| v.report.state.to_string(),
    )?;
    out.print(&rendered);

    if view.report.state == ConnectionState::Connected {
        Ok(())
    } else {
        Err(CliError::ConnectionFailed {
            endpoint: view.endpoint.to_string(),
            reason: view
                .report
                .error
                .unwrap_or_else(|| "no probe strategy succeeded".into()),
        })
    }
}

fn detail(view: &ProbeView, color: bool) -> String {
    let mut lines = vec![format!(
        "{}  {}",
        output::connection_indicator(view.report.state, color),
        view.endpoint
    )];

    if let Some(strategy) = view.report.decided_by {
        let tried = view
            .report
            .attempted
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        lines.push(format!("  decided by: {strategy} (tried {tried})"));
    }
    if let Some(ref error) = view.report.error {
        lines.push(format!("  last error: {error}"));
    }
    lines.join("\n")
}
