// ── Runtime device configuration ──
//
// These types describe *how* to talk to a relay board: where it is and how
// patient to be. They never touch disk; the CLI builds a `DeviceConfig`
// (usually through switchboard-config) and hands it in.

use std::time::Duration;

use crate::model::DeviceEndpoint;
use crate::probe::ProbeStrategy;

/// Configuration for controlling a single device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device address. Can be changed later with `Controller::set_endpoint`.
    pub endpoint: DeviceEndpoint,
    /// Bound for every request (probe, status, command).
    pub timeout: Duration,
    /// Status poll period while connected. `None` disables polling.
    pub poll_interval: Option<Duration>,
    /// Delay before the status pull that follows a successful connect.
    /// `None` disables that pull.
    pub settle_delay: Option<Duration>,
    /// Probe strategies, tried in order.
    pub probe_chain: Vec<ProbeStrategy>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            endpoint: DeviceEndpoint::default(),
            timeout: Duration::from_secs(5),
            poll_interval: Some(Duration::from_secs(10)),
            settle_delay: Some(Duration::from_millis(500)),
            probe_chain: vec![ProbeStrategy::Direct, ProbeStrategy::CacheBusted],
        }
    }
}

impl DeviceConfig {
    /// Defaults pointed at `endpoint`.
    pub fn for_endpoint(endpoint: DeviceEndpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }
}
