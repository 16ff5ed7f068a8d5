// Shared transport configuration for building reqwest::Client instances.
//
// Relay boards speak plain HTTP on the local network, so there is no TLS or
// cookie handling here; only timeouts and proxy bypass matter.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("switchboard/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Bound applied to every request (connect + response).
    pub timeout: Duration,
    /// Route requests through the system proxy. Off by default: the device
    /// lives on the LAN and proxies usually cannot reach it.
    pub use_system_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            use_system_proxy: false,
        }
    }
}

impl TransportConfig {
    /// Config with the given request timeout and no proxy.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}
