// ── Device endpoint ──
//
// Host + port of the single board this controller talks to. The host is
// free-form (IP or hostname); the only validation is that it is non-empty
// and yields a usable URL.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

/// Default HTTP port of the board's web server.
pub const DEFAULT_PORT: u16 = 80;

/// Where the device lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEndpoint {
    host: String,
    port: u16,
}

impl DeviceEndpoint {
    /// Endpoint on the default port.
    pub fn new(host: impl AsRef<str>) -> Result<Self, CoreError> {
        Self::with_port(host, DEFAULT_PORT)
    }

    pub fn with_port(host: impl AsRef<str>, port: u16) -> Result<Self, CoreError> {
        let host = host.as_ref().trim();
        let host = host
            .strip_prefix("http://")
            .unwrap_or(host)
            .trim_end_matches('/');

        if host.is_empty() {
            return Err(CoreError::InvalidEndpoint {
                reason: "device address cannot be empty".into(),
            });
        }

        // Accept "host:port" as typed into an address field.
        let (host, port) = match host.split_once(':') {
            Some((name, p)) if !p.contains(':') => match p.parse::<u16>() {
                Ok(parsed) => (name, parsed),
                Err(_) => (host, port),
            },
            _ => (host, port),
        };

        let endpoint = Self {
            host: host.to_owned(),
            port,
        };
        endpoint.base_url()?;
        Ok(endpoint)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Root URL of the device, e.g. `http://10.0.0.42/`.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        // Bare IPv6 literals need brackets inside a URL authority.
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        let url = Url::parse(&format!("http://{host}:{}/", self.port)).map_err(|e| {
            CoreError::InvalidEndpoint {
                reason: format!("'{}' is not a usable address: {e}", self.host),
            }
        })?;

        if url.path() != "/" || url.query().is_some() {
            return Err(CoreError::InvalidEndpoint {
                reason: format!("'{}' must be a bare host, not a URL path", self.host),
            });
        }

        Ok(url)
    }
}

impl Default for DeviceEndpoint {
    /// Address the board uses when it runs its own access point.
    fn default() -> Self {
        Self {
            host: "192.168.4.1".into(),
            port: DEFAULT_PORT,
        }
    }
}

impl std::fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.port == DEFAULT_PORT {
            write!(f, "{}", self.host)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
