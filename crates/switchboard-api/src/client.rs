// Device HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, per-request timeouts and
// status classification. Endpoint groups (probe, status, actuators) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for a single relay-board device.
///
/// Every request is a `GET` bounded by the configured timeout. Non-2xx
/// responses surface as [`Error::Http`]; timeouts as [`Error::Timeout`].
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl DeviceClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the device root, e.g. `http://10.0.0.42/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve a device-relative path against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a bounded `GET` and return the response regardless of status.
    pub(crate) async fn send_get(&self, url: Url) -> Result<reqwest::Response, Error> {
        debug!("GET {}", url);

        self.http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))
    }

    /// Send a bounded `GET`, requiring a 2xx status.
    pub(crate) async fn get_success(&self, url: Url) -> Result<reqwest::Response, Error> {
        let path = url.path().to_owned();
        let resp = self.send_get(url).await?;
        let status = resp.status();

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                path,
            });
        }

        Ok(resp)
    }

    /// Send a bounded `GET`, requiring a 2xx status, and read the body as text.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, Error> {
        let resp = self.get_success(url).await?;
        resp.text()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))
    }
}
