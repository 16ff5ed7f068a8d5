// Liveness endpoints
//
// Neither call inspects the response body: only "did the device answer"
// matters. The cache-busted variant appends a unique query so that no
// intermediate cache can answer on the device's behalf.

use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;

/// Outcome of a liveness request that reached the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status the device answered with.
    pub status: u16,
}

impl DeviceClient {
    /// Direct liveness check.
    ///
    /// `GET /`
    ///
    /// Any HTTP response counts as reachable, whatever its status; only
    /// transport failures are errors.
    pub async fn ping(&self) -> Result<ProbeResponse, Error> {
        let url = self.url("/")?;
        let resp = self.send_get(url).await?;
        let status = resp.status().as_u16();
        debug!(status, "device answered direct probe");
        Ok(ProbeResponse { status })
    }

    /// Cache-busted liveness check.
    ///
    /// `GET /?t={nonce}`
    ///
    /// Stricter than [`ping`](Self::ping): the device must answer with 2xx.
    pub async fn ping_cache_busted(&self, nonce: u64) -> Result<ProbeResponse, Error> {
        let mut url = self.url("/")?;
        url.query_pairs_mut().append_pair("t", &nonce.to_string());
        let resp = self.get_success(url).await?;
        let status = resp.status().as_u16();
        debug!(status, nonce, "device answered cache-busted probe");
        Ok(ProbeResponse { status })
    }
}
