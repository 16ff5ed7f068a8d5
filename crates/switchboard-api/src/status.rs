// Status endpoint
//
// Returns the raw status line; decoding into actuator flags belongs to
// switchboard-core.

use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;

impl DeviceClient {
    /// Fetch the device's encoded status line.
    ///
    /// `GET /status`
    ///
    /// Body format is `Key:0|1[,Key:0|1]*`, returned verbatim.
    pub async fn get_status_line(&self) -> Result<String, Error> {
        let url = self.url("status")?;
        debug!("fetching status line");
        self.get_text(url).await
    }
}
