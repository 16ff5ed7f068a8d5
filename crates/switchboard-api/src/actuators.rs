// Actuator command endpoints
//
// `/{name}/on` and `/{name}/off` are idempotent: they encode the desired
// state, not a toggle.

use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;

/// Device-relative command path for driving `name` to `on`.
pub fn command_path(name: &str, on: bool) -> Result<String, Error> {
    if name.is_empty() || name.contains(['/', '?', '#']) {
        return Err(Error::InvalidActuator(name.to_owned()));
    }
    let verb = if on { "on" } else { "off" };
    Ok(format!("{name}/{verb}"))
}

impl DeviceClient {
    /// Drive an actuator to the given state.
    ///
    /// `GET /{name}/on` or `GET /{name}/off`
    ///
    /// Any 2xx response is success; the body is ignored.
    pub async fn set_actuator(&self, name: &str, on: bool) -> Result<(), Error> {
        let url = self.url(&command_path(name, on)?)?;
        debug!(actuator = name, on, "sending actuator command");
        let _ = self.get_success(url).await?;
        Ok(())
    }
}
