// switchboard-api: Async HTTP client for relay-board devices (probe, status, on/off)

pub mod actuators;
pub mod client;
pub mod error;
pub mod probe;
pub mod status;
pub mod transport;

pub use client::DeviceClient;
pub use error::Error;
pub use probe::ProbeResponse;
pub use transport::TransportConfig;
