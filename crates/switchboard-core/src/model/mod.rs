// ── Domain model ──
//
// Actuators, connection state, device endpoint and decoded status lines.

pub mod actuator;
pub mod connection;
pub mod endpoint;
pub mod status;

pub use actuator::{ActuatorId, ActuatorState};
pub use connection::ConnectionState;
pub use endpoint::DeviceEndpoint;
pub use status::StatusSnapshot;
