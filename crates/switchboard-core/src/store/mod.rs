// ── Actuator state store ──
//
// Single-writer storage for actuator flags with push-based change
// notification and per-actuator command serialization.

mod actuator_store;

pub use actuator_store::{ActuatorStore, ApplyReport, CommandTicket, SyncTicket};
