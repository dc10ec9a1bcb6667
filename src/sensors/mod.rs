//! Simulated sensor state.
//!
//! This module owns the state of the four virtual services (contact,
//! occupancy, temperature, switch shadow) and the adapters through which
//! the accessory engine reaches it.

pub mod model;
pub mod shared;

pub use model::{SensorModel, SensorSnapshot};
pub use shared::{ModelSwitchSink, ModelTemperatureSource, SharedSensorModel};
