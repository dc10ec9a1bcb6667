//! Accessory protocol engine boundary.
//!
//! The pairing handshake, session persistence and characteristic dispatch
//! live behind these traits; the harness only starts/stops the engine,
//! polls pairing status and pushes/pulls service state through narrow
//! handles. [`SimulatedEngine`] is the in-process stand-in that makes the
//! harness run without any real protocol stack.

pub mod characteristic;
pub mod simulated;

pub use simulated::SimulatedEngine;

use crate::error::Result;
use std::sync::Arc;

/// Pull capability for on-demand temperature reads.
///
/// Injected into the engine at construction instead of registering a raw
/// read callback; the engine calls it whenever a controller asks for the
/// current temperature.
pub trait TemperatureSource: Send + Sync {
    fn current_celsius(&self) -> f32;
}

/// Write hook invoked after the engine has applied a switch change
/// requested by a controller.
///
/// The engine owns the authoritative switch state; implementations only
/// mirror it (display shadow, relays in a real device).
pub trait SwitchSink: Send + Sync {
    fn switch_changed(&self, on: bool);
}

/// Contact sensor service handle (door/window open state).
pub trait ContactService: Send + Sync {
    fn set_open(&self, open: bool);
    fn is_open(&self) -> bool;
}

/// Occupancy sensor service handle (motion/presence).
pub trait OccupancyService: Send + Sync {
    fn set_occupied(&self, occupied: bool);
    fn is_occupied(&self) -> bool;
}

/// Temperature sensor service handle (push side; pulls go through
/// [`TemperatureSource`]).
pub trait TemperatureService: Send + Sync {
    fn set_temperature(&self, celsius: f32);
}

/// Switch service handle. Read-only from the harness side.
pub trait SwitchService: Send + Sync {
    fn is_on(&self) -> bool;
}

/// The engine contract the harness consumes.
pub trait ProtocolEngine: Send + Sync {
    fn start(&self) -> Result<()>;
    fn stop(&self);
    fn is_paired(&self) -> bool;
    fn setup_code(&self) -> String;
    fn setup_payload(&self) -> Option<String>;
    fn contact(&self) -> Arc<dyn ContactService>;
    fn occupancy(&self) -> Arc<dyn OccupancyService>;
    fn temperature(&self) -> Arc<dyn TemperatureService>;
    fn switch(&self) -> Arc<dyn SwitchService>;
}
