//! Shared handle to the sensor model and the engine-facing adapters.
//!
//! The engine's transport may run on its own thread, so every path into
//! [`SensorModel`] goes through one mutex. The orchestration loop and the
//! engine callbacks are the only two parties; contention is a handful of
//! lock acquisitions per second.

use super::model::{SensorModel, SensorSnapshot};
use crate::config::{DriftPolicy, TemperatureConfig};
use crate::display::DisplayScheduler;
use crate::engine::{SwitchSink, TemperatureSource};
use log::debug;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable, mutex-guarded handle to the sensor model.
#[derive(Clone)]
pub struct SharedSensorModel {
    inner: Arc<Mutex<SensorModel>>,
}

impl SharedSensorModel {
    pub fn new(config: &TemperatureConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SensorModel::new(config))),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, SensorModel> {
        self.inner.lock()
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        self.inner.lock().snapshot()
    }
}

/// Pull adapter the engine reads temperature through.
///
/// This is the single place the drift policy is interpreted: `OnRead`
/// advances the triangle wave on every pull, `OnTimer` leaves advancement
/// to the periodic sensor fire in the loop.
pub struct ModelTemperatureSource {
    model: SharedSensorModel,
    policy: DriftPolicy,
}

impl ModelTemperatureSource {
    pub fn new(model: SharedSensorModel, policy: DriftPolicy) -> Self {
        Self { model, policy }
    }
}

impl TemperatureSource for ModelTemperatureSource {
    fn current_celsius(&self) -> f32 {
        match self.policy {
            DriftPolicy::OnRead => self.model.lock().advance_temperature(),
            DriftPolicy::OnTimer => self.model.lock().read_temperature(),
        }
    }
}

/// Write hook mirroring engine-owned switch changes into the display
/// shadow.
pub struct ModelSwitchSink {
    model: SharedSensorModel,
    display: Arc<DisplayScheduler>,
}

impl ModelSwitchSink {
    pub fn new(model: SharedSensorModel, display: Arc<DisplayScheduler>) -> Self {
        Self { model, display }
    }
}

impl SwitchSink for ModelSwitchSink {
    fn switch_changed(&self, on: bool) {
        self.model.lock().set_switch(on);
        self.display.request_redraw();
        debug!("Switch shadow updated: on={on}");
    }
}
