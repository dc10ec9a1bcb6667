//! Idle status view over the sensor model.

use super::OverlayUi;
use crate::display::StatusView;
use crate::sensors::{SensorSnapshot, SharedSensorModel};
use std::sync::Arc;

/// Formats the one-line sensor status and hands it to the status bar.
pub struct SensorStatusView {
    model: SharedSensorModel,
    ui: Arc<dyn OverlayUi>,
}

impl SensorStatusView {
    pub fn new(model: SharedSensorModel, ui: Arc<dyn OverlayUi>) -> Self {
        Self { model, ui }
    }

    fn format(snapshot: &SensorSnapshot) -> String {
        format!(
            "Door {} | Motion {} | {:.1} C | Switch {}",
            if snapshot.contact_open { "open" } else { "closed" },
            if snapshot.occupied { "yes" } else { "no" },
            snapshot.temperature_c,
            if snapshot.switch_on { "on" } else { "off" },
        )
    }
}

impl StatusView for SensorStatusView {
    fn attached(&self) -> bool {
        self.ui.has_display()
    }

    fn redraw(&self) {
        let snapshot = self.model.snapshot();
        self.ui.show_status_bar(&Self::format(&snapshot), "⌂");
    }
}
