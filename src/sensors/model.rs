//! Simulated sensor state for the virtual accessory.
//!
//! All four services live in one owned struct; the orchestration loop is
//! the only steady-state mutator, and the engine thread reaches it through
//! the shared handle in [`super::shared`].

use crate::config::TemperatureConfig;

/// State of the four simulated services.
///
/// The switch value is a local shadow for display purposes only; the
/// engine owns the authoritative switch state and pushes changes in
/// through its write hook.
pub struct SensorModel {
    contact_open: bool,
    occupied: bool,
    switch_on: bool,
    temperature_c: f32,
    rising: bool,
    min_c: f32,
    max_c: f32,
    step_c: f32,
}

/// Consistent copy of the model for status rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub contact_open: bool,
    pub occupied: bool,
    pub switch_on: bool,
    pub temperature_c: f32,
}

impl SensorModel {
    pub fn new(config: &TemperatureConfig) -> Self {
        Self {
            contact_open: false,
            occupied: false,
            switch_on: false,
            temperature_c: config.initial_c,
            rising: true,
            min_c: config.min_c,
            max_c: config.max_c,
            step_c: config.step_c,
        }
    }

    /// Flip the contact sensor and return the new value.
    pub fn toggle_contact(&mut self) -> bool {
        self.contact_open = !self.contact_open;
        self.contact_open
    }

    /// Flip the occupancy sensor and return the new value.
    pub fn toggle_occupancy(&mut self) -> bool {
        self.occupied = !self.occupied;
        self.occupied
    }

    /// Update the local shadow of the engine-owned switch state.
    pub fn set_switch(&mut self, on: bool) {
        self.switch_on = on;
    }

    /// Advance the triangle-wave drift by one step and return the new
    /// temperature.
    ///
    /// The direction flips in the same call that reaches a bound, so the
    /// value never leaves `[min_c, max_c]`.
    pub fn advance_temperature(&mut self) -> f32 {
        if self.rising {
            self.temperature_c += self.step_c;
            if self.temperature_c >= self.max_c {
                self.rising = false;
            }
        } else {
            self.temperature_c -= self.step_c;
            if self.temperature_c <= self.min_c {
                self.rising = true;
            }
        }
        self.temperature_c
    }

    /// Current temperature without advancing the drift.
    pub fn read_temperature(&self) -> f32 {
        self.temperature_c
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            contact_open: self.contact_open,
            occupied: self.occupied,
            switch_on: self.switch_on,
            temperature_c: self.temperature_c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn model() -> SensorModel {
        SensorModel::new(&Config::default().temperature)
    }

    #[test]
    fn test_contact_toggle_is_involution() {
        let mut model = model();
        let first = model.toggle_contact();
        assert!(first);
        let second = model.toggle_contact();
        assert!(!second);
        assert!(!model.snapshot().contact_open);
    }

    #[test]
    fn test_occupancy_toggle_returns_new_value() {
        let mut model = model();
        assert!(model.toggle_occupancy());
        assert!(model.snapshot().occupied);
        assert!(!model.toggle_occupancy());
    }

    #[test]
    fn test_temperature_stays_within_bounds() {
        let mut model = model();
        for _ in 0..1000 {
            let value = model.advance_temperature();
            assert!((18.0..=28.0).contains(&value), "out of bounds: {value}");
        }
    }

    #[test]
    fn test_drift_direction_flips_at_bounds() {
        let mut model = model();
        // 22.0 rising; 12 steps of 0.5 reach the 28.0 ceiling.
        for _ in 0..12 {
            model.advance_temperature();
        }
        assert_eq!(model.read_temperature(), 28.0);
        assert!(!model.is_rising());

        // 20 more steps walk the full 10 degree span down to the floor.
        for _ in 0..20 {
            model.advance_temperature();
        }
        assert_eq!(model.read_temperature(), 18.0);
        assert!(model.is_rising());
    }

    #[test]
    fn test_read_does_not_advance_drift() {
        let mut model = model();
        model.advance_temperature();
        let observed = model.read_temperature();
        assert_eq!(model.read_temperature(), observed);
        assert_eq!(observed, 22.5);
    }

    #[test]
    fn test_switch_shadow_updates() {
        let mut model = model();
        model.set_switch(true);
        assert!(model.snapshot().switch_on);
        model.set_switch(false);
        assert!(!model.snapshot().switch_on);
    }
}
