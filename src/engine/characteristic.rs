//! Characteristic state cells for the simulated engine.
//!
//! Thread-safe value cells with change-version counters. The simulated
//! controller compares versions between polls to detect state
//! synchronization, the same way a real stack drives subscription
//! updates.

use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU32, Ordering};

/// Boolean characteristic (contact open, occupied, switch on).
pub struct BinaryCharacteristic {
    state: AtomicBool,
    version: AtomicU32,
}

impl BinaryCharacteristic {
    pub fn new(initial: bool) -> Self {
        Self {
            state: AtomicBool::new(initial),
            version: AtomicU32::new(0),
        }
    }

    pub fn get(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }

    /// Set the value. The version only advances when the value changed.
    pub fn set(&self, value: bool) {
        let old = self.state.swap(value, Ordering::SeqCst);
        if old != value {
            self.version.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Flip the value and return the new one. Always advances the version.
    pub fn toggle(&self) -> bool {
        let old = self.state.fetch_xor(true, Ordering::SeqCst);
        self.version.fetch_add(1, Ordering::SeqCst);
        !old
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }
}

/// Temperature characteristic, stored in centidegrees Celsius.
///
/// 21.5°C is stored as 2150; the integer cell keeps the atomic cheap and
/// matches how accessory protocols put temperature on the wire.
pub struct TemperatureCharacteristic {
    centidegrees: AtomicI16,
    version: AtomicU32,
}

impl TemperatureCharacteristic {
    pub fn new(initial_celsius: f32) -> Self {
        Self {
            centidegrees: AtomicI16::new((initial_celsius * 100.0) as i16),
            version: AtomicU32::new(0),
        }
    }

    pub fn get_celsius(&self) -> f32 {
        self.centidegrees.load(Ordering::SeqCst) as f32 / 100.0
    }

    pub fn set_celsius(&self, celsius: f32) {
        let value = (celsius * 100.0) as i16;
        let old = self.centidegrees.swap(value, Ordering::SeqCst);
        if old != value {
            self.version.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_set_advances_version_on_change_only() {
        let cell = BinaryCharacteristic::new(false);
        assert_eq!(cell.version(), 0);

        cell.set(true);
        assert!(cell.get());
        assert_eq!(cell.version(), 1);

        // Same value, no change observed.
        cell.set(true);
        assert_eq!(cell.version(), 1);

        cell.set(false);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn test_binary_toggle_returns_new_value() {
        let cell = BinaryCharacteristic::new(false);
        assert!(cell.toggle());
        assert!(!cell.toggle());
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn test_temperature_round_trips_centidegrees() {
        let cell = TemperatureCharacteristic::new(22.0);
        assert_eq!(cell.get_celsius(), 22.0);

        cell.set_celsius(27.5);
        assert_eq!(cell.get_celsius(), 27.5);
        assert_eq!(cell.version(), 1);

        cell.set_celsius(27.5);
        assert_eq!(cell.version(), 1);
    }
}
