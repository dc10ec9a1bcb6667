//! In-process simulation of the accessory protocol engine.
//!
//! Stands in for the real pairing/state-sync stack so the harness runs
//! with no hardware and no network. The simulated controller lives on its
//! own named thread, like a real stack's transport would, which keeps the
//! harness honest about synchronizing everything the engine can touch.

use super::characteristic::{BinaryCharacteristic, TemperatureCharacteristic};
use super::{
    ContactService, OccupancyService, ProtocolEngine, SwitchService, SwitchSink,
    TemperatureService, TemperatureSource,
};
use crate::clock::Clock;
use crate::config::{AccessoryConfig, SimulationConfig};
use crate::error::{HarnessError, Result};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

impl ContactService for BinaryCharacteristic {
    fn set_open(&self, open: bool) {
        self.set(open);
        debug!("[Engine] Contact characteristic updated: open={open}");
    }

    fn is_open(&self) -> bool {
        self.get()
    }
}

impl OccupancyService for BinaryCharacteristic {
    fn set_occupied(&self, occupied: bool) {
        self.set(occupied);
        debug!("[Engine] Occupancy characteristic updated: occupied={occupied}");
    }

    fn is_occupied(&self) -> bool {
        self.get()
    }
}

impl SwitchService for BinaryCharacteristic {
    fn is_on(&self) -> bool {
        self.get()
    }
}

impl TemperatureService for TemperatureCharacteristic {
    fn set_temperature(&self, celsius: f32) {
        self.set_celsius(celsius);
        debug!("[Engine] Temperature characteristic updated: {celsius:.1} C");
    }
}

/// Simulated accessory protocol engine.
///
/// Owns the four service characteristics (the switch authoritatively, the
/// sensors as mirrors of pushed state) and a simulated controller that
/// pairs after a configurable delay, pulls the temperature through the
/// injected [`TemperatureSource`] and issues switch writes through the
/// injected [`SwitchSink`].
pub struct SimulatedEngine {
    setup_code: String,
    setup_payload: Option<String>,
    pair_after: Option<Duration>,
    controller_poll: Duration,
    switch_toggle: Option<Duration>,
    clock: Arc<dyn Clock>,
    contact: Arc<BinaryCharacteristic>,
    occupancy: Arc<BinaryCharacteristic>,
    temperature: Arc<TemperatureCharacteristic>,
    switch: Arc<BinaryCharacteristic>,
    temperature_source: Arc<dyn TemperatureSource>,
    switch_sink: Arc<dyn SwitchSink>,
    paired: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    controller: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedEngine {
    /// Initialize the engine and register the four services.
    ///
    /// Fails when the accessory identity is unusable (malformed setup
    /// code, malformed QR payload) - the whole session aborts in that
    /// case, mirroring a real stack refusing to initialize.
    pub fn new(
        accessory: &AccessoryConfig,
        simulation: &SimulationConfig,
        clock: Arc<dyn Clock>,
        temperature_source: Arc<dyn TemperatureSource>,
        switch_sink: Arc<dyn SwitchSink>,
    ) -> Result<Self> {
        validate_setup_code(&accessory.setup_code)?;
        if let Some(payload) = &accessory.setup_payload
            && !payload.starts_with("X-HM://")
        {
            return Err(HarnessError::EngineInit(format!(
                "setup payload must start with X-HM://, got '{payload}'"
            )));
        }
        // Services carry the accessory name; registration needs one.
        if accessory.name.trim().is_empty() {
            return Err(HarnessError::ServiceRegistration("accessory information"));
        }

        let engine = Self {
            setup_code: accessory.setup_code.clone(),
            setup_payload: accessory.setup_payload.clone(),
            pair_after: simulation.pair_after_s.map(Duration::from_secs),
            controller_poll: Duration::from_millis(simulation.controller_poll_ms),
            switch_toggle: simulation.switch_toggle_s.map(Duration::from_secs),
            clock,
            contact: Arc::new(BinaryCharacteristic::new(false)),
            occupancy: Arc::new(BinaryCharacteristic::new(false)),
            temperature: Arc::new(TemperatureCharacteristic::new(
                temperature_source.current_celsius(),
            )),
            switch: Arc::new(BinaryCharacteristic::new(false)),
            temperature_source,
            switch_sink,
            paired: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            controller: Mutex::new(None),
        };
        info!(
            "[Engine] Initialized accessory '{}' with 4 services",
            accessory.name
        );
        Ok(engine)
    }
}

fn validate_setup_code(code: &str) -> Result<()> {
    let bytes = code.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[3] == b'-'
        && bytes[6] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 3 | 6) || b.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(HarnessError::EngineInit(format!(
            "setup code must look like NNN-NN-NNN, got '{code}'"
        )))
    }
}

/// State the controller thread keeps between polls.
struct ControllerLoop {
    clock: Arc<dyn Clock>,
    running: Arc<AtomicBool>,
    paired: Arc<AtomicBool>,
    pair_after: Option<Duration>,
    poll: Duration,
    switch_toggle: Option<Duration>,
    contact: Arc<BinaryCharacteristic>,
    occupancy: Arc<BinaryCharacteristic>,
    temperature: Arc<TemperatureCharacteristic>,
    switch: Arc<BinaryCharacteristic>,
    temperature_source: Arc<dyn TemperatureSource>,
    switch_sink: Arc<dyn SwitchSink>,
}

impl ControllerLoop {
    fn run(self) {
        let started_at = self.clock.now();
        let mut last_switch_write = started_at;
        let mut seen_versions = [
            self.contact.version(),
            self.occupancy.version(),
            self.temperature.version(),
        ];

        while self.running.load(Ordering::SeqCst) {
            self.clock.sleep(self.poll);
            let now = self.clock.now();

            if !self.paired.load(Ordering::SeqCst) {
                match self.pair_after {
                    Some(delay) if now.duration_since(started_at) >= delay => {
                        self.paired.store(true, Ordering::SeqCst);
                        let controller_id: u32 = rand::random();
                        info!("[Engine] Controller 0x{controller_id:08X} paired");
                        last_switch_write = now;
                    }
                    _ => continue,
                }
            }

            // On-demand temperature read, like a controller refreshing its
            // view of the accessory.
            let celsius = self.temperature_source.current_celsius();
            self.temperature.set_celsius(celsius);
            debug!("[Engine] Controller read temperature: {celsius:.1} C");

            let versions = [
                self.contact.version(),
                self.occupancy.version(),
                self.temperature.version(),
            ];
            if versions != seen_versions {
                seen_versions = versions;
                info!(
                    "[Engine] State sync: contact={} occupied={} temperature={:.1} C",
                    self.contact.get(),
                    self.occupancy.get(),
                    self.temperature.get_celsius()
                );
            }

            if let Some(period) = self.switch_toggle
                && now.duration_since(last_switch_write) >= period
            {
                last_switch_write = now;
                let on = self.switch.toggle();
                info!(
                    "[Engine] Controller requested switch: {}",
                    if on { "ON" } else { "OFF" }
                );
                // The authoritative state above is already updated; the
                // sink only mirrors it, like a write hook in a real stack.
                self.switch_sink.switch_changed(on);
            }
        }
    }
}

impl ProtocolEngine for SimulatedEngine {
    fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HarnessError::EngineStart("engine already started".into()));
        }

        let controller = ControllerLoop {
            clock: self.clock.clone(),
            running: self.running.clone(),
            paired: self.paired.clone(),
            pair_after: self.pair_after,
            poll: self.controller_poll,
            switch_toggle: self.switch_toggle,
            contact: self.contact.clone(),
            occupancy: self.occupancy.clone(),
            temperature: self.temperature.clone(),
            switch: self.switch.clone(),
            temperature_source: self.temperature_source.clone(),
            switch_sink: self.switch_sink.clone(),
        };

        let handle = std::thread::Builder::new()
            .name("sim-controller".into())
            .spawn(move || controller.run())
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                HarnessError::EngineStart(format!("failed to spawn controller thread: {e}"))
            })?;
        *self.controller.lock() = Some(handle);

        info!("[Engine] Started; simulated controller running");
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.controller.lock().take() {
            let _ = handle.join();
        }
        info!("[Engine] Stopped");
    }

    fn is_paired(&self) -> bool {
        self.paired.load(Ordering::SeqCst)
    }

    fn setup_code(&self) -> String {
        self.setup_code.clone()
    }

    fn setup_payload(&self) -> Option<String> {
        self.setup_payload.clone()
    }

    fn contact(&self) -> Arc<dyn ContactService> {
        self.contact.clone()
    }

    fn occupancy(&self) -> Arc<dyn OccupancyService> {
        self.occupancy.clone()
    }

    fn temperature(&self) -> Arc<dyn TemperatureService> {
        self.temperature.clone()
    }

    fn switch(&self) -> Arc<dyn SwitchService> {
        self.switch.clone()
    }
}
