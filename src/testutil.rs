//! Shared fakes for unit tests.
//!
//! The fake clock advances virtual time inside `sleep`, so the polling
//! loops run to completion instantly and deterministically.

use crate::clock::Clock;
use crate::display::StatusView;
use crate::engine::characteristic::{BinaryCharacteristic, TemperatureCharacteristic};
use crate::engine::{
    ContactService, OccupancyService, ProtocolEngine, SwitchService, TemperatureService,
};
use crate::error::{HarnessError, Result};
use crate::ui::OverlayUi;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Deterministic clock; `sleep` advances virtual time.
#[derive(Clone)]
pub struct FakeClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.offset.lock() += duration;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Records every UI interaction; overlay state is set by the test.
pub struct RecordingUi {
    display: bool,
    qr_accepts: bool,
    overlay_active: Mutex<bool>,
    pub toasts: Mutex<Vec<(String, Duration)>>,
    pub qr_codes: Mutex<Vec<(String, String)>>,
    pub status_lines: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn new(display: bool) -> Self {
        Self {
            display,
            qr_accepts: true,
            overlay_active: Mutex::new(false),
            toasts: Mutex::new(Vec::new()),
            qr_codes: Mutex::new(Vec::new()),
            status_lines: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn refusing_qr(display: bool) -> Self {
        let mut ui = Self::new(display);
        ui.qr_accepts = false;
        ui
    }

    pub fn set_overlay_active(&self, active: bool) {
        *self.overlay_active.lock() = active;
    }
}

impl OverlayUi for RecordingUi {
    fn show_toast(&self, text: &str, duration: Duration) {
        self.toasts.lock().push((text.to_string(), duration));
    }

    fn show_qr_code(&self, payload: &str, caption: &str) -> bool {
        if !self.display || !self.qr_accepts {
            return false;
        }
        self.qr_codes
            .lock()
            .push((payload.to_string(), caption.to_string()));
        true
    }

    fn show_status_bar(&self, text: &str, _icon: &str) {
        self.status_lines.lock().push(text.to_string());
    }

    fn show_error(&self, text: &str) {
        self.errors.lock().push(text.to_string());
    }

    fn has_active_overlay(&self) -> bool {
        *self.overlay_active.lock()
    }

    fn has_display(&self) -> bool {
        self.display
    }
}

/// Status view counting redraws.
pub struct CountingView {
    attached: bool,
    redraws: AtomicUsize,
}

impl CountingView {
    pub fn new(attached: bool) -> Self {
        Self {
            attached,
            redraws: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }
}

impl StatusView for CountingView {
    fn attached(&self) -> bool {
        self.attached
    }

    fn redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }
}

/// Engine double whose pairing state the test flips directly.
pub struct ScriptedEngine {
    paired: AtomicBool,
    setup_code: String,
    setup_payload: Option<String>,
    start_error: Mutex<Option<String>>,
    pub contact: Arc<BinaryCharacteristic>,
    pub occupancy: Arc<BinaryCharacteristic>,
    pub temperature: Arc<TemperatureCharacteristic>,
    pub switch: Arc<BinaryCharacteristic>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            paired: AtomicBool::new(false),
            setup_code: "111-22-333".to_string(),
            setup_payload: Some("X-HM://00E4PWBYC1234".to_string()),
            start_error: Mutex::new(None),
            contact: Arc::new(BinaryCharacteristic::new(false)),
            occupancy: Arc::new(BinaryCharacteristic::new(false)),
            temperature: Arc::new(TemperatureCharacteristic::new(22.0)),
            switch: Arc::new(BinaryCharacteristic::new(false)),
        }
    }

    pub fn without_payload() -> Self {
        let mut engine = Self::new();
        engine.setup_payload = None;
        engine
    }

    pub fn set_paired(&self, paired: bool) {
        self.paired.store(paired, Ordering::SeqCst);
    }

    pub fn fail_start(&self, message: &str) {
        *self.start_error.lock() = Some(message.to_string());
    }
}

impl ProtocolEngine for ScriptedEngine {
    fn start(&self) -> Result<()> {
        match self.start_error.lock().take() {
            Some(message) => Err(HarnessError::EngineStart(message)),
            None => Ok(()),
        }
    }

    fn stop(&self) {}

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
