//! The orchestration loop.
//!
//! A cooperative, single-threaded polling engine: the pairing workflow
//! runs as a dedicated pre-loop phase at 100 ms granularity, then the
//! steady-state loop ticks at 50 ms, simulating sensors and feeding the
//! engine. Nothing in here blocks beyond the tick sleep.

use crate::clock::Clock;
use crate::config::{Config, DriftPolicy, TimingConfig};
use crate::display::DisplayScheduler;
use crate::engine::{
    ContactService, OccupancyService, ProtocolEngine, TemperatureService,
};
use crate::error::Result;
use crate::input::{ButtonSource, InputSampler};
use crate::pairing::{PairingOrchestrator, PairingResolution, PairingTimings};
use crate::sensors::SharedSensorModel;
use crate::ui::OverlayUi;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct AccessoryHarness {
    timing: TimingConfig,
    drift: DriftPolicy,
    clock: Arc<dyn Clock>,
    engine: Arc<dyn ProtocolEngine>,
    ui: Arc<dyn OverlayUi>,
    model: SharedSensorModel,
    display: Arc<DisplayScheduler>,
    button: Box<dyn ButtonSource>,
    sampler: InputSampler,
    contact: Arc<dyn ContactService>,
    occupancy: Arc<dyn OccupancyService>,
    temperature: Arc<dyn TemperatureService>,
    last_periodic: Option<Instant>,
}

impl AccessoryHarness {
    pub fn new(
        config: &Config,
        clock: Arc<dyn Clock>,
        engine: Arc<dyn ProtocolEngine>,
        ui: Arc<dyn OverlayUi>,
        model: SharedSensorModel,
        display: Arc<DisplayScheduler>,
        button: Box<dyn ButtonSource>,
    ) -> Self {
        let contact = engine.contact();
        let occupancy = engine.occupancy();
        let temperature = engine.temperature();
        Self {
            timing: config.timing.clone(),
            drift: config.temperature.drift,
            clock,
            engine,
            ui,
            model,
            display,
            button,
            sampler: InputSampler::new(),
            contact,
            occupancy,
            temperature,
            last_periodic: None,
        }
    }

    /// Start the engine. On failure the error is surfaced on screen and
    /// the loops must not be entered.
    pub fn start(&self) -> Result<()> {
        self.engine.start().inspect_err(|e| {
            self.ui.show_error(&e.to_string());
        })
    }

    /// Run the pairing workflow to resolution.
    ///
    /// Every button press in this phase is routed to the orchestrator as
    /// a skip request; the shared sampler guarantees the steady loop
    /// cannot also see it. Returns the resolution, or `None` only if the
    /// session never opened (begin on an unstarted orchestrator cannot
    /// happen here).
    pub fn run_pairing(&mut self) -> Option<PairingResolution> {
        let mut orchestrator = PairingOrchestrator::new(
            self.engine.clone(),
            self.ui.clone(),
            self.display.clone(),
            PairingTimings {
                timeout: self.timing.pairing_timeout(),
                fallback_notice: self.timing.fallback_notice(),
                outcome_toast: self.timing.toast(),
            },
        );
        orchestrator.begin(self.clock.now());

        while !orchestrator.is_resolved() {
            self.clock.sleep(self.timing.pairing_poll());
            let now = self.clock.now();
            let raw = self.button.sample(now);
            let pressed = self.sampler.poll(raw, now).is_some();
            if let Some(resolution) = orchestrator.tick(now, pressed)
                && resolution == PairingResolution::Skipped
            {
                // Keep the skip press from leaking into the steady loop
                // as a sensor toggle.
                self.sampler.suppress_for(now + self.timing.skip_quiet());
            }
        }
        orchestrator.resolution()
    }

    /// Run the steady-state loop, forever or for a bounded duration.
    pub fn run(&mut self, run_for: Option<Duration>) {
        let started = self.clock.now();
        self.last_periodic = Some(started);
        info!("Entering main loop");
        info!("Button press toggles the contact sensor");
        info!(
            "Occupancy toggles and temperature drifts every {} s",
            self.timing.sensor_period().as_secs()
        );

        loop {
            let tick_start = self.clock.now();
            self.step(tick_start);

            if let Some(limit) = run_for
                && self.clock.now().duration_since(started) >= limit
            {
                info!("Run budget exhausted, leaving main loop");
                break;
            }

            let elapsed = self.clock.now().duration_since(tick_start);
            let tick = self.timing.tick();
            if elapsed < tick {
                self.clock.sleep(tick - elapsed);
            }
        }
    }

    /// One steady-state tick: sample input, apply sensor changes, push
    /// them to the engine, service the display.
    fn step(&mut self, now: Instant) {
        let raw = self.button.sample(now);
        if self.sampler.poll(raw, now).is_some() {
            let open = self.model.lock().toggle_contact();
            self.contact.set_open(open);
            self.display.request_redraw();
            info!("Contact sensor: {}", if open { "OPEN" } else { "CLOSED" });
            self.ui.show_toast(
                &format!("Door: {}", if open { "open" } else { "closed" }),
                self.timing.toast(),
            );
        }

        let last = *self.last_periodic.get_or_insert(now);
        if now.duration_since(last) >= self.timing.sensor_period() {
            self.last_periodic = Some(now);
            let (occupied, celsius) = {
                let mut model = self.model.lock();
                let occupied = model.toggle_occupancy();
                let celsius = match self.drift {
                    DriftPolicy::OnTimer => model.advance_temperature(),
                    // Pulls own the drift; the fire only mirrors the
                    // current value out.
                    DriftPolicy::OnRead => model.read_temperature(),
                };
                (occupied, celsius)
            };
            self.occupancy.set_occupied(occupied);
            self.temperature.set_temperature(celsius);
            self.display.request_redraw();
            info!(
                "Occupancy sensor: {} (temperature {:.1} C)",
                if occupied { "OCCUPIED" } else { "NOT OCCUPIED" },
                celsius
            );
            self.ui.show_toast(
                &format!("Motion: {}", if occupied { "detected" } else { "clear" }),
                self.timing.toast(),
            );
        }

        self.display.tick(self.ui.has_active_overlay());
    }
}
