//! Pairing workflow state machine.
//!
//! One orchestrator instance is one pairing session: show the QR code
//! once the screen is free, wait for a controller with a timeout and a
//! user skip, fall back to a textual setup-code notice when no QR
//! renderer is available. Phases only move forward; a new session takes
//! a new orchestrator after the engine is restarted.
//!
//! The machine is advanced by an external tick (100 ms granularity) so
//! tests drive it without real time passing.

use crate::display::DisplayScheduler;
use crate::engine::ProtocolEngine;
use crate::ui::OverlayUi;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum::Display;

/// Terminal outcome of a pairing session.
///
/// Skipped and TimedOut are normal outcomes, not errors; they change the
/// UI messaging and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PairingResolution {
    /// A controller was already paired when the session began.
    AlreadyPaired,
    /// No QR renderer was available; the setup code was posted as a
    /// toast instead and the session ended without waiting.
    SetupCodeShown,
    Paired,
    Skipped,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    ShowingQr,
    WaitingForPairing,
    Resolved(PairingResolution),
}

/// Timing knobs of the session.
pub struct PairingTimings {
    /// Wait budget before resolving as timed out.
    pub timeout: Duration,
    /// Display budget of the setup-code fallback notice.
    pub fallback_notice: Duration,
    /// Display budget of outcome toasts.
    pub outcome_toast: Duration,
}

pub struct PairingOrchestrator {
    engine: Arc<dyn ProtocolEngine>,
    ui: Arc<dyn OverlayUi>,
    display: Arc<DisplayScheduler>,
    timings: PairingTimings,
    phase: Phase,
    started_at: Option<Instant>,
    skip_requested: bool,
}

impl PairingOrchestrator {
    pub fn new(
        engine: Arc<dyn ProtocolEngine>,
        ui: Arc<dyn OverlayUi>,
        display: Arc<DisplayScheduler>,
        timings: PairingTimings,
    ) -> Self {
        Self {
            engine,
            ui,
            display,
            timings,
            phase: Phase::Idle,
            started_at: None,
            skip_requested: false,
        }
    }

    /// Open the session. Call once, after the engine started.
    ///
    /// Resolves immediately when a controller is already paired, or when
    /// no QR path exists (no display, no setup payload); otherwise the
    /// QR is rendered by a later tick, once the screen is free.
    pub fn begin(&mut self, now: Instant) {
        if self.phase != Phase::Idle {
            return;
        }

        if self.engine.is_paired() {
            info!("Accessory already paired, skipping pairing window");
            self.resolve(PairingResolution::AlreadyPaired);
            return;
        }

        self.started_at = Some(now);

        if !self.ui.has_display() || self.engine.setup_payload().is_none() {
            self.fall_back_to_setup_code();
            return;
        }

        self.phase = Phase::ShowingQr;
        info!("Pairing session opened");
    }

    /// Advance the machine one tick.
    ///
    /// `skip_pressed` is the routed button press for this tick; it is
    /// latched, so a press during the QR hand-off still skips the wait.
    /// Returns the resolution exactly once, on the tick that resolves.
    pub fn tick(&mut self, now: Instant, skip_pressed: bool) -> Option<PairingResolution> {
        if skip_pressed && !self.is_resolved() {
            self.skip_requested = true;
        }

        match self.phase {
            Phase::Idle | Phase::Resolved(_) => None,
            Phase::ShowingQr => {
                // Let overlays from startup clear so the QR is actually
                // visible.
                if self.ui.has_active_overlay() {
                    return None;
                }
                let Some(payload) = self.engine.setup_payload() else {
                    self.fall_back_to_setup_code();
                    return Some(PairingResolution::SetupCodeShown);
                };
                let caption =
                    format!("Scan to pair - code {}", self.engine.setup_code());
                if self.ui.show_qr_code(&payload, &caption) {
                    self.phase = Phase::WaitingForPairing;
                    self.display.request_redraw();
                    info!("Waiting for pairing (QR displayed)");
                    None
                } else {
                    self.fall_back_to_setup_code();
                    Some(PairingResolution::SetupCodeShown)
                }
            }
            Phase::WaitingForPairing => {
                // Pairing success wins over a skip or timeout observed in
                // the same tick.
                if self.engine.is_paired() {
                    self.ui.show_toast("Paired", self.timings.outcome_toast);
                    self.resolve(PairingResolution::Paired);
                    return Some(PairingResolution::Paired);
                }
                if self.skip_requested {
                    self.ui
                        .show_toast("Pairing skipped", self.timings.outcome_toast);
                    self.resolve(PairingResolution::Skipped);
                    return Some(PairingResolution::Skipped);
                }
                let started = self.started_at.expect("session has a start tick");
                if now.duration_since(started) >= self.timings.timeout {
                    self.ui
                        .show_toast("Pairing timed out", self.timings.outcome_toast);
                    self.resolve(PairingResolution::TimedOut);
                    return Some(PairingResolution::TimedOut);
                }
                None
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, Phase::Resolved(_))
    }

    pub fn resolution(&self) -> Option<PairingResolution> {
        match self.phase {
            Phase::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    fn fall_back_to_setup_code(&mut self) {
        self.ui.show_toast(
            &format!("Setup code: {}", self.engine.setup_code()),
            self.timings.fallback_notice,
        );
        self.resolve(PairingResolution::SetupCodeShown);
    }

    fn resolve(&mut self, resolution: PairingResolution) {
        self.phase = Phase::Resolved(resolution);
        self.display.request_redraw();
        info!("Pairing session resolved: {resolution}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::testutil::{CountingView, FakeClock, RecordingUi, ScriptedEngine};

    struct Fixture {
        clock: FakeClock,
        engine: Arc<ScriptedEngine>,
        ui: Arc<RecordingUi>,
        view: Arc<CountingView>,
        display: Arc<DisplayScheduler>,
        orchestrator: PairingOrchestrator,
    }

    fn timings() -> PairingTimings {
        PairingTimings {
            timeout: Duration::from_secs(60),
            fallback_notice: Duration::from_secs(5),
            outcome_toast: Duration::from_secs(2),
        }
    }

    fn fixture_with(engine: ScriptedEngine, ui: RecordingUi) -> Fixture {
        let clock = FakeClock::new();
        let engine = Arc::new(engine);
        let ui = Arc::new(ui);
        let view = Arc::new(CountingView::new(true));
        let display = Arc::new(DisplayScheduler::new(view.clone()));
        let orchestrator = PairingOrchestrator::new(
            engine.clone(),
            ui.clone(),
            display.clone(),
            timings(),
        );
        Fixture {
            clock,
            engine,
            ui,
            view,
            display,
            orchestrator,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(ScriptedEngine::new(), RecordingUi::new(true))
    }

    /// Drive 100 ms ticks until resolution or the tick budget runs out.
    fn run_ticks(f: &mut Fixture, max_ticks: u32) -> Option<(u32, PairingResolution)> {
        for tick in 1..=max_ticks {
            f.clock.advance(Duration::from_millis(100));
            if let Some(resolution) = f.orchestrator.tick(f.clock.now(), false) {
                return Some((tick, resolution));
            }
        }
        None
    }

    #[test]
    fn test_already_paired_resolves_without_qr() {
        let mut f = fixture();
        f.engine.set_paired(true);
        f.orchestrator.begin(f.clock.now());

        assert_eq!(
            f.orchestrator.resolution(),
            Some(PairingResolution::AlreadyPaired)
        );
        assert!(f.ui.qr_codes.lock().is_empty());
    }

    #[test]
    fn test_headless_falls_back_to_setup_code_notice() {
        let mut f = fixture_with(ScriptedEngine::new(), RecordingUi::new(false));
        f.orchestrator.begin(f.clock.now());

        assert_eq!(
            f.orchestrator.resolution(),
            Some(PairingResolution::SetupCodeShown)
        );
        let toasts = f.ui.toasts.lock();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].0, "Setup code: 111-22-333");
        assert_eq!(toasts[0].1, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_payload_falls_back() {
        let mut f = fixture_with(ScriptedEngine::without_payload(), RecordingUi::new(true));
        f.orchestrator.begin(f.clock.now());
        assert_eq!(
            f.orchestrator.resolution(),
            Some(PairingResolution::SetupCodeShown)
        );
    }

    #[test]
    fn test_refused_qr_falls_back() {
        let mut f = fixture_with(ScriptedEngine::new(), RecordingUi::refusing_qr(true));
        f.orchestrator.begin(f.clock.now());
        assert!(f.orchestrator.resolution().is_none());

        f.clock.advance(Duration::from_millis(100));
        let resolution = f.orchestrator.tick(f.clock.now(), false);
        assert_eq!(resolution, Some(PairingResolution::SetupCodeShown));
    }

    #[test]
    fn test_qr_deferred_while_overlay_active() {
        let mut f = fixture();
        f.ui.set_overlay_active(true);
        f.orchestrator.begin(f.clock.now());

        for _ in 0..5 {
            f.clock.advance(Duration::from_millis(100));
            assert!(f.orchestrator.tick(f.clock.now(), false).is_none());
        }
        assert!(f.ui.qr_codes.lock().is_empty());

        f.ui.set_overlay_active(false);
        f.clock.advance(Duration::from_millis(100));
        assert!(f.orchestrator.tick(f.clock.now(), false).is_none());
        assert_eq!(f.ui.qr_codes.lock().len(), 1);
    }

    #[test]
    fn test_pairs_at_tick_42() {
        let mut f = fixture();
        f.orchestrator.begin(f.clock.now());
        // Tick 1 renders the QR.
        assert!(run_ticks(&mut f, 1).is_none());

        let mut resolved_at = None;
        for tick in 2..=700u32 {
            f.clock.advance(Duration::from_millis(100));
            if tick == 42 {
                f.engine.set_paired(true);
            }
            if let Some(resolution) = f.orchestrator.tick(f.clock.now(), false) {
                resolved_at = Some((tick, resolution));
                break;
            }
        }
        assert_eq!(resolved_at, Some((42, PairingResolution::Paired)));

        // No later timeout or skip fires once resolved.
        for _ in 0..700 {
            f.clock.advance(Duration::from_millis(100));
            assert!(f.orchestrator.tick(f.clock.now(), true).is_none());
        }
        assert_eq!(f.orchestrator.resolution(), Some(PairingResolution::Paired));
    }

    #[test]
    fn test_times_out_after_sixty_seconds_of_ticks() {
        let mut f = fixture();
        f.orchestrator.begin(f.clock.now());
        let resolved = run_ticks(&mut f, 700);
        assert_eq!(resolved, Some((600, PairingResolution::TimedOut)));
    }

    #[test]
    fn test_paired_wins_over_simultaneous_skip_and_timeout() {
        let mut f = fixture();
        f.orchestrator.begin(f.clock.now());
        assert!(run_ticks(&mut f, 1).is_none());

        // Make all three conditions true for the same tick.
        f.engine.set_paired(true);
        f.clock.advance(Duration::from_secs(120));
        let resolution = f.orchestrator.tick(f.clock.now(), true);
        assert_eq!(resolution, Some(PairingResolution::Paired));
    }

    #[test]
    fn test_skip_latched_during_qr_handoff() {
        let mut f = fixture();
        f.ui.set_overlay_active(true);
        f.orchestrator.begin(f.clock.now());

        // Press lands while a startup toast still owns the screen.
        f.clock.advance(Duration::from_millis(100));
        assert!(f.orchestrator.tick(f.clock.now(), true).is_none());

        f.ui.set_overlay_active(false);
        f.clock.advance(Duration::from_millis(100));
        assert!(f.orchestrator.tick(f.clock.now(), false).is_none());

        f.clock.advance(Duration::from_millis(100));
        let resolution = f.orchestrator.tick(f.clock.now(), false);
        assert_eq!(resolution, Some(PairingResolution::Skipped));
    }

    #[test]
    fn test_resolution_requests_exactly_one_redraw() {
        let mut f = fixture();
        f.engine.set_paired(true);
        f.orchestrator.begin(f.clock.now());

        assert!(f.display.redraw_pending());
        assert!(f.display.tick(false));
        assert_eq!(f.view.count(), 1);
        assert!(!f.display.tick(false));
        assert_eq!(f.view.count(), 1);
    }
}
