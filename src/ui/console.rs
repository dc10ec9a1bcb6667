//! Console rendering of the overlay UI.
//!
//! Toasts, the status line and the pairing QR block all come out as log
//! lines. A single overlay slot with a clock-based expiry models the
//! transient layer; a newer overlay replaces the current one.

use super::OverlayUi;
use crate::clock::Clock;
use log::{error, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct ConsoleUi {
    clock: Arc<dyn Clock>,
    headless: bool,
    /// How long the QR block occupies the overlay slot.
    qr_hold: Duration,
    overlay_until: Mutex<Option<Instant>>,
}

impl ConsoleUi {
    pub fn new(clock: Arc<dyn Clock>, headless: bool, qr_hold: Duration) -> Self {
        Self {
            clock,
            headless,
            qr_hold,
            overlay_until: Mutex::new(None),
        }
    }

    fn occupy_overlay(&self, duration: Duration) {
        if self.headless {
            return;
        }
        *self.overlay_until.lock() = Some(self.clock.now() + duration);
    }
}

impl OverlayUi for ConsoleUi {
    fn show_toast(&self, text: &str, duration: Duration) {
        info!("[UI] {text}");
        self.occupy_overlay(duration);
    }

    fn show_qr_code(&self, payload: &str, caption: &str) -> bool {
        if self.headless {
            return false;
        }
        info!("[UI] +----------------------------+");
        info!("[UI] |  {payload}");
        info!("[UI] +----------------------------+");
        info!("[UI] {caption}");
        self.occupy_overlay(self.qr_hold);
        true
    }

    fn show_status_bar(&self, text: &str, icon: &str) {
        info!("[UI] {icon} {text}");
    }

    fn show_error(&self, text: &str) {
        error!("[UI] {text}");
    }

    fn has_active_overlay(&self) -> bool {
        let mut slot = self.overlay_until.lock();
        match *slot {
            Some(until) if self.clock.now() < until => true,
            Some(_) => {
                *slot = None;
                false
            }
            None => false,
        }
    }

    fn has_display(&self) -> bool {
        !self.headless
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeClock;

    #[test]
    fn test_toast_occupies_overlay_until_expiry() {
        let clock = FakeClock::new();
        let ui = ConsoleUi::new(
            Arc::new(clock.clone()),
            false,
            Duration::from_secs(60),
        );

        ui.show_toast("Door: open", Duration::from_secs(2));
        assert!(ui.has_active_overlay());

        clock.advance(Duration::from_millis(1999));
        assert!(ui.has_active_overlay());

        clock.advance(Duration::from_millis(1));
        assert!(!ui.has_active_overlay());
    }

    #[test]
    fn test_new_overlay_replaces_current() {
        let clock = FakeClock::new();
        let ui = ConsoleUi::new(
            Arc::new(clock.clone()),
            false,
            Duration::from_secs(60),
        );

        assert!(ui.show_qr_code("X-HM://00E4PWBYC1234", "Scan to pair"));
        clock.advance(Duration::from_secs(10));
        assert!(ui.has_active_overlay());

        // An outcome toast cuts the QR hold short.
        ui.show_toast("Paired", Duration::from_secs(2));
        clock.advance(Duration::from_secs(2));
        assert!(!ui.has_active_overlay());
    }

    #[test]
    fn test_headless_refuses_qr_and_tracks_no_overlay() {
        let clock = FakeClock::new();
        let ui = ConsoleUi::new(
            Arc::new(clock.clone()),
            true,
            Duration::from_secs(60),
        );

        assert!(!ui.has_display());
        assert!(!ui.show_qr_code("X-HM://00E4PWBYC1234", "Scan to pair"));
        ui.show_toast("Setup code: 111-22-333", Duration::from_secs(5));
        assert!(!ui.has_active_overlay());
    }
}
