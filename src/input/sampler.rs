//! Press-edge detection for the virtual button.

use std::time::Instant;

/// A single Released-to-Pressed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    pub at: Instant,
}

/// Edge detector over a polled digital input.
///
/// Emits exactly one event per physical press no matter how many ticks
/// the press is held; the bounded tick rate of the caller is the
/// effective debounce floor. One sampler instance is shared by every
/// consumer of the button, so a press can never be read twice.
pub struct InputSampler {
    pressed: bool,
    suppress_until: Option<Instant>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self {
            pressed: false,
            suppress_until: None,
        }
    }

    /// Sample the raw input level.
    ///
    /// Returns an event only on the Released-to-Pressed transition, and
    /// never while a quiet window is armed. Edges that fall inside the
    /// window are swallowed, not deferred.
    pub fn poll(&mut self, raw_active: bool, now: Instant) -> Option<PressEvent> {
        let was_pressed = self.pressed;
        self.pressed = raw_active;

        if let Some(until) = self.suppress_until {
            if now < until {
                return None;
            }
            self.suppress_until = None;
        }

        if raw_active && !was_pressed {
            Some(PressEvent { at: now })
        } else {
            None
        }
    }

    /// Arm a quiet window: edges before `until` are swallowed.
    ///
    /// Used after a press has been consumed to skip pairing, so a
    /// re-press straddling the phase boundary cannot also toggle a
    /// sensor.
    pub fn suppress_for(&mut self, until: Instant) {
        self.suppress_until = Some(until);
    }
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn t(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_one_event_per_held_press() {
        let base = Instant::now();
        let mut sampler = InputSampler::new();

        assert!(sampler.poll(true, t(base, 0)).is_some());
        // Held across many ticks: no further events.
        for tick in 1..20 {
            assert!(sampler.poll(true, t(base, tick * 50)).is_none());
        }
        assert!(sampler.poll(false, t(base, 1000)).is_none());
    }

    #[test]
    fn test_release_then_press_emits_again() {
        let base = Instant::now();
        let mut sampler = InputSampler::new();

        assert!(sampler.poll(true, t(base, 0)).is_some());
        assert!(sampler.poll(false, t(base, 50)).is_none());
        let event = sampler.poll(true, t(base, 100));
        assert_eq!(event, Some(PressEvent { at: t(base, 100) }));
    }

    #[test]
    fn test_quiet_window_swallows_edges() {
        let base = Instant::now();
        let mut sampler = InputSampler::new();
        sampler.suppress_for(t(base, 300));

        // Edge inside the window is swallowed entirely.
        assert!(sampler.poll(true, t(base, 100)).is_none());
        assert!(sampler.poll(false, t(base, 150)).is_none());

        // After expiry a fresh edge is reported again.
        assert!(sampler.poll(true, t(base, 300)).is_some());
    }

    #[test]
    fn test_quiet_window_does_not_defer_held_press() {
        let base = Instant::now();
        let mut sampler = InputSampler::new();
        sampler.suppress_for(t(base, 300));

        assert!(sampler.poll(true, t(base, 100)).is_none());
        // Still held when the window expires: the edge is gone, not
        // queued.
        assert!(sampler.poll(true, t(base, 350)).is_none());
    }
}
