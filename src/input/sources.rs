//! Button level producers.
//!
//! In the reference hardware this is a GPIO read; here the level comes
//! from timers or a script so runs are reproducible.

use std::time::{Duration, Instant};

/// Raw "is active" producer, sampled once per tick.
pub trait ButtonSource: Send {
    fn sample(&mut self, now: Instant) -> bool;
}

/// A button nobody presses.
pub struct NullButton;

impl ButtonSource for NullButton {
    fn sample(&mut self, _now: Instant) -> bool {
        false
    }
}

/// Presses the button for `hold` once every `period`.
///
/// The first press fires one full period after the first sample, so a
/// fresh harness starts quiet.
pub struct IntervalButton {
    period: Duration,
    hold: Duration,
    origin: Option<Instant>,
}

impl IntervalButton {
    pub fn new(period: Duration, hold: Duration) -> Self {
        Self {
            period,
            hold,
            origin: None,
        }
    }
}

impl ButtonSource for IntervalButton {
    fn sample(&mut self, now: Instant) -> bool {
        if self.period.is_zero() {
            return false;
        }
        let origin = *self.origin.get_or_insert(now);
        let elapsed = now.duration_since(origin);
        if elapsed < self.period {
            return false;
        }
        let into_period = elapsed.as_millis() % self.period.as_millis();
        into_period < self.hold.as_millis()
    }
}

/// Presses the button during fixed windows after the first sample.
///
/// Each window is `(offset, hold)`. Used by tests and demo runs that
/// need exact press timing.
pub struct ScriptedButton {
    windows: Vec<(Duration, Duration)>,
    origin: Option<Instant>,
}

impl ScriptedButton {
    pub fn new(windows: Vec<(Duration, Duration)>) -> Self {
        Self {
            windows,
            origin: None,
        }
    }
}

impl ButtonSource for ScriptedButton {
    fn sample(&mut self, now: Instant) -> bool {
        let origin = *self.origin.get_or_insert(now);
        let elapsed = now.duration_since(origin);
        self.windows
            .iter()
            .any(|&(offset, hold)| elapsed >= offset && elapsed < offset + hold)
    }
}
