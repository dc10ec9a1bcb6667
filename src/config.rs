use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub accessory: AccessoryConfig,
    pub timing: TimingConfig,
    pub temperature: TemperatureConfig,
    pub simulation: SimulationConfig,
}

/// Identity the accessory advertises during pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryConfig {
    pub name: String,
    /// Setup code in the `XXX-XX-XXX` display format.
    pub setup_code: String,
    /// Optional QR setup payload (`X-HM://...`). Without it the pairing
    /// workflow falls back to the textual setup-code notice.
    pub setup_payload: Option<String>,
}

/// Periods and budgets for the polling loops and transient overlays.
///
/// All values are milliseconds; accessors return `Duration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Steady-state loop tick. Also the effective debounce floor for the
    /// virtual button.
    pub tick_ms: u64,
    /// Period of the occupancy/temperature simulation fire.
    pub sensor_period_ms: u64,
    /// How long the pairing wait runs before resolving as timed out.
    pub pairing_timeout_ms: u64,
    /// Granularity of the pairing wait.
    pub pairing_poll_ms: u64,
    /// Quiet window armed after a press is consumed to skip pairing.
    pub skip_quiet_ms: u64,
    /// Display budget of sensor-change toasts.
    pub toast_ms: u64,
    /// Display budget of the textual setup-code fallback notice.
    pub fallback_notice_ms: u64,
}

/// Simulated temperature drift parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureConfig {
    pub initial_c: f32,
    pub min_c: f32,
    pub max_c: f32,
    pub step_c: f32,
    pub drift: DriftPolicy,
}

/// When the temperature drift advances.
///
/// The two reference variants disagreed on this; it is an explicit
/// configuration choice here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DriftPolicy {
    /// Every engine pull of the temperature advances the drift.
    OnRead,
    /// Pulls only read; the drift advances on the periodic sensor fire.
    OnTimer,
}

/// Knobs of the simulated engine and the virtual button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seconds after start until the simulated controller pairs.
    /// `None` means it never pairs (exercises timeout/skip paths).
    pub pair_after_s: Option<u64>,
    /// Period of the simulated controller's state-sync poll.
    pub controller_poll_ms: u64,
    /// Seconds between simulated switch writes from the controller.
    /// `None` disables them.
    pub switch_toggle_s: Option<u64>,
    /// Seconds between virtual button presses. `None` leaves the button
    /// idle.
    pub button_period_s: Option<u64>,
    /// How long each virtual press is held.
    pub button_hold_ms: u64,
    /// Run without a display; pairing takes the setup-code fallback path.
    pub headless: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accessory: AccessoryConfig {
                name: "Virtual Accessory".to_string(),
                setup_code: "111-22-333".to_string(),
                setup_payload: Some("X-HM://00E4PWBYC1234".to_string()),
            },
            timing: TimingConfig {
                tick_ms: 50,
                sensor_period_ms: 30_000,
                pairing_timeout_ms: 60_000,
                pairing_poll_ms: 100,
                skip_quiet_ms: 300,
                toast_ms: 2_000,
                fallback_notice_ms: 5_000,
            },
            temperature: TemperatureConfig {
                initial_c: 22.0,
                min_c: 18.0,
                max_c: 28.0,
                step_c: 0.5,
                drift: DriftPolicy::OnTimer,
            },
            simulation: SimulationConfig {
                pair_after_s: Some(15),
                controller_poll_ms: 1_000,
                switch_toggle_s: Some(45),
                // First virtual press lands after the default pairing
                // delay, so it toggles the contact sensor instead of
                // skipping the pairing window.
                button_period_s: Some(20),
                button_hold_ms: 200,
                headless: false,
            },
        }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn sensor_period(&self) -> Duration {
        Duration::from_millis(self.sensor_period_ms)
    }

    pub fn pairing_timeout(&self) -> Duration {
        Duration::from_millis(self.pairing_timeout_ms)
    }

    pub fn pairing_poll(&self) -> Duration {
        Duration::from_millis(self.pairing_poll_ms)
    }

    pub fn skip_quiet(&self) -> Duration {
        Duration::from_millis(self.skip_quiet_ms)
    }

    pub fn toast(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }

    pub fn fallback_notice(&self) -> Duration {
        Duration::from_millis(self.fallback_notice_ms)
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("HARNESS_ACCESSORY_NAME") {
            config.accessory.name = name;
        }
        if let Ok(code) = std::env::var("HARNESS_SETUP_CODE") {
            config.accessory.setup_code = code;
        }
        if let Ok(payload) = std::env::var("HARNESS_SETUP_PAYLOAD") {
            config.accessory.setup_payload = if payload.is_empty() {
                None
            } else {
                Some(payload)
            };
        }
        if let Ok(tick) = std::env::var("HARNESS_TICK_MS")
            && let Ok(t) = tick.parse()
        {
            config.timing.tick_ms = t;
        }
        if let Ok(period) = std::env::var("HARNESS_SENSOR_PERIOD_MS")
            && let Ok(p) = period.parse()
        {
            config.timing.sensor_period_ms = p;
        }
        if let Ok(timeout) = std::env::var("HARNESS_PAIRING_TIMEOUT_MS")
            && let Ok(t) = timeout.parse()
        {
            config.timing.pairing_timeout_ms = t;
        }
        if let Ok(drift) = std::env::var("HARNESS_DRIFT_POLICY")
            && let Ok(d) = drift.parse()
        {
            config.temperature.drift = d;
        }
        if let Ok(pair_after) = std::env::var("HARNESS_PAIR_AFTER_S") {
            config.simulation.pair_after_s = pair_after.parse().ok();
        }
        if let Ok(headless) = std::env::var("HARNESS_HEADLESS")
            && let Ok(h) = headless.parse()
        {
            config.simulation.headless = h;
        }

        config
    }
}
