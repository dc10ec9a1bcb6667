//! Validation harness binary.
//!
//! Wires the simulated engine, console UI and sensor model together,
//! drives the pairing workflow and runs the steady-state loop until the
//! optional run budget expires.

use clap::Parser;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use virtual_accessory_harness::clock::{Clock, SystemClock};
use virtual_accessory_harness::config::Config;
use virtual_accessory_harness::display::DisplayScheduler;
use virtual_accessory_harness::engine::{ProtocolEngine, SimulatedEngine};
use virtual_accessory_harness::harness::AccessoryHarness;
use virtual_accessory_harness::input::{ButtonSource, IntervalButton, NullButton};
use virtual_accessory_harness::sensors::{
    ModelSwitchSink, ModelTemperatureSource, SharedSensorModel,
};
use virtual_accessory_harness::ui::{ConsoleUi, OverlayUi, SensorStatusView};

#[derive(Parser)]
#[command(name = "virtual-accessory-harness")]
#[command(about = "Hardware-free validation harness for accessory pairing and state sync")]
struct Cli {
    /// Run without a display; pairing falls back to the setup-code notice
    #[arg(long, env = "HARNESS_HEADLESS")]
    headless: bool,

    /// Seconds until the simulated controller pairs
    #[arg(long, env = "HARNESS_PAIR_AFTER_S")]
    pair_after: Option<u64>,

    /// Simulated controller never pairs (exercises timeout/skip paths)
    #[arg(long)]
    never_pair: bool,

    /// When the temperature drift advances: on-read or on-timer
    #[arg(long, env = "HARNESS_DRIFT_POLICY")]
    drift: Option<String>,

    /// Stop the steady loop after this many seconds (default: run forever)
    #[arg(long)]
    run_for: Option<u64>,

    /// Seconds between virtual button presses (default: from config)
    #[arg(long)]
    button_period: Option<u64>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn apply_cli(config: &mut Config, cli: &Cli) {
    if cli.headless {
        config.simulation.headless = true;
    }
    if cli.never_pair {
        config.simulation.pair_after_s = None;
    } else if cli.pair_after.is_some() {
        config.simulation.pair_after_s = cli.pair_after;
    }
    if let Some(drift) = &cli.drift {
        match drift.parse() {
            Ok(policy) => config.temperature.drift = policy,
            Err(_) => {
                error!("Invalid drift policy '{drift}' (expected on-read or on-timer)");
                std::process::exit(2);
            }
        }
    }
    if cli.button_period.is_some() {
        config.simulation.button_period_s = cli.button_period;
    }
}

fn main() {
    init_logger();
    info!("Starting virtual accessory harness");

    let cli = Cli::parse();
    let mut config = Config::from_env();
    apply_cli(&mut config, &cli);

    info!("Configuration loaded:");
    info!("  Accessory: {}", config.accessory.name);
    info!("  Setup code: {}", config.accessory.setup_code);
    info!("  Drift policy: {}", config.temperature.drift);
    info!("  Headless: {}", config.simulation.headless);
    if let Ok(dump) = serde_json::to_string_pretty(&config) {
        debug!("Effective config:\n{dump}");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ui: Arc<dyn OverlayUi> = Arc::new(ConsoleUi::new(
        clock.clone(),
        config.simulation.headless,
        config.timing.pairing_timeout(),
    ));
    let model = SharedSensorModel::new(&config.temperature);
    let view = Arc::new(SensorStatusView::new(model.clone(), ui.clone()));
    let display = Arc::new(DisplayScheduler::new(view));
    let temperature_source = Arc::new(ModelTemperatureSource::new(
        model.clone(),
        config.temperature.drift,
    ));
    let switch_sink = Arc::new(ModelSwitchSink::new(model.clone(), display.clone()));

    let engine: Arc<dyn ProtocolEngine> = match SimulatedEngine::new(
        &config.accessory,
        &config.simulation,
        clock.clone(),
        temperature_source,
        switch_sink,
    ) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            ui.show_error(&e.to_string());
            error!("Initialization failed, halting: {e}");
            std::process::exit(1);
        }
    };

    let button: Box<dyn ButtonSource> = match config.simulation.button_period_s {
        Some(period) => Box::new(IntervalButton::new(
            Duration::from_secs(period),
            Duration::from_millis(config.simulation.button_hold_ms),
        )),
        None => Box::new(NullButton),
    };

    let mut harness = AccessoryHarness::new(
        &config,
        clock,
        engine.clone(),
        ui,
        model,
        display,
        button,
    );

    if let Err(e) = harness.start() {
        error!("Engine start failed, not entering main loop: {e}");
        std::process::exit(1);
    }

    info!("Setup code: {}", engine.setup_code());
    if let Some(resolution) = harness.run_pairing() {
        info!("Pairing phase finished: {resolution}");
    }

    harness.run(cli.run_for.map(Duration::from_secs));

    engine.stop();
    info!("Virtual accessory harness stopped");
}
