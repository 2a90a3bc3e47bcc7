//! bioterm - fingerprint access terminal
//!
//! Drives a serial R30x fingerprint module (or a simulated one) with the
//! keypad read from stdin and the display drawn on stderr. Each successful
//! match prints `LOGIN:<id>` on stdout for the host.

mod console;
mod simulator;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bioterm_controller::{Controller, ControllerError, LineHost, Peripherals};
use bioterm_core::TerminalConfig;
use bioterm_hardware::ChannelKeypad;
use bioterm_hardware::mock::MockSensor;
use bioterm_hardware::traits::SensorLink;

use crate::console::{ConsoleDisplay, ConsoleIndicator};

#[derive(Parser)]
#[command(name = "bioterm")]
#[command(about = "Fingerprint access terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sensor serial port (overrides the configuration)
    #[arg(short, long, conflicts_with = "simulate")]
    port: Option<String>,

    /// Use a simulated sensor driven from stdin
    #[arg(long)]
    simulate: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "bioterm=info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting bioterm v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => TerminalConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TerminalConfig::default(),
    };
    if let Some(port) = cli.port {
        config.sensor.port = Some(port);
    }

    let (keypad, keys) = ChannelKeypad::with_name("console".to_string());

    if cli.simulate {
        let (sensor, handle) = MockSensor::with_name("simulated R30x".to_string());
        simulator::seed(&handle);
        std::thread::spawn(move || simulator::pump_stdin(keys, Some(handle)));
        drive(sensor, keypad, &config).await
    } else {
        if config.sensor.port.is_none() {
            bail!("No sensor port configured; pass --port or --simulate");
        }
        let sensor = bioterm_sensor::open(&config.sensor)?;
        std::thread::spawn(move || simulator::pump_stdin(keys, None));
        drive(sensor, keypad, &config).await
    }
}

async fn drive<S: SensorLink>(
    sensor: S,
    keypad: ChannelKeypad,
    config: &TerminalConfig,
) -> Result<()> {
    let peripherals = Peripherals {
        sensor,
        keypad,
        display: ConsoleDisplay::new(&config.display),
        indicator: ConsoleIndicator::default(),
        host: LineHost::new(std::io::stdout()),
    };
    let mut controller = Controller::new(peripherals, config);

    match controller.run().await {
        Ok(()) => Ok(()),
        Err(ControllerError::InputClosed(_)) => {
            info!("Input closed, shutting down");
            Ok(())
        }
        Err(e) if e.is_fatal() => {
            error!(error = %e, "Terminal halted; press Ctrl-C to exit");
            tokio::signal::ctrl_c().await?;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
