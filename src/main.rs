//! Serial Input Bridge
//!
//! Main entry point and read loop setup.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use serial_input_bridge::bridge::{Bridge, BridgeError};
use serial_input_bridge::config::BridgeConfig;
use serial_input_bridge::device::{InputSink, LogSink, VirtualInputDevice};
use serial_input_bridge::table::ButtonTable;

use serial_input_transport::{
    list_ports, ReaderTransport, SerialTransport, Transport, TransportError,
};

#[derive(Parser)]
#[command(name = "serial-input-bridge")]
#[command(about = "Bridge input events from a serial link to a virtual input device")]
struct Cli {
    /// Config file path (default: ~/.config/serial-input-bridge/bridge.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port, overriding the config (e.g. /dev/ttyACM0, COM5)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overriding the config
    #[arg(short, long)]
    baud: Option<u32>,

    /// Read a captured byte stream from this file instead of the serial port
    #[arg(long, conflicts_with = "port")]
    replay: Option<PathBuf>,

    /// Log emissions instead of creating a virtual device
    #[arg(long)]
    dry_run: bool,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Write the effective config to the config path and exit
    #[arg(long)]
    write_config: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.list_ports {
        for port in list_ports()? {
            println!("{port}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(BridgeConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let mut config = BridgeConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(port) = &cli.port {
        config.serial.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }

    if cli.write_config {
        config.save(&config_path)?;
        info!("Wrote config to {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let table = config.button_table().context("Invalid button table")?;
    info!("Button table has {} entries", table.len());

    let running = setup_interrupt_handler();

    if cli.dry_run {
        let mut sink = LogSink::new();
        serve(&config, cli.replay.as_deref(), &table, &mut sink, running)
    } else {
        let mut device = VirtualInputDevice::new(&config.device_name, &table)?;
        info!("Created virtual device: {}", config.device_name);
        if let Some(path) = device.device_path() {
            info!("Device path: {}", path.display());
        }
        serve(&config, cli.replay.as_deref(), &table, &mut device, running)
    }
}

/// Set up a Ctrl-C handler that clears the returned flag when triggered
fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    if let Err(e) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    running
}

/// Open the byte source and run the read loop until it stops
fn serve<D: InputSink + ?Sized>(
    config: &BridgeConfig,
    replay: Option<&Path>,
    table: &ButtonTable,
    device: &mut D,
    running: Arc<AtomicBool>,
) -> Result<ExitCode> {
    let transport: Box<dyn Transport> = match replay {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open capture {}", path.display()))?;
            info!("Replaying {}", path.display());
            Box::new(ReaderTransport::new(BufReader::new(file)))
        }
        None => Box::new(SerialTransport::open(
            &config.serial.settings(),
            Arc::clone(&running),
        )?),
    };

    let mut bridge = Bridge::new(transport, table, device, running);
    info!("Entering main loop. Press Ctrl+C to exit.");
    let replaying = replay.is_some();
    let reason = bridge.run_and_close(|reason| {
        if !is_clean_stop(reason, replaying) {
            error!("An error occurred: {}", reason);
        }
    });

    let stats = bridge.stats();
    info!(
        "Processed {} frames ({} dropped, {} events emitted, {} bytes skipped)",
        stats.frames, stats.dropped, stats.emissions, stats.discarded_bytes
    );

    if !is_clean_stop(&reason, replaying) {
        return Ok(ExitCode::FAILURE);
    }
    match reason {
        BridgeError::InterruptRequested => info!("Program terminated by user"),
        _ => info!("Replay finished"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Interrupts always end cleanly; end of input only does when replaying
fn is_clean_stop(reason: &BridgeError, replaying: bool) -> bool {
    match reason {
        BridgeError::InterruptRequested => true,
        BridgeError::Transport(TransportError::Closed) => replaying,
        _ => false,
    }
}
