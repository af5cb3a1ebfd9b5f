//! # Razmer2M Emulator Binary
//!
//! Runs the readout emulator on the host clock. Line activity is simulated
//! and traced; formatted axis frames go to stdout, logs to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Defaults, run until Ctrl-C
//! razmer_emulator
//!
//! # Config file, verbose logging, stop after 1000 scan cycles
//! razmer_emulator --config razmer_emulator/config/emulator.toml -v --cycles 1000
//!
//! # JSON logs, repeatable random frames
//! razmer_emulator --json --seed 42
//! ```

#![deny(warnings)]

use clap::Parser;
use razmer_common::config::{ConfigLoader, LogLevel};
use razmer_common::emulator::EmulatorConfig;
use razmer_common::link::FrameSink;
use razmer_emulator::core::HostCore;
use razmer_emulator::lines::SimulatedLines;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Razmer2M Emulator - linear-scale BCD readout and axis frame emulator
#[derive(Parser, Debug)]
#[command(name = "razmer_emulator")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Razmer2M linear-scale readout emulator")]
#[command(long_about = None)]
struct Args {
    /// Path to emulator.toml. Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Stop after this many scan cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Seed for the random axis algorithm
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// Writes each frame to stdout.
struct StdoutSink {
    out: std::io::Stdout,
    failed: bool,
}

impl FrameSink for StdoutSink {
    fn transmit(&mut self, line: &str) {
        if let Err(e) = self.out.write_all(line.as_bytes()) {
            if !self.failed {
                warn!("Failed to write frame: {}", e);
                self.failed = true;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Emulator startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => EmulatorConfig::load(path).map(Some),
        None => Ok(None),
    };
    let log_level = match &loaded {
        Ok(Some(config)) => config.shared.log_level,
        _ => LogLevel::default(),
    };
    setup_tracing(&args, log_level);

    let config = match (loaded?, &args.config) {
        (Some(config), Some(path)) => {
            info!("Loaded configuration from {:?}", path);
            config
        }
        _ => {
            info!("No configuration file, using defaults");
            EmulatorConfig::default()
        }
    };

    info!(
        "Razmer2M emulator v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    let invert = config.scan.invert_b_signals;
    let mut core = HostCore::on_host(config, SimulatedLines::new(invert), args.seed)?;

    let running = core.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let mut sink = StdoutSink {
        out: std::io::stdout(),
        failed: false,
    };
    let stats = core.run(&mut sink, args.cycles);
    core.shutdown();

    info!(
        "Razmer2M emulator shutdown complete ({} strobes, {} mutations)",
        stats.strobes, stats.mutations
    );
    Ok(())
}

/// Setup tracing subscriber from CLI arguments and the `[shared]` log level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        log_level.as_tracing_level()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
