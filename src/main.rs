//! Standalone Reactor Simulator CLI.
//!
//! Steps the standalone reactor circuit through its reset-hold window and
//! lets it run until it asserts `io_terminate`, or for a fixed number of
//! steps when `--timeout` is given.
//!
//! # Usage
//!
//! ```text
//! reactor-sim [--trace] [--timeout <STEPS>] [--config <FILE>] [--stats-json <FILE>]
//! ```
//!
//! With `--trace`, a VCD waveform is written to the configured trace path
//! (`waveform.vcd` by default).

use clap::Parser;
use log::error;
use std::path::{Path, PathBuf};
use std::{fs, process};

use reactor_platform::common::Result;
use reactor_platform::config::Config;
use reactor_platform::sim::{
    CircuitModel, ClockDriver, StandaloneReactor, TerminationPolicy, VcdTrace,
};
use reactor_platform::stats::SimStats;

/// Command-line arguments for the standalone simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Standalone Reactor Simulator")]
struct Args {
    /// Record a VCD waveform of every step.
    #[arg(long)]
    trace: bool,

    /// Run exactly this many steps instead of waiting for `io_terminate`.
    #[arg(long, value_name = "STEPS")]
    timeout: Option<u64>,

    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the run statistics as JSON.
    #[arg(long, value_name = "FILE")]
    stats_json: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    match simulate(&args) {
        Ok(stats) => {
            stats.print();
            if let Some(path) = &args.stats_json {
                if let Err(e) = write_stats(path, &stats) {
                    error!("{}", e);
                    process::exit(1);
                }
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            process::exit(1);
        }
    }
}

/// Builds the model and driver from the arguments and runs to termination.
fn simulate(args: &Args) -> Result<SimStats> {
    let config = Config::load(args.config.as_deref())?;
    let sim = &config.simulation;

    let model = StandaloneReactor::new(sim.terminate_after);
    let policy = match args.timeout {
        Some(steps) => TerminationPolicy::Budget(steps),
        None => TerminationPolicy::Signal,
    };

    let scope = model.name().to_string();
    let signals = model.signals();
    let mut driver = ClockDriver::new(model, sim.reset_hold, policy)?;

    if args.trace {
        println!("Tracing enabled");
        let vcd = VcdTrace::create(Path::new(&sim.trace_path), &scope, &signals)?;
        driver = driver.with_trace(Box::new(vcd));
    }
    driver.run()
}

fn write_stats(path: &Path, stats: &SimStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(std::io::Error::from)?;
    fs::write(path, json)?;
    Ok(())
}
