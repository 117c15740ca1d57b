//! Reactor Host CLI.
//!
//! Brings up the simulated platform with one reactor, runs its host scenario
//! and checks the results.
//!
//! # Exit codes
//!
//! * `0`: results matched.
//! * `-2`: the configuration, platform or accelerator could not be initialized.
//! * `1`: `top` produced wrong results, or any other failure.
//! * `-1`: `vadd` produced wrong results.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use reactor_platform::common::{Error, Result};
use reactor_platform::config::Config;
use reactor_platform::core::Accelerator;
use reactor_platform::sim::scenarios::{self, TOP_INPUT, VADD_INPUTS};
use reactor_platform::soc::{init_platform, SimPlatform};
use reactor_platform::system::ReactorKind;
use reactor_platform::verify::VerificationReport;

/// Command-line arguments for the host program.
#[derive(Parser, Debug)]
#[command(author, version, about = "Reactor Accelerator Host")]
struct Args {
    /// Reactor to attach to.
    #[arg(short, long, value_enum, default_value = "top")]
    reactor: ReactorKind,

    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up waiting for `done` after this many milliseconds.
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,

    /// Print the verification report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[!] {}", e);
            process::exit(-2);
        }
    };

    let mut accel = match attach(&config, args.reactor) {
        Ok(accel) => accel,
        Err(e) => {
            eprintln!("[!] {}", e);
            process::exit(if e.is_initialization() { -2 } else { 1 });
        }
    };

    let deadline = args
        .deadline_ms
        .or(config.host.poll_deadline_ms)
        .map(Duration::from_millis);

    let report = match args.reactor {
        ReactorKind::Top => scenarios::run_top_reactor(&mut accel, TOP_INPUT, deadline),
        ReactorKind::Vadd => {
            let inputs: Vec<u64> = (0..VADD_INPUTS as u64).collect();
            scenarios::run_vadd(&mut accel, &inputs, deadline)
        }
        ReactorKind::Signature => match scenarios::read_signature(&mut accel) {
            Ok(signature) => {
                println!("signature: {:#x}", signature);
                process::exit(0);
            }
            Err(e) => Err(e),
        },
    };

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            eprintln!("[!] {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = emit(&report, args.json) {
        eprintln!("[!] {}", e);
        process::exit(1);
    }

    if let Err(e) = report.into_result() {
        eprintln!("[!] {}", e);
        process::exit(match args.reactor {
            ReactorKind::Vadd => -1,
            _ => 1,
        });
    }
}

fn attach(config: &Config, kind: ReactorKind) -> Result<Accelerator<SimPlatform>> {
    let platform = init_platform(config, kind)?;
    Accelerator::attach(platform, kind.register_map())
}

fn emit(report: &VerificationReport, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| Error::Io(std::io::Error::from(e)))?;
        println!("{}", text);
    } else {
        report.print();
    }
    Ok(())
}
