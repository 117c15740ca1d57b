use crate::common::{Error, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_MEM_BASE: u64 = 0x1000_0000;
const DEFAULT_MEM_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_ALIGNMENT: usize = 64;
const DEFAULT_CYCLES_PER_ACCESS: u64 = 1;

const RESET_HOLD: u64 = 2;
const TRACE_PATH: &str = "waveform.vcd";
const TERMINATE_AFTER: u64 = 8;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub host: HostConfig,
}

impl Config {
    /// Loads the configuration from a TOML file, or the defaults if `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read '{}': {}", path.display(), e))
                })?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("cannot parse '{}': {}", path.display(), e)))?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the platform cannot be built with.
    pub fn validate(&self) -> Result<()> {
        if self.platform.mem_size_val() == 0 {
            return Err(Error::Config("accelerator memory pool is empty".into()));
        }
        let base = self.platform.mem_base_val();
        let size = self.platform.mem_size_val();
        if base.checked_add(size as u64).is_none() {
            return Err(Error::Config(format!(
                "memory pool at {:#x} of {:#x} bytes overflows the address space",
                base, size
            )));
        }
        if !self.platform.alignment.is_power_of_two() {
            return Err(Error::Config(format!(
                "alignment {} is not a power of two",
                self.platform.alignment
            )));
        }
        if self.platform.cycles_per_access == 0 {
            return Err(Error::Config("cycles_per_access must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_mem_base")]
    pub mem_base: String,

    #[serde(default = "default_mem_size")]
    pub mem_size: String,

    #[serde(default = "default_alignment")]
    pub alignment: usize,

    /// Clock cycles the reactor model advances per register access.
    #[serde(default = "default_cycles_per_access")]
    pub cycles_per_access: u64,
}

impl PlatformConfig {
    pub fn mem_base_val(&self) -> u64 {
        parse_hex(&self.mem_base, DEFAULT_MEM_BASE)
    }

    pub fn mem_size_val(&self) -> usize {
        parse_hex(&self.mem_size, DEFAULT_MEM_SIZE as u64) as usize
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            mem_base: default_mem_base(),
            mem_size: default_mem_size(),
            alignment: default_alignment(),
            cycles_per_access: default_cycles_per_access(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Steps held in reset; termination is not evaluated while `step <= reset_hold`.
    #[serde(default = "default_reset_hold")]
    pub reset_hold: u64,

    #[serde(default = "default_trace_path")]
    pub trace_path: String,

    /// Rising edges after reset before the standalone model asserts `io_terminate`.
    #[serde(default = "default_terminate_after")]
    pub terminate_after: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            reset_hold: default_reset_hold(),
            trace_path: default_trace_path(),
            terminate_after: default_terminate_after(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct HostConfig {
    /// Optional completion deadline; polling blocks indefinitely when absent.
    #[serde(default)]
    pub poll_deadline_ms: Option<u64>,
}

fn parse_hex(s: &str, default: u64) -> u64 {
    let digits = s.trim_start_matches("0x").replace('_', "");
    match u64::from_str_radix(&digits, 16) {
        Ok(val) => val,
        Err(_) => {
            warn!("invalid hex value '{}', using default {:#x}", s, default);
            default
        }
    }
}

fn default_mem_base() -> String {
    format!("{:#x}", DEFAULT_MEM_BASE)
}

fn default_mem_size() -> String {
    format!("{:#x}", DEFAULT_MEM_SIZE)
}

fn default_alignment() -> usize {
    DEFAULT_ALIGNMENT
}

fn default_cycles_per_access() -> u64 {
    DEFAULT_CYCLES_PER_ACCESS
}

fn default_reset_hold() -> u64 {
    RESET_HOLD
}

fn default_trace_path() -> String {
    TRACE_PATH.to_string()
}

fn default_terminate_after() -> u64 {
    TERMINATE_AFTER
}
