//! Error Types.
//!
//! Every failure in the platform is surfaced to the top-level caller as an
//! [`Error`]. Hardware transactions are single-shot, so no layer retries or
//! swallows an error on its own.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for register, memory, control and simulation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The accelerator or its transport could not be brought up.
    #[error("accelerator initialization failed: {0}")]
    Initialization(String),

    /// A register read or write could not complete.
    #[error("register transport failure on '{register}': {reason}")]
    Transport { register: String, reason: String },

    #[error("out of accelerator memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },

    #[error("size mismatch: copy of {requested} bytes exceeds capacity of {capacity} bytes")]
    SizeMismatch { requested: usize, capacity: usize },

    #[error("invalid buffer handle #{0}")]
    InvalidHandle(u64),

    /// Verification found at least one observed value that differs from the expected one.
    #[error("results do not match: {failed} of {total} comparisons failed")]
    ResultMismatch { failed: usize, total: usize },

    #[error("timed out after {waited:?} waiting for '{register}'")]
    Timeout { register: String, waited: Duration },

    /// A control operation was issued in a state that does not permit it.
    #[error("cannot {operation} while accelerator is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    #[error("register '{0}' is read-only")]
    ReadOnlyRegister(String),

    #[error("value {value:#x} does not fit in {width}-bit register '{register}'")]
    ValueTooWide {
        register: String,
        value: u64,
        width: u32,
    },

    /// Circuit model evaluation failed; the simulation cannot continue.
    #[error("model evaluation failed at step {step}: {reason}")]
    Model { step: u64, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for failures to reach the accelerator at all.
    pub fn is_initialization(&self) -> bool {
        matches!(self, Error::Initialization(_))
    }
}
