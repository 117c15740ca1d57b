//! Reactor Accelerator Platform Library.
//!
//! This crate drives register-mapped hardware reactors from a host program and
//! simulates their clocked behaviour. It includes a typed register port over an
//! opaque transport, a shared accelerator memory pool, a single-shot
//! start/done control protocol, and a half-cycle clock driver with VCD tracing.
//!
//! # Architecture
//!
//! * **Host**: Register port, accelerator memory port, and control protocol.
//! * **Platform**: An in-process platform with behavioural reactor models.
//! * **Simulation**: Reset-hold sequencing, signal or budget termination, and waveforms.
//!
//! # Modules
//!
//! * `common`: Shared types, addresses, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `core`: Accelerator control protocol.
//! * `sim`: Clock driver, circuit models, tracing, and host scenarios.
//! * `soc`: Platform traits, register maps, and accelerator memory.
//! * `stats`: Simulation statistics collection.
//! * `system`: Reactor models attached to the simulated platform.
//! * `verify`: Result checking.

/// Shared types, register values, wide addresses, and error handling.
///
/// Provides the fundamental data structures and the error type used throughout
/// the crate.
pub mod common;

/// Configuration for the platform, the simulator, and the host.
///
/// Loads and parses TOML configuration files.
pub mod config;

/// Accelerator control protocol.
pub mod core;

/// Simulation clock driver, circuit models, tracing, and host scenarios.
pub mod sim;

/// Host platform capabilities, register ports, and the simulated platform.
///
/// Implements the register transport and accelerator memory seams, and the
/// in-process platform that routes register accesses to a reactor model.
pub mod soc;

/// Simulation statistics collection and reporting.
pub mod stats;

/// Reactor models.
pub mod system;

/// Verification of accelerator results against host-computed values.
pub mod verify;
