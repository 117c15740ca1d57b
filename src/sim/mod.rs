//! Simulation harness.
//!
//! The clock driver that steps a circuit model through reset and free-running
//! operation with optional waveform tracing, and the host scenarios that run
//! complete transactions against the reactor models.

/// Simulated time and termination policies.
pub mod clock;

/// Half-cycle stepping loop.
pub mod driver;

/// Circuit models the driver can step.
pub mod model;

/// End-to-end host transactions.
pub mod scenarios;

/// Waveform trace sinks.
pub mod trace;

pub use clock::{SimulationClock, TerminationPolicy};
pub use driver::{ClockDriver, DriverState};
pub use model::{CircuitModel, SignalSpec, StandaloneReactor};
pub use trace::{TraceSink, VcdTrace};
