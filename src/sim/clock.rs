//! Simulated Time.
//!
//! The simulation clock is a plain value owned by the clock driver. It counts
//! half-cycle steps and knows how long the circuit is held in reset after
//! power-up.

/// How the driver decides that a simulation has finished.
///
/// The two policies are mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// Stop when the model asserts its termination output after reset.
    Signal,

    /// Run exactly this many steps, ignoring the termination output.
    Budget(u64),
}

/// Monotonic step counter with a reset-hold window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationClock {
    now: u64,
    reset_hold: u64,
}

impl SimulationClock {
    /// Creates a clock at step 0.
    ///
    /// Reset is held while the step counter is at most `reset_hold`.
    pub fn new(reset_hold: u64) -> Self {
        Self { now: 0, reset_hold }
    }

    /// Returns the current step.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn reset_hold(&self) -> u64 {
        self.reset_hold
    }

    /// Returns `true` while the current step lies inside the reset-hold window.
    pub fn in_reset(&self) -> bool {
        self.now <= self.reset_hold
    }

    pub(crate) fn advance(&mut self) {
        self.now += 1;
    }
}
