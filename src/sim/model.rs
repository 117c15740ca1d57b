//! Circuit Models.
//!
//! The clock driver is independent of how a circuit is evaluated. A model
//! exposes its clock and reset inputs, a single evaluation entry point, an
//! optional termination output, and the signals it wants recorded in a
//! waveform trace.

use crate::common::Result;

/// A signal recorded in the waveform trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalSpec {
    pub name: &'static str,
    pub width: u32,
}

impl SignalSpec {
    pub const fn new(name: &'static str, width: u32) -> Self {
        Self { name, width }
    }
}

/// A cycle-accurate circuit the clock driver can step.
pub trait CircuitModel {
    /// Returns the top-level module name, used as the trace scope.
    fn name(&self) -> &str;

    /// Drives the reset input.
    fn set_reset(&mut self, active: bool);

    /// Returns the current level of the clock input.
    fn clock(&self) -> bool;

    /// Drives the clock input.
    fn set_clock(&mut self, level: bool);

    /// Evaluates the circuit for the current inputs.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the simulation run.
    fn eval(&mut self) -> Result<()>;

    /// Returns the termination output. Models without one return `false`.
    fn terminate(&self) -> bool {
        false
    }

    /// Lists the signals recorded by [`sample`](Self::sample), in order.
    fn signals(&self) -> Vec<SignalSpec>;

    /// Appends the current value of every traced signal to `out`.
    fn sample(&self, out: &mut Vec<u64>);
}

/// Standalone reactor circuit.
///
/// Counts rising clock edges once out of reset and asserts `io_terminate`
/// after `terminate_after` of them.
pub struct StandaloneReactor {
    clock: bool,
    last_clock: bool,
    reset: bool,
    cycles: u64,
    terminate_after: u64,
    io_terminate: bool,
}

const SIGNALS: [SignalSpec; 4] = [
    SignalSpec::new("clock", 1),
    SignalSpec::new("reset", 1),
    SignalSpec::new("cycles", 32),
    SignalSpec::new("io_terminate", 1),
];

impl StandaloneReactor {
    pub fn new(terminate_after: u64) -> Self {
        Self {
            clock: false,
            last_clock: false,
            reset: false,
            cycles: 0,
            terminate_after,
            io_terminate: false,
        }
    }

    /// Returns the number of rising edges counted since reset was released.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl CircuitModel for StandaloneReactor {
    fn name(&self) -> &str {
        "ReactorChisel"
    }

    fn set_reset(&mut self, active: bool) {
        self.reset = active;
    }

    fn clock(&self) -> bool {
        self.clock
    }

    fn set_clock(&mut self, level: bool) {
        self.clock = level;
    }

    fn eval(&mut self) -> Result<()> {
        let rising = self.clock && !self.last_clock;
        self.last_clock = self.clock;

        if rising {
            if self.reset {
                self.cycles = 0;
            } else {
                self.cycles += 1;
            }
        }
        self.io_terminate = !self.reset && self.cycles >= self.terminate_after;
        Ok(())
    }

    fn terminate(&self) -> bool {
        self.io_terminate
    }

    fn signals(&self) -> Vec<SignalSpec> {
        SIGNALS.to_vec()
    }

    fn sample(&self, out: &mut Vec<u64>) {
        out.push(self.clock as u64);
        out.push(self.reset as u64);
        out.push(self.cycles & 0xffff_ffff);
        out.push(self.io_terminate as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_step(model: &mut StandaloneReactor, reset: bool) {
        model.set_reset(reset);
        let level = !model.clock();
        model.set_clock(level);
        model.eval().unwrap();
    }

    #[test]
    fn counts_rising_edges_out_of_reset() {
        let mut model = StandaloneReactor::new(3);
        for _ in 0..4 {
            half_step(&mut model, true);
        }
        assert_eq!(model.cycles(), 0);
        assert!(!model.terminate());

        for _ in 0..5 {
            half_step(&mut model, false);
        }
        assert_eq!(model.cycles(), 3);
        assert!(model.terminate());
    }

    #[test]
    fn reset_clears_termination() {
        let mut model = StandaloneReactor::new(0);
        half_step(&mut model, true);
        assert!(!model.terminate());
        half_step(&mut model, false);
        assert!(model.terminate());
    }

    #[test]
    fn sample_matches_signal_list() {
        let model = StandaloneReactor::new(1);
        let mut values = Vec::new();
        model.sample(&mut values);
        assert_eq!(values.len(), model.signals().len());
    }
}
