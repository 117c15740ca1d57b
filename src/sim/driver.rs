//! Simulation Clock Driver.
//!
//! Steps a [`CircuitModel`] one half-cycle at a time. Every step:
//!
//! 1. Asserts reset inside the reset-hold window, deasserts it afterwards.
//! 2. Toggles the clock.
//! 3. Evaluates the model once.
//! 4. Past the reset-hold window, evaluates the termination policy.
//! 5. Records one trace sample, if tracing.
//! 6. Advances the step counter.
//!
//! Termination is terminal: the trace is closed once, the model is dropped,
//! and any further step fails.

use super::clock::{SimulationClock, TerminationPolicy};
use super::model::CircuitModel;
use super::trace::TraceSink;
use crate::common::{Error, Result};
use crate::stats::{SimStats, Termination};
use log::{debug, info, warn};

/// Lifecycle of a driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    ResetHold,
    Running,
    Terminated,
}

impl DriverState {
    pub fn as_str(self) -> &'static str {
        match self {
            DriverState::ResetHold => "in reset",
            DriverState::Running => "running",
            DriverState::Terminated => "terminated",
        }
    }
}

pub struct ClockDriver<M: CircuitModel> {
    model: Option<M>,
    clock: SimulationClock,
    policy: TerminationPolicy,
    trace: Option<Box<dyn TraceSink>>,
    values: Vec<u64>,
    stats: SimStats,
    state: DriverState,
}

impl<M: CircuitModel> ClockDriver<M> {
    /// Creates a driver at step 0, in reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a step budget would end the run inside the
    /// reset-hold window, where termination is never evaluated.
    pub fn new(model: M, reset_hold: u64, policy: TerminationPolicy) -> Result<Self> {
        if let TerminationPolicy::Budget(budget) = policy {
            if budget <= reset_hold + 1 {
                return Err(Error::Config(format!(
                    "step budget {} must exceed the reset-hold window of {} steps",
                    budget,
                    reset_hold + 1
                )));
            }
        }
        debug!(
            "clock driver for {}: reset_hold={} policy={:?}",
            model.name(),
            reset_hold,
            policy
        );
        Ok(Self {
            model: Some(model),
            clock: SimulationClock::new(reset_hold),
            policy,
            trace: None,
            values: Vec::new(),
            stats: SimStats::default(),
            state: DriverState::ResetHold,
        })
    }

    /// Attaches a trace sink that receives one sample per step.
    pub fn with_trace(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Returns the model, or `None` once the driver has terminated.
    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    /// Executes one half-cycle step and returns the resulting state.
    ///
    /// # Errors
    ///
    /// A model evaluation or trace failure is fatal: the driver terminates
    /// and the error is returned. Stepping a terminated driver fails with
    /// [`Error::InvalidState`].
    pub fn step(&mut self) -> Result<DriverState> {
        let step = self.clock.now();
        let in_reset = self.clock.in_reset();

        let Some(model) = self.model.as_mut() else {
            return Err(Error::InvalidState {
                operation: "step",
                state: self.state.as_str(),
            });
        };

        model.set_reset(in_reset);
        let level = !model.clock();
        model.set_clock(level);
        let evaluated = model.eval().map_err(|e| model_error(e, step));

        let mut ended = None;
        if evaluated.is_ok() && !in_reset {
            ended = match self.policy {
                TerminationPolicy::Signal => model.terminate().then_some(Termination::Signal),
                TerminationPolicy::Budget(budget) => {
                    (step + 1 >= budget).then_some(Termination::Budget)
                }
            };
        }

        let traced = match (&evaluated, self.trace.as_mut()) {
            (Ok(()), Some(trace)) => {
                self.values.clear();
                model.sample(&mut self.values);
                trace.sample(step, &self.values).map(|_| true)
            }
            _ => Ok(false),
        };

        match evaluated.and(traced) {
            Ok(true) => self.stats.trace_samples += 1,
            Ok(false) => {}
            Err(e) => {
                self.abort(step);
                return Err(e);
            }
        }

        self.stats.steps += 1;
        if in_reset {
            self.stats.reset_steps += 1;
        }
        if level {
            self.stats.rising_edges += 1;
        }
        self.clock.advance();

        self.state = match ended {
            Some(reason) => {
                self.finish(Some(reason))?;
                DriverState::Terminated
            }
            None if self.clock.in_reset() => DriverState::ResetHold,
            None => DriverState::Running,
        };
        Ok(self.state)
    }

    /// Steps until the run terminates and returns its statistics.
    pub fn run(mut self) -> Result<SimStats> {
        while self.step()? != DriverState::Terminated {}
        Ok(self.stats)
    }

    /// Closes the trace and releases the model.
    fn finish(&mut self, reason: Option<Termination>) -> Result<()> {
        self.state = DriverState::Terminated;
        self.model = None;
        self.stats.finish(reason);
        match reason {
            Some(reason) => info!(
                "simulation terminated by {:?} after {} steps",
                reason, self.stats.steps
            ),
            None => warn!("simulation aborted after {} steps", self.stats.steps),
        }
        match self.trace.take() {
            Some(trace) => trace.close(),
            None => Ok(()),
        }
    }

    /// Terminates after a fatal error. A close failure is only logged.
    fn abort(&mut self, step: u64) {
        if let Err(e) = self.finish(None) {
            warn!("failed to close trace after fatal error at step {}: {}", step, e);
        }
    }
}

fn model_error(err: Error, step: u64) -> Error {
    match err {
        Error::Model { .. } => err,
        other => Error::Model {
            step,
            reason: other.to_string(),
        },
    }
}
