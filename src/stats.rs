//! Simulation statistics collection and reporting.
//!
//! Tracks step counts, reset behaviour, trace output, and how the run ended.

use serde::Serialize;
use std::time::Instant;

/// Policy that ended a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model asserted its termination output after reset.
    Signal,
    /// The configured step budget was exhausted.
    Budget,
}

/// Statistics of one clock driver run.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Wall-clock time of the run, filled in when the run ends.
    pub host_seconds: f64,
    pub steps: u64,
    pub reset_steps: u64,
    pub rising_edges: u64,
    pub trace_samples: u64,
    pub termination: Option<Termination>,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            host_seconds: 0.0,
            steps: 0,
            reset_steps: 0,
            rising_edges: 0,
            trace_samples: 0,
            termination: None,
        }
    }
}

impl SimStats {
    /// Records the end of the run.
    pub(crate) fn finish(&mut self, termination: Option<Termination>) {
        self.termination = termination;
        self.host_seconds = self.start_time.elapsed().as_secs_f64();
    }

    /// Prints a formatted summary of the run.
    pub fn print(&self) {
        let seconds = if self.host_seconds > 0.0 {
            self.host_seconds
        } else {
            self.start_time.elapsed().as_secs_f64()
        };
        let khz = if seconds > 0.0 {
            (self.rising_edges as f64 / seconds) / 1000.0
        } else {
            0.0
        };
        let ended = match self.termination {
            Some(Termination::Signal) => "signal",
            Some(Termination::Budget) => "budget",
            None => "aborted",
        };

        println!("\n==========================================================");
        println!("REACTOR SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_steps                {}", self.steps);
        println!("sim_cycles               {}", self.rising_edges);
        println!("sim_freq                 {:.2} kHz", khz);
        println!(
            "reset_steps              {} ({:.2}%)",
            self.reset_steps,
            (self.reset_steps as f64 / self.steps.max(1) as f64) * 100.0
        );
        println!("trace_samples            {}", self.trace_samples);
        println!("terminated_by            {}", ended);
        println!("==========================================================");
    }
}
