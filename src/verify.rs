//! Result Verification.
//!
//! Compares values read back from an accelerator with values computed on the
//! host. Every comparison is recorded so that a failing run can report all
//! mismatches, not only the first.

use crate::common::{Error, Result};
use log::warn;
use serde::Serialize;
use std::fmt::Display;

/// One observed/expected pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub label: String,
    pub observed: u64,
    pub expected: u64,
    pub passed: bool,
}

/// Outcome of checking an accelerator's results.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerificationReport {
    pub reactor: String,
    pub comparisons: Vec<Comparison>,
    /// Extra figures reported alongside the results, such as a cycle count.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<(String, u64)>,
}

impl VerificationReport {
    pub fn new(reactor: impl Into<String>) -> Self {
        Self {
            reactor: reactor.into(),
            ..Default::default()
        }
    }

    /// Records one comparison and returns whether it passed.
    pub fn check(&mut self, label: impl Into<String>, observed: u64, expected: u64) -> bool {
        let label = label.into();
        let passed = observed == expected;
        if !passed {
            warn!(
                "{}: {} = {} (expected {})",
                self.reactor, label, observed, expected
            );
        }
        self.comparisons.push(Comparison {
            label,
            observed,
            expected,
            passed,
        });
        passed
    }

    pub fn metric(&mut self, name: impl Into<String>, value: u64) {
        self.metrics.push((name.into(), value));
    }

    /// Returns `true` if every comparison passed.
    pub fn success(&self) -> bool {
        self.comparisons.iter().all(|c| c.passed)
    }

    pub fn failed(&self) -> usize {
        self.comparisons.iter().filter(|c| !c.passed).count()
    }

    pub fn total(&self) -> usize {
        self.comparisons.len()
    }

    /// Converts a failing report into [`Error::ResultMismatch`].
    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::ResultMismatch {
                failed: self.failed(),
                total: self.total(),
            })
        }
    }

    /// Prints one line per comparison.
    pub fn print(&self) {
        for c in &self.comparisons {
            let mark = if c.passed { "ok" } else { "MISMATCH" };
            println!(
                "{:<12} {:>12} (expected {:>12})  {}",
                c.label, c.observed, c.expected, mark
            );
        }
        for (name, value) in &self.metrics {
            println!("{:<12} {:>12}", name, value);
        }
        println!(
            "{}: {}/{} correct",
            self.reactor,
            self.total() - self.failed(),
            self.total()
        );
    }
}

/// Checks every observed value against a host-side reference.
pub fn verify<K, I, F>(reactor: &str, observed: I, mut expected: F) -> VerificationReport
where
    K: Display,
    I: IntoIterator<Item = (K, u64)>,
    F: FnMut(&K) -> u64,
{
    let mut report = VerificationReport::new(reactor);
    for (key, value) in observed {
        let want = expected(&key);
        report.check(key.to_string(), value, want);
    }
    report
}
