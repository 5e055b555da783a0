//! Check reporting: structured per-probe events and end-of-run aggregation.
//!
//! Workers hand every probe outcome to a `ProbeReporter` (the live sink) and
//! to a `RunReport` (the aggregate the CLI prints and exits on). Console
//! output never happens here.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Failures kept verbatim in the report; the counters keep counting beyond this.
const MAX_RETAINED_FAILURES: usize = 100;

/// Outcome of one probe against one study.
#[derive(Debug, Clone)]
pub struct CheckEvent {
    pub worker: usize,
    pub iteration: u64,
    pub study_id: String,
    pub scenario: &'static str,
    /// Rendered allowed statuses, e.g. "304" or "200 or 304".
    pub expected: String,
    /// Observed status; None on transport failure.
    pub status: Option<u32>,
    pub error: Option<String>,
    pub passed: bool,
}

impl CheckEvent {
    fn describe(&self) -> String {
        match (self.status, &self.error) {
            (Some(status), _) => format!(
                "worker {} study {} scenario {}: expected {}, got {}",
                self.worker, self.study_id, self.scenario, self.expected, status
            ),
            (None, Some(err)) => format!(
                "worker {} study {} scenario {}: transport failure: {}",
                self.worker, self.study_id, self.scenario, err
            ),
            (None, None) => format!(
                "worker {} study {} scenario {}: no response",
                self.worker, self.study_id, self.scenario
            ),
        }
    }
}

/// Live sink for probe events, decoupled from aggregation and console output.
pub trait ProbeReporter: Send + Sync {
    fn record(&self, event: &CheckEvent);
}

/// Default reporter: one structured tracing line per check.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl ProbeReporter for TracingReporter {
    fn record(&self, event: &CheckEvent) {
        if event.passed {
            tracing::debug!(
                worker = event.worker,
                study = %event.study_id,
                scenario = event.scenario,
                status = ?event.status,
                "check passed"
            );
        } else {
            tracing::warn!(
                worker = event.worker,
                study = %event.study_id,
                scenario = event.scenario,
                expected = %event.expected,
                status = ?event.status,
                error = ?event.error,
                "check failed"
            );
        }
    }
}

/// Per-scenario pass/fail counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioStats {
    pub passed: u64,
    pub failed: u64,
}

/// Aggregated result of a probe run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub checks: u64,
    pub failures: u64,
    /// Iterations completed or started across all workers.
    pub iterations: u64,
    pub by_scenario: BTreeMap<&'static str, ScenarioStats>,
    /// Retained failed checks, capped at `MAX_RETAINED_FAILURES`.
    pub failed: Vec<CheckEvent>,
}

impl RunReport {
    pub fn record(&mut self, event: CheckEvent) {
        self.checks += 1;
        let stats = self.by_scenario.entry(event.scenario).or_default();
        if event.passed {
            stats.passed += 1;
        } else {
            stats.failed += 1;
            self.failures += 1;
            if self.failed.len() < MAX_RETAINED_FAILURES {
                self.failed.push(event);
            }
        }
    }

    /// Fold another worker's report into this one.
    pub fn merge(&mut self, other: RunReport) {
        self.checks += other.checks;
        self.failures += other.failures;
        self.iterations += other.iterations;
        for (scenario, stats) in other.by_scenario {
            let entry = self.by_scenario.entry(scenario).or_default();
            entry.passed += stats.passed;
            entry.failed += stats.failed;
        }
        for event in other.failed {
            if self.failed.len() >= MAX_RETAINED_FAILURES {
                break;
            }
            self.failed.push(event);
        }
    }

    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    /// Human-readable multi-line summary for the CLI.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} checks, {} failed, {} iterations",
            self.checks, self.failures, self.iterations
        );
        for (scenario, stats) in &self.by_scenario {
            let _ = writeln!(
                out,
                "  {:<20} {:>6} passed  {:>6} failed",
                scenario, stats.passed, stats.failed
            );
        }
        if !self.failed.is_empty() {
            let _ = writeln!(out, "failures:");
            for event in &self.failed {
                let _ = writeln!(out, "  {}", event.describe());
            }
            if self.failures as usize > self.failed.len() {
                let _ = writeln!(
                    out,
                    "  ... and {} more",
                    self.failures as usize - self.failed.len()
                );
            }
        }
        out.trim_end().to_string()
    }
}
