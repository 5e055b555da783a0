//! One probing iteration: every record × scenario, with pacing and strict-fail.

use std::time::Duration;

use chrono::Utc;

use super::{OutcomeMode, ProbeSet, Scenario};
use crate::archive::ArchiveClient;
use crate::report::{CheckEvent, ProbeReporter, RunReport};

/// Per-probe judgement and pacing settings, shared by all workers.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub mode: OutcomeMode,
    /// True when the configured base URL targets the default archive port.
    pub on_default_port: bool,
    /// Fixed inter-request delay per worker.
    pub pacing: Duration,
    /// Abort the iteration at its first failed check.
    pub strict_fail: bool,
}

/// How an iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    Completed,
    /// Strict-fail mode stopped the iteration early; remaining records skipped.
    Aborted,
}

/// Run one iteration for one worker. A failed check is recorded, not raised;
/// transport errors count as failed checks. Blocking (curl plus pacing sleeps);
/// call from `spawn_blocking` if used from async code.
#[allow(clippy::too_many_arguments)]
pub fn run_iteration(
    archive: &ArchiveClient,
    set: &ProbeSet,
    scenarios: &[Scenario],
    opts: &ProbeOptions,
    worker: usize,
    iteration: u64,
    reporter: &dyn ProbeReporter,
    report: &mut RunReport,
) -> IterationOutcome {
    for record in &set.records {
        for scenario in scenarios {
            let conditional = scenario.conditional(record, Utc::now());
            let expected = scenario.expected(opts.mode, opts.on_default_port);

            if let Some(cond) = &conditional {
                tracing::debug!(
                    study = %record.study_id,
                    scenario = scenario.name(),
                    header = cond.name(),
                    value = cond.value(),
                    "sending conditional probe"
                );
            }

            let event = match archive.shared_tags(&record.study_id, conditional.as_ref()) {
                Ok(res) => {
                    tracing::debug!(
                        study = %record.study_id,
                        scenario = scenario.name(),
                        status = res.status,
                        etag = ?res.headers.etag(),
                        last_modified = ?res.headers.last_modified(),
                        "probe response"
                    );
                    CheckEvent {
                        worker,
                        iteration,
                        study_id: record.study_id.clone(),
                        scenario: scenario.name(),
                        expected: expected.to_string(),
                        status: Some(res.status),
                        error: None,
                        passed: expected.matches(res.status),
                    }
                }
                Err(err) => CheckEvent {
                    worker,
                    iteration,
                    study_id: record.study_id.clone(),
                    scenario: scenario.name(),
                    expected: expected.to_string(),
                    status: None,
                    error: Some(err.to_string()),
                    passed: false,
                },
            };

            reporter.record(&event);
            let passed = event.passed;
            report.record(event);

            if !passed && opts.strict_fail {
                tracing::warn!(
                    worker,
                    study = %record.study_id,
                    scenario = scenario.name(),
                    "strict-fail: aborting iteration"
                );
                return IterationOutcome::Aborted;
            }

            std::thread::sleep(opts.pacing);
        }
    }
    IterationOutcome::Completed
}
