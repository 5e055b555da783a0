//! Run the probing phase across concurrent workers (phase 2).
//!
//! Workers share the immutable `ProbeSet` by reference and keep no mutable
//! state in common; each runs iterations until the wall-clock or iteration
//! budget is exhausted. The budget is checked before each iteration, so no
//! new iteration starts after exhaustion while in-flight requests complete.
//! curl is blocking, so workers run on the blocking pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::task::JoinSet;

use super::run::{run_iteration, ProbeOptions};
use super::{ProbeSet, Scenario};
use crate::archive::ArchiveClient;
use crate::report::{ProbeReporter, RunReport};

/// Worker-pool size, budget and scenario set for one run.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub workers: usize,
    /// Wall-clock budget; iterations stop starting once it elapses.
    pub duration: Option<Duration>,
    /// Per-worker iteration budget; takes precedence over `duration`.
    pub iterations: Option<u64>,
    pub probe: ProbeOptions,
    pub scenarios: Vec<Scenario>,
}

/// Run `opts.workers` concurrent workers over the shared probe set and merge
/// their reports. With no budget at all, each worker runs exactly one
/// iteration so a misconfigured run still terminates.
pub async fn run_workers(
    archive: Arc<ArchiveClient>,
    set: Arc<ProbeSet>,
    opts: WorkerOptions,
    reporter: Arc<dyn ProbeReporter>,
) -> Result<RunReport> {
    let workers = opts.workers.max(1);
    let deadline = opts.duration.map(|d| Instant::now() + d);
    let iterations = match (opts.iterations, deadline) {
        (Some(n), _) => Some(n),
        (None, None) => Some(1),
        (None, Some(_)) => None,
    };

    tracing::info!(
        workers,
        studies = set.records.len(),
        duration_secs = opts.duration.map(|d| d.as_secs()),
        iterations,
        "starting probing phase"
    );

    let mut join_set = JoinSet::new();
    for worker in 0..workers {
        let archive = Arc::clone(&archive);
        let set = Arc::clone(&set);
        let reporter = Arc::clone(&reporter);
        let probe = opts.probe.clone();
        let scenarios = opts.scenarios.clone();
        join_set.spawn_blocking(move || {
            let mut report = RunReport::default();
            let mut iteration = 0u64;
            loop {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        break;
                    }
                }
                if let Some(max) = iterations {
                    if iteration >= max {
                        break;
                    }
                }
                iteration += 1;
                run_iteration(
                    &archive,
                    &set,
                    &scenarios,
                    &probe,
                    worker,
                    iteration,
                    reporter.as_ref(),
                    &mut report,
                );
            }
            report.iterations = iteration;
            report
        });
    }

    let mut merged = RunReport::default();
    while let Some(res) = join_set.join_next().await {
        let report = res.map_err(|e| anyhow::anyhow!("worker task join: {}", e))?;
        merged.merge(report);
    }

    tracing::info!(
        checks = merged.checks,
        failures = merged.failures,
        "probing phase finished"
    );
    Ok(merged)
}
