//! `cacheprobe smoke` – single-worker conformance pass.

use anyhow::{Context, Result};
use cacheprobe_core::archive::DEFAULT_PORT;
use cacheprobe_core::config::ProbeConfig;
use cacheprobe_core::probe::{self, ProbeOptions, Scenario, WorkerOptions};
use cacheprobe_core::report::TracingReporter;
use std::sync::Arc;
use std::time::Duration;

use super::{build_client, finish_report};

/// One worker, one iteration, full scenario set for the configured validator
/// kind (staleness pair for Last-Modified, If-Match probe for ETag).
pub async fn run_smoke(cfg: &ProbeConfig) -> Result<()> {
    let archive = Arc::new(build_client(cfg)?);
    let pacing = Duration::from_secs_f64(cfg.pacing_secs);
    let kind = cfg.validator;

    let set = {
        let archive = Arc::clone(&archive);
        tokio::task::spawn_blocking(move || probe::discover(&archive, kind, pacing))
            .await
            .context("discovery task join")??
    };
    let set = Arc::new(set);

    let opts = WorkerOptions {
        workers: 1,
        duration: None,
        iterations: Some(1),
        probe: ProbeOptions {
            mode: cfg.outcome,
            on_default_port: archive.port() == Some(DEFAULT_PORT),
            pacing,
            strict_fail: cfg.strict_fail,
        },
        scenarios: Scenario::conformance_set(kind),
    };

    let report = probe::run_workers(archive, set, opts, Arc::new(TracingReporter)).await?;
    finish_report(&report)
}
