//! `cacheprobe run` – two-phase load probe against the archive.

use anyhow::{Context, Result};
use cacheprobe_core::archive::DEFAULT_PORT;
use cacheprobe_core::config::ProbeConfig;
use cacheprobe_core::probe::{self, ProbeOptions, Scenario, WorkerOptions};
use cacheprobe_core::report::TracingReporter;
use std::sync::Arc;
use std::time::Duration;

use super::{build_client, finish_report};

pub async fn run_load(cfg: &ProbeConfig) -> Result<()> {
    let archive = Arc::new(build_client(cfg)?);
    let pacing = Duration::from_secs_f64(cfg.pacing_secs);
    let kind = cfg.validator;

    // Phase 1: discovery and baseline capture, once, before any worker starts.
    let set = {
        let archive = Arc::clone(&archive);
        tokio::task::spawn_blocking(move || probe::discover(&archive, kind, pacing))
            .await
            .context("discovery task join")??
    };
    tracing::info!(studies = set.records.len(), "baseline capture complete");
    let set = Arc::new(set);

    // Phase 2: concurrent conditional probing.
    let opts = WorkerOptions {
        workers: cfg.workers,
        duration: if cfg.iterations.is_some() {
            None
        } else {
            Some(Duration::from_secs(cfg.duration_secs))
        },
        iterations: cfg.iterations,
        probe: ProbeOptions {
            mode: cfg.outcome,
            on_default_port: archive.port() == Some(DEFAULT_PORT),
            pacing,
            strict_fail: cfg.strict_fail,
        },
        scenarios: Scenario::load_set(),
    };

    let report = probe::run_workers(archive, set, opts, Arc::new(TracingReporter)).await?;
    finish_report(&report)
}
