//! CLI for the cacheprobe conditional-caching harness.

mod commands;

use anyhow::Result;
use cacheprobe_core::config::{self, ProbeConfig};
use cacheprobe_core::probe::{OutcomeMode, ValidatorKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_import, run_load, run_smoke, run_system};

/// Top-level CLI for the cacheprobe harness.
#[derive(Debug, Parser)]
#[command(name = "cacheprobe")]
#[command(about = "cacheprobe: conditional-caching conformance and load probe for DICOM archives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the two-phase load probe: baseline capture, then concurrent conditional probing.
    Run {
        /// Archive base URL (overrides config and CACHEPROBE_URL).
        #[arg(long)]
        url: Option<String>,

        /// Number of concurrent virtual workers.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Wall-clock probing budget in seconds.
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,

        /// Per-worker iteration budget (takes precedence over --duration).
        #[arg(long, value_name = "N")]
        iterations: Option<u64>,

        /// Validator kind to exercise: etag or last-modified.
        #[arg(long)]
        validator: Option<ValidatorKind>,

        /// Freshness judgement: strict, either, or auto (keyed on the default port).
        #[arg(long)]
        outcome: Option<OutcomeMode>,

        /// Abort an iteration at its first failed check.
        #[arg(long)]
        strict_fail: bool,
    },

    /// Single-worker, single-iteration conformance pass with the full scenario set.
    Smoke {
        /// Archive base URL (overrides config and CACHEPROBE_URL).
        #[arg(long)]
        url: Option<String>,

        /// Validator kind to exercise: etag or last-modified.
        #[arg(long)]
        validator: Option<ValidatorKind>,

        /// Freshness judgement: strict, either, or auto (keyed on the default port).
        #[arg(long)]
        outcome: Option<OutcomeMode>,
    },

    /// Upload DICOM files to the archive (POST /instances).
    Import {
        /// DICOM files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Archive base URL (overrides config and CACHEPROBE_URL).
        #[arg(long)]
        url: Option<String>,
    },

    /// Print the archive identity (GET /system).
    System {
        /// Archive base URL (overrides config and CACHEPROBE_URL).
        #[arg(long)]
        url: Option<String>,
    },
}

fn apply_overrides(
    cfg: &mut ProbeConfig,
    url: Option<String>,
    validator: Option<ValidatorKind>,
    outcome: Option<OutcomeMode>,
) {
    if let Some(url) = url {
        cfg.base_url = url;
    }
    if let Some(validator) = validator {
        cfg.validator = validator;
    }
    if let Some(outcome) = outcome {
        cfg.outcome = outcome;
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        config::apply_env(&mut cfg);
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                url,
                workers,
                duration,
                iterations,
                validator,
                outcome,
                strict_fail,
            } => {
                apply_overrides(&mut cfg, url, validator, outcome);
                if let Some(workers) = workers {
                    cfg.workers = workers;
                }
                if let Some(duration) = duration {
                    cfg.duration_secs = duration;
                }
                if iterations.is_some() {
                    cfg.iterations = iterations;
                }
                if strict_fail {
                    cfg.strict_fail = true;
                }
                run_load(&cfg).await?;
            }
            CliCommand::Smoke {
                url,
                validator,
                outcome,
            } => {
                apply_overrides(&mut cfg, url, validator, outcome);
                run_smoke(&cfg).await?;
            }
            CliCommand::Import { files, url } => {
                apply_overrides(&mut cfg, url, None, None);
                run_import(&cfg, files).await?;
            }
            CliCommand::System { url } => {
                apply_overrides(&mut cfg, url, None, None);
                run_system(&cfg).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
