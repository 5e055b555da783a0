//! CLI command handlers. Each command is in its own file for clarity.

mod import;
mod run;
mod smoke;
mod system;

pub use import::run_import;
pub use run::run_load;
pub use smoke::run_smoke;
pub use system::run_system;

use anyhow::{Context, Result};
use cacheprobe_core::archive::ArchiveClient;
use cacheprobe_core::config::ProbeConfig;
use cacheprobe_core::http::HttpClient;
use cacheprobe_core::report::RunReport;
use std::time::Duration;

/// Build the archive client from config (base URL, credentials, timeouts).
fn build_client(cfg: &ProbeConfig) -> Result<ArchiveClient> {
    let mut http = HttpClient::new(&cfg.base_url)
        .context("invalid base URL")?
        .with_timeouts(
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.request_timeout_secs),
        );
    if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
        http = http.with_credentials(user, pass);
    }
    Ok(ArchiveClient::new(http))
}

/// Print the run summary; a run with failures exits non-zero.
fn finish_report(report: &RunReport) -> Result<()> {
    println!("{}", report.summary());
    if report.passed() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} checks failed", report.failures, report.checks)
    }
}
