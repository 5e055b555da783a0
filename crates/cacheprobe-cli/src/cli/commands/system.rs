//! `cacheprobe system` – print the archive identity.

use anyhow::{Context, Result};
use cacheprobe_core::config::ProbeConfig;

use super::build_client;

pub async fn run_system(cfg: &ProbeConfig) -> Result<()> {
    let archive = build_client(cfg)?;
    let name = tokio::task::spawn_blocking(move || archive.system_name())
        .await
        .context("system task join")??;
    println!("Archive name: {}", name);
    Ok(())
}
