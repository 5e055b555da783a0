//! `cacheprobe import <files>` – upload DICOM files to the archive.

use anyhow::{Context, Result};
use cacheprobe_core::config::ProbeConfig;
use std::path::PathBuf;

use super::build_client;

pub async fn run_import(cfg: &ProbeConfig, files: Vec<PathBuf>) -> Result<()> {
    let archive = build_client(cfg)?;
    tokio::task::spawn_blocking(move || -> Result<()> {
        for (index, path) in files.iter().enumerate() {
            let bytes =
                std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
            let id = archive
                .import_instance(&bytes)
                .with_context(|| format!("import {}", path.display()))?;
            println!("Uploaded instance #{} {}", index + 1, id);
        }
        Ok(())
    })
    .await
    .context("import task join")??;
    Ok(())
}
