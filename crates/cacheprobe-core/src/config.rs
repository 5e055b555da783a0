use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::probe::{OutcomeMode, ValidatorKind};

/// Global configuration loaded from `~/.config/cacheprobe/config.toml`.
/// Defaults mirror a stock archive deployment (localhost:8042, orthanc/orthanc).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Archive base URL, e.g. "http://localhost:8042".
    pub base_url: String,
    /// Basic-auth user.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
    /// Number of concurrent virtual workers in the probing phase.
    pub workers: usize,
    /// Wall-clock budget for the probing phase, in seconds.
    pub duration_secs: u64,
    /// Optional per-worker iteration budget; takes precedence over the duration.
    #[serde(default)]
    pub iterations: Option<u64>,
    /// Fixed inter-request delay per worker, in seconds (e.g. 1.0).
    pub pacing_secs: f64,
    /// Which validator kind to exercise.
    #[serde(default)]
    pub validator: ValidatorKind,
    /// How strictly fresh conditional probes are judged.
    #[serde(default)]
    pub outcome: OutcomeMode,
    /// Abort an iteration at its first failed check.
    #[serde(default)]
    pub strict_fail: bool,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8042".to_string(),
            username: Some("orthanc".to_string()),
            password: Some("orthanc".to_string()),
            workers: 10,
            duration_secs: 10,
            iterations: None,
            pacing_secs: 1.0,
            validator: ValidatorKind::default(),
            outcome: OutcomeMode::default(),
            strict_fail: false,
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cacheprobe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ProbeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ProbeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ProbeConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Apply environment overrides: `CACHEPROBE_URL`, `CACHEPROBE_USERNAME`,
/// `CACHEPROBE_PASSWORD`. The original scripts were env-driven; the same
/// knobs work here for CI runs without a config file edit.
pub fn apply_env(cfg: &mut ProbeConfig) {
    apply_env_from(cfg, |name| std::env::var(name).ok());
}

fn apply_env_from(cfg: &mut ProbeConfig, get: impl Fn(&str) -> Option<String>) {
    if let Some(url) = get("CACHEPROBE_URL") {
        cfg.base_url = url;
    }
    if let Some(user) = get("CACHEPROBE_USERNAME") {
        cfg.username = Some(user);
    }
    if let Some(pass) = get("CACHEPROBE_PASSWORD") {
        cfg.password = Some(pass);
    }
}
