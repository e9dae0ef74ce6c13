use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Number of boxes processed at once unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Sync settings loaded from `~/.config/boxsync/config.toml`.
/// Every field can be overridden on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// URL of the JSON manifest listing all boxes.
    pub manifest_url: String,
    /// Local directory holding one file per box, named by id.
    pub target_dir: PathBuf,
    /// Maximum number of boxes validated or downloaded simultaneously.
    pub concurrency: usize,
    /// Debug-level logging.
    pub verbose: bool,
    /// Exit non-zero when any single box failed (fatal errors always do).
    pub fail_on_artifact_error: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            manifest_url: String::new(),
            target_dir: PathBuf::from("boxes"),
            concurrency: DEFAULT_CONCURRENCY,
            verbose: false,
            fail_on_artifact_error: false,
        }
    }
}

impl SyncConfig {
    /// Check the settings a run cannot start without.
    pub fn validate(&self) -> SyncResult<()> {
        let manifest_url = self.manifest_url.trim();
        if manifest_url.is_empty() {
            return Err(SyncError::Config(
                "no manifest URL configured (set manifest_url or pass --manifest-url)".to_string(),
            ));
        }
        url::Url::parse(manifest_url).map_err(|e| {
            SyncError::Config(format!("manifest URL '{}' is invalid: {}", manifest_url, e))
        })?;
        if self.target_dir.as_os_str().is_empty() {
            return Err(SyncError::Config("target directory is empty".to_string()));
        }
        Ok(())
    }

    /// Concurrency bound actually used (at least 1).
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("boxsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<SyncConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: SyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}
