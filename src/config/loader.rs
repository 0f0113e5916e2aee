use crate::config::{CheckConfig, ScrapeConfig};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Load every CheckConfig file in `dir`, in file-name order.
pub fn load_check_configs(dir: &Path) -> Result<Vec<(PathBuf, CheckConfig)>> {
    load_dir(dir)
}

/// Load every ScrapeConfig file in `dir`, in file-name order.
pub fn load_scrape_configs(dir: &Path) -> Result<Vec<(PathBuf, ScrapeConfig)>> {
    load_dir(dir)
}

/// Read one config per regular file.
///
/// A file that cannot be read or parsed is logged and replaced by the
/// zero-value config so the remaining files still load.
fn load_dir<T>(dir: &Path) -> Result<Vec<(PathBuf, T)>>
where
    T: DeserializeOwned + Default,
{
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read config directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        warn!("{} exists, but is empty. No configs loaded", dir.display());
    }

    let configs = files
        .into_iter()
        .map(|path| {
            let config = parse_file(&path).unwrap_or_else(|e| {
                error!("⚠️ {:#}", e);
                T::default()
            });
            (path, config)
        })
        .collect();

    Ok(configs)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading config file: {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Couldn't parse YAML file: {}", path.display()))
}
