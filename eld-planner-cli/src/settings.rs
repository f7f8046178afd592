//! Client configuration: optional JSON file, then flag/environment overrides.

use anyhow::{Context, Result};
use eld_planner_core::ClientConfig;
use std::path::Path;

pub fn load(
    path: Option<&Path>,
    api_url: Option<&str>,
    maps_key: Option<&str>,
) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ClientConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ClientConfig::default(),
    };
    if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
        config = config.with_api_base_url(url);
    }
    if let Some(key) = maps_key.map(str::trim).filter(|key| !key.is_empty()) {
        config = config.with_subscription_key(key);
    }
    log::debug!("planning service at {}", config.api_base_url);
    Ok(config)
}
