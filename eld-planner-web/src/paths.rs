//! Build-time deployment settings.
//!
//! `PUBLIC_URL` (router base path), `ELD_API_URL` (planning service) and
//! `AZURE_MAPS_KEY` are read at compile time. Unset values fall back to the
//! core defaults.
use eld_planner_core::ClientConfig;

/// Base path for the router (e.g., `/planner` when hosted under a subdirectory).
///
/// Returns `None` when no base path is configured so the router falls back to root.
#[must_use]
pub fn router_base() -> Option<String> {
    router_base_with_base(option_env!("PUBLIC_URL").unwrap_or(""))
}

/// Client configuration for this build.
#[must_use]
pub fn client_config() -> ClientConfig {
    config_with(option_env!("ELD_API_URL"), option_env!("AZURE_MAPS_KEY"))
}

fn config_with(api_url: Option<&str>, maps_key: Option<&str>) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
        config = config.with_api_base_url(url);
    }
    if let Some(key) = maps_key.map(str::trim).filter(|key| !key.is_empty()) {
        config = config.with_subscription_key(key);
    }
    config
}

fn router_base_with_base(base: &str) -> Option<String> {
    let base = base.trim_end_matches('/').trim();
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}
