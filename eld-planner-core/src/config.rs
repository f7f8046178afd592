//! Client configuration with per-field defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_MAPS_BASE_URL: &str = "https://atlas.microsoft.com";

/// Debounced address search tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "SearchConfig::default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "SearchConfig::default_min_query_chars")]
    pub min_query_chars: usize,
    #[serde(default = "SearchConfig::default_result_limit")]
    pub result_limit: usize,
}

impl SearchConfig {
    const fn default_debounce_ms() -> u64 {
        300
    }

    const fn default_min_query_chars() -> usize {
        3
    }

    const fn default_result_limit() -> usize {
        5
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
            min_query_chars: Self::default_min_query_chars(),
            result_limit: Self::default_result_limit(),
        }
    }
}

/// Initial camera and widget options for the results map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "MapConfig::default_padding")]
    pub padding: u32,
    #[serde(default = "MapConfig::default_language")]
    pub language: String,
    /// `[lat, lon]` used when no waypoints are known.
    #[serde(default = "MapConfig::default_center")]
    pub default_center: [f64; 2],
    #[serde(default = "MapConfig::default_zoom")]
    pub default_zoom: f64,
}

impl MapConfig {
    const fn default_padding() -> u32 {
        80
    }

    fn default_language() -> String {
        "en-US".to_string()
    }

    const fn default_center() -> [f64; 2] {
        [39.8283, -98.5795]
    }

    const fn default_zoom() -> f64 {
        4.0
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            padding: Self::default_padding(),
            language: Self::default_language(),
            default_center: Self::default_center(),
            default_zoom: Self::default_zoom(),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "ClientConfig::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "ClientConfig::default_maps_base_url")]
    pub maps_base_url: String,
    #[serde(default)]
    pub maps_subscription_key: String,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default = "ClientConfig::default_history_limit")]
    pub history_limit: u32,
}

impl ClientConfig {
    fn default_api_base_url() -> String {
        DEFAULT_API_BASE_URL.to_string()
    }

    fn default_maps_base_url() -> String {
        DEFAULT_MAPS_BASE_URL.to_string()
    }

    const fn default_history_limit() -> u32 {
        50
    }

    /// Parse a JSON configuration document; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for this shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_subscription_key(mut self, key: impl Into<String>) -> Self {
        self.maps_subscription_key = key.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::default_api_base_url(),
            maps_base_url: Self::default_maps_base_url(),
            maps_subscription_key: String::new(),
            search: SearchConfig::default(),
            map: MapConfig::default(),
            history_limit: Self::default_history_limit(),
        }
    }
}
