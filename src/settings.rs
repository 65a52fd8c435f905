use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::constants::{DEFAULT_PORT, EARTHQUAKE_FEED_URL};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub port: u16,
    pub feed_url: String,
    #[serde(default)]
    pub auto_open_browser: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            feed_url: EARTHQUAKE_FEED_URL.to_string(),
            auto_open_browser: false,
        }
    }
}

impl Settings {
    /// Loads `quakemap.ini` from the application data directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&crate::utils::get_config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        Ok(Self::from_ini_str(&content))
    }

    /// Parses `key = value` lines. Unknown keys and unparsable values are ignored.
    pub fn from_ini_str(content: &str) -> Self {
        let mut settings = Settings::default();
        let mut config_map = HashMap::new();

        for line in content.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        if let Some(port_str) = config_map.get("port") {
            match port_str.parse::<u16>() {
                Ok(port) => settings.port = port,
                Err(_) => tracing::warn!("Ignoring invalid port in config: {}", port_str),
            }
        }
        if let Some(feed_url) = config_map.get("feed_url") {
            let feed_url = feed_url.trim_matches('"');
            if !feed_url.is_empty() {
                settings.feed_url = feed_url.to_string();
            }
        }
        if let Some(auto_open_str) = config_map.get("auto_open_browser") {
            if let Ok(auto_open) = auto_open_str.parse::<bool>() {
                settings.auto_open_browser = auto_open;
            }
        }

        settings
    }
}
