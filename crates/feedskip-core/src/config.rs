use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use feedskip_api::reddit::{RedditSort, RedditTimeFilter};

/// Main configuration structure
///
/// Loaded from a TOML file under the platform config dir; missing file
/// means defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("feedskip");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Cosmetic pause before the first tier so a spinner gets a frame.
    /// Zero disables it; it has no correctness role.
    #[serde(default)]
    pub pre_dispatch_delay_ms: u64,

    /// Copy the query to the clipboard before the native attempt, for
    /// apps without a paste-free search entry. Off unless someone asks.
    #[serde(default)]
    pub clipboard_assist: bool,

    /// Locale used for web URLs when no localization provider answers.
    pub fallback_locale: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pre_dispatch_delay_ms: 0,
            clipboard_assist: false,
            fallback_locale: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// Override for tests and mirrors
    #[serde(default = "default_reddit_base")]
    pub base_url: String,

    #[serde(default)]
    pub default_sort: RedditSort,

    #[serde(default)]
    pub default_time_filter: RedditTimeFilter,
}

fn default_reddit_base() -> String {
    "https://www.reddit.com".to_string()
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: default_reddit_base(),
            default_sort: RedditSort::default(),
            default_time_filter: RedditTimeFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_quiet() {
        let config = Config::default();
        assert_eq!(config.dispatch.pre_dispatch_delay_ms, 0);
        assert!(!config.dispatch.clipboard_assist);
        assert_eq!(config.reddit.base_url, "https://www.reddit.com");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.reddit.base_url, config.reddit.base_url);
    }
}
