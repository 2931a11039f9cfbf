use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Simple configuration for chatmeter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Named tokenizer encoding scheme used for all token counting.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Env-filter directive string for tracing-subscriber.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_encoding() -> String {
    "cl100k_base".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "chatmeter", "chatmeter") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.chatmeter/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.encoding, "cl100k_base");
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.encoding, config.encoding);
        assert_eq!(parsed.logging.filter, config.logging.filter);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("encoding = \"o200k_base\"").unwrap();
        assert_eq!(parsed.encoding, "o200k_base");
        assert_eq!(parsed.logging.filter, "info");
    }
}
