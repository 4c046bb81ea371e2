use pagecraft_editor::DocumentConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Document settings (`idPrefix`, `history`)
    #[serde(flatten)]
    pub document: DocumentConfig,

    /// Pretty-print emitted JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load config from an explicit path, or from `cwd` when one exists there
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Render a value with the configured formatting
    pub fn to_json<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            pretty: default_pretty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "idPrefix": "el",
            "history": { "timeGapMs": 250 },
            "pretty": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.document.id_prefix, "el");
        assert_eq!(config.document.history.unwrap().time_gap_ms, 250);
        assert!(!config.pretty);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.document.id_prefix, "node");
        assert!(config.document.history.is_none());
        assert!(config.pretty);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let cwd = std::env::temp_dir();
        let missing = cwd.join("pagecraft-missing.config.json");
        assert!(Config::load(&cwd, Some(missing.as_path())).is_err());
    }
}
