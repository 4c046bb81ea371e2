//! Document and history configuration.
//!
//! Every field has a default so a partial (or empty) JSON object is a valid
//! configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_GAP_MS: u64 = 1000;
pub const DEFAULT_ID_PREFIX: &str = "node";

/// History log settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Coalescing window: edits closer together than this share one undo step
    #[serde(default = "default_time_gap")]
    pub time_gap_ms: u64,
}

fn default_time_gap() -> u64 {
    DEFAULT_TIME_GAP_MS
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            time_gap_ms: default_time_gap(),
        }
    }
}

/// Document settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    /// Prefix for generated node ids (`<prefix>-<n>`)
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Settings for the history log, when one is attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryConfig>,
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            history: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{ "history": { "timeGapMs": 250 } }"#;
        let config: DocumentConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.id_prefix, "node");
        assert_eq!(config.history, Some(HistoryConfig { time_gap_ms: 250 }));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: DocumentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DocumentConfig::default());

        let history: HistoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(history.time_gap_ms, DEFAULT_TIME_GAP_MS);
    }
}
