//! Serializable audit configuration, loaded from TOML.
//!
//! Every section is optional; missing keys take their defaults, so an empty
//! file (or no file at all) is a valid configuration.
//!
//! ```toml
//! [history]
//! enabled = true
//! path = "state/history.jsonl"
//!
//! [trades]
//! date_formats = ["%Y-%m-%d", "%d.%m.%Y"]
//!
//! [engine]
//! parallel = false
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use discipline_core::DisciplineAgent;

use crate::history::JsonlHistory;

/// Errors reading or parsing the audit configuration file.
#[derive(Debug, Error)]
pub enum AuditConfigError {
    #[error("read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub history: HistoryConfig,
    pub trades: TradesConfig,
    pub engine: EngineConfig,
}

/// Where and whether report summaries are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("state/history.jsonl"),
        }
    }
}

/// Trade row parsing options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradesConfig {
    /// chrono format strings; empty means the built-in defaults.
    pub date_formats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Evaluate trades on the rayon pool.
    pub parallel: bool,
}

impl AuditConfig {
    pub fn from_file(path: &Path) -> Result<Self, AuditConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| AuditConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AuditConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build an agent wired to this configuration (history store included
    /// when enabled).
    pub fn build_agent(&self) -> DisciplineAgent {
        let agent = DisciplineAgent::new()
            .with_parallelism(self.engine.parallel)
            .with_date_formats(self.trades.date_formats.clone());
        if self.history.enabled {
            agent.with_history(Arc::new(JsonlHistory::new(self.history.path.clone())))
        } else {
            agent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AuditConfig::from_toml("").unwrap();
        assert_eq!(config, AuditConfig::default());
        assert!(config.history.enabled);
        assert_eq!(config.history.path, PathBuf::from("state/history.jsonl"));
        assert!(config.trades.date_formats.is_empty());
        assert!(!config.engine.parallel);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = AuditConfig::from_toml(
            r#"
[history]
enabled = false

[trades]
date_formats = ["%d.%m.%Y"]
"#,
        )
        .unwrap();
        assert!(!config.history.enabled);
        assert_eq!(config.history.path, PathBuf::from("state/history.jsonl"));
        assert_eq!(config.trades.date_formats, vec!["%d.%m.%Y"]);
    }

    #[test]
    fn malformed_toml_is_error() {
        assert!(matches!(
            AuditConfig::from_toml("[history\nenabled = "),
            Err(AuditConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AuditConfig::from_file(Path::new("/nonexistent/audit.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/audit.toml"));
    }

    #[test]
    fn config_serialization_roundtrip() {
        let mut config = AuditConfig::default();
        config.engine.parallel = true;
        let toml_str = toml::to_string(&config).unwrap();
        assert_eq!(AuditConfig::from_toml(&toml_str).unwrap(), config);
    }
}
