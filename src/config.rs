//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields a working configuration pointing at a local execution service.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CanvasConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid canvas configuration")
    }

    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Open {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Where and how to reach the execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service root; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Seconds allowed to establish a connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole request, response body included.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Join an endpoint path onto the base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Range used for the random default position of new blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    #[serde(default = "default_extent")]
    pub max_x: f64,
    #[serde(default = "default_extent")]
    pub max_y: f64,
}

fn default_extent() -> f64 {
    400.0
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_x: default_extent(),
            max_y: default_extent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let cfg = CanvasConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, CanvasConfig::default());
        assert_eq!(cfg.service.base_url, "http://localhost:8000");
        assert_eq!(cfg.placement.max_x, 400.0);
    }

    #[test]
    fn test_partial_override() {
        let cfg = CanvasConfig::from_json_str(
            r#"{"service": {"base_url": "http://exec:9000/"}, "placement": {"max_y": 50}}"#,
        )
        .unwrap();
        assert_eq!(cfg.service.request_timeout_secs, 120);
        assert_eq!(cfg.placement.max_x, 400.0);
        assert_eq!(cfg.placement.max_y, 50.0);
        assert_eq!(
            cfg.service.endpoint("/api/execute/"),
            "http://exec:9000/api/execute/"
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"logging": {{"level": "debug", "format": "json"}}}}"#).unwrap();
        let cfg = CanvasConfig::load(file.path()).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, "json");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = CanvasConfig::load("/nonexistent/canvas.json").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/canvas.json"));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(CanvasConfig::from_json_str("{not json").is_err());
    }
}
