//! Client configuration

use crate::error::{ConsumerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Media type the proxy uses for v1 record sets
pub const RECORD_MEDIA_TYPE_V1: &str = "application/vnd.kafka.v1+json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConsumerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

/// REST proxy connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Base URL of the REST proxy, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix of the consumer group shared by every session of this client
    #[serde(default = "default_group_prefix")]
    pub group_prefix: String,

    /// Accept header sent when reading records
    #[serde(default = "default_record_media_type")]
    pub record_media_type: String,

    /// Per-request timeout; requests wait indefinitely when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProxyConfig {
    /// Settings for a proxy at `base_url`, everything else default
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Base URL with any trailing slashes removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            group_prefix: default_group_prefix(),
            record_media_type: default_record_media_type(),
            timeout_secs: None,
        }
    }
}

/// Client-side message buffer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Keep at most this many records per topic, evicting the oldest.
    /// Unbounded when unset.
    #[serde(default)]
    pub max_records_per_topic: Option<usize>,
}

// Defaults
fn default_base_url() -> String { "http://localhost:8082".to_string() }
fn default_group_prefix() -> String { "kafka-ui".to_string() }
fn default_record_media_type() -> String { RECORD_MEDIA_TYPE_V1.to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.proxy.base_url, "http://localhost:8082");
        assert_eq!(config.proxy.group_prefix, "kafka-ui");
        assert_eq!(config.proxy.record_media_type, RECORD_MEDIA_TYPE_V1);
        assert_eq!(config.proxy.timeout_secs, None);
        assert_eq!(config.buffer.max_records_per_topic, None);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.proxy.group_prefix, "kafka-ui");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let proxy = ProxyConfig::new("http://proxy:8082//");
        assert_eq!(proxy.normalized_base_url(), "http://proxy:8082");
    }
}
