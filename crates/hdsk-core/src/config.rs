use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HdskError, HdskResult};
use crate::types::{HashAlgorithm, LogFormat};

/// Top-level configuration (loaded from hdsk.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdskConfig {
    pub derivation: DerivationConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    /// Hash primitive for HMAC, HKDF and index hashing (default: sha256)
    pub hash: HashAlgorithm,
    /// Path schema every derivation path is validated against
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::default(),
            schema: "m / application: any / purpose: any / context: any / index: num".into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: LogFormat::default(),
        }
    }
}

impl HdskConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> HdskResult<Self> {
        let config: Self = toml::from_str(content)?;
        if config.derivation.schema.trim().is_empty() {
            return Err(HdskError::Config("derivation.schema must not be empty".into()));
        }
        Ok(config)
    }

    /// Load configuration from `path`. Returns `None` when the file does not
    /// exist so the caller can fall back to defaults once logging is up.
    pub fn load(path: &Path) -> HdskResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map(Some)
            .map_err(|e| HdskError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn to_toml_string(&self) -> HdskResult<String> {
        toml::to_string_pretty(self).map_err(|e| HdskError::Config(e.to_string()))
    }
}
