//! Tracker configuration loaded from TOML.
//!
//! ```toml
//! [diff]
//! max_changes = 5000
//! ignore_paths = ["info._postman_id", "item**.id"]
//!
//! [identity]
//! container_names = ["item"]
//!
//! [tracking]
//! skip_unchanged = true
//! ```
//!
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::diff::model::DiffOptions;
use crate::errors::{ExError, ExErrorKind, Result, TrackError};
use crate::identity::{CollectionItemIdentity, DEFAULT_CONTAINER_NAMES};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub diff: DiffOptions,
    pub identity: IdentityConfig,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Reserved list-container names whose arrays are matched by identity
    pub container_names: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            container_names: DEFAULT_CONTAINER_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Skip storing a snapshot whose content hash equals its predecessor's
    pub skip_unchanged: bool,
}

impl TrackerConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// `Config` when the document does not parse or fails validation.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: TrackerConfig = toml::from_str(s).map_err(|e| {
            ExError::from(TrackError::InvalidConfig {
                reason: e.to_string(),
            })
            .with_op("load_config")
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// `Io` when the file exists but cannot be read, `Config` when it does
    /// not parse.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::from_toml_str(&contents)
                    .map_err(|e| e.with_entity_id(path.display().to_string()))?;
                tracing::debug!(path = %path.display(), "Loaded tracker config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.identity.container_names.iter().any(|n| n.is_empty()) {
            return Err(ExError::from(TrackError::InvalidConfig {
                reason: "identity.container_names must not contain empty names".to_string(),
            })
            .with_op("load_config"));
        }
        Ok(())
    }

    pub fn identity(&self) -> CollectionItemIdentity {
        CollectionItemIdentity::new(self.identity.container_names.clone())
    }
}
