//! Factory configuration.
//!
//! [`FactoryConfig`] implements [`Default`] with the conventional settings
//! and can be loaded from JSON, with missing fields taking their defaults.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The mapping key conversion reads the type identifier from by default.
pub const DEFAULT_DISCRIMINATOR_KEY: &str = "type";

/// Configuration for a [`Factory`](crate::Factory).
///
/// # Examples
///
/// ```
/// use dessinemoi_core::FactoryConfig;
///
/// let config = FactoryConfig::default();
/// assert_eq!(config.discriminator_key, "type");
/// assert!(config.name.is_none());
///
/// let config = FactoryConfig::from_json_str(r#"{"discriminator_key": "kind"}"#).unwrap();
/// assert_eq!(config.discriminator_key, "kind");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Label attached to the factory's log records.
    ///
    /// Useful when several independent factories coexist.
    pub name: Option<String>,

    /// Mapping key holding the type identifier during conversion.
    pub discriminator_key: String,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            name: None,
            discriminator_key: DEFAULT_DISCRIMINATOR_KEY.to_owned(),
        }
    }
}

impl FactoryConfig {
    /// Sets the factory label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the discriminator key.
    #[must_use]
    pub fn with_discriminator_key(mut self, key: impl Into<String>) -> Self {
        self.discriminator_key = key.into();
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_std_path())?;
        Self::from_json_str(&contents)
    }

    /// Checks option values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the discriminator key is
    /// empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discriminator_key.is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "discriminator_key".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Returns the label used in log records.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}
