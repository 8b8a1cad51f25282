//! Configuration for the restart registry
//!
//! Handles loading, validating and merging registry configuration. Files
//! are TOML; every field has a default, so an empty file is valid.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use rearm_core::traits::ComponentToggle;
use rearm_core::types::DEFAULT_RESUME_DELAY;
use rearm_store::FileStore;

use crate::keys::RegistryKeys;
use crate::launcher::ProcessLauncher;
use crate::registry::RestartRegistry;
use crate::toggle::{MarkerFileToggle, NoopToggle};

/// Errors that can occur in configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range or inconsistent with another
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path of the JSON document holding the registration
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Delay (seconds) stored when a registration does not give one
    #[serde(default = "default_delay_secs")]
    pub default_delay_secs: u64,

    /// Store keys holding the registration
    #[serde(default)]
    pub keys: RegistryKeys,

    /// Use the keys of the older interval-based boot receiver instead of `keys`
    #[serde(default)]
    pub legacy_keys: bool,

    /// Host platform capability level, decides the launch style
    #[serde(default = "default_platform_level")]
    pub platform_level: u32,

    /// Marker file kept present while a registration is armed
    #[serde(default)]
    pub marker_path: Option<String>,

    /// Directory holding service executables; `PATH` is searched when unset
    #[serde(default)]
    pub service_dir: Option<String>,
}

/// Configuration values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryOverrides {
    /// Store document path
    pub store_path: Option<String>,

    /// Default resume delay in seconds
    pub default_delay_secs: Option<u64>,

    /// Select the legacy key pair
    pub legacy_keys: Option<bool>,

    /// Host platform capability level
    pub platform_level: Option<u32>,

    /// Boot marker file
    pub marker_path: Option<String>,

    /// Service executable directory
    pub service_dir: Option<String>,
}

impl RegistryOverrides {
    /// True when no value is overridden.
    pub fn is_empty(&self) -> bool {
        *self == RegistryOverrides::default()
    }
}

fn default_store_path() -> String {
    "./rearm-store.json".to_string()
}

fn default_delay_secs() -> u64 {
    DEFAULT_RESUME_DELAY.as_secs()
}

fn default_platform_level() -> u32 {
    rearm_core::traits::FOREGROUND_LAUNCH_MIN_LEVEL
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_delay_secs: default_delay_secs(),
            keys: RegistryKeys::default(),
            legacy_keys: false,
            platform_level: default_platform_level(),
            marker_path: None,
            service_dir: None,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a file
    pub async fn load(path: Option<&str>) -> Result<Self> {
        // Start with default configuration
        let mut config = RegistryConfig::default();

        if let Some(path) = path {
            info!("Loading configuration from {}", path);

            if !Path::new(path).exists() {
                warn!("Configuration file not found: {}", path);
                return Ok(config);
            }

            let content = fs::read_to_string(path)
                .await
                .context(format!("Failed to read configuration file: {}", path))?;

            config = toml::from_str(&content)
                .context(format!("Failed to parse configuration file: {}", path))?;
        } else {
            info!("No configuration file specified, using defaults");
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.store_path.is_empty() {
            return Err(ConfigError::Invalid("Store path cannot be empty".to_string()).into());
        }

        if self.default_delay_secs == 0 {
            return Err(
                ConfigError::Invalid("Default delay cannot be zero".to_string()).into(),
            );
        }

        if i64::try_from(self.default_delay_secs).is_err() {
            return Err(ConfigError::Invalid(format!(
                "Default delay {}s is out of range",
                self.default_delay_secs
            ))
            .into());
        }

        let keys = self.registry_keys();
        if keys.service_id.is_empty() || keys.resume_delay.is_empty() {
            return Err(ConfigError::Invalid("Registry keys cannot be empty".to_string()).into());
        }
        if keys.service_id == keys.resume_delay {
            return Err(ConfigError::Invalid(
                "Service and delay keys must differ".to_string(),
            )
            .into());
        }

        if let Some(marker) = &self.marker_path {
            if marker.is_empty() {
                warn!("Empty marker path configured, boot marker disabled");
            }
        }

        Ok(())
    }

    /// Apply values set explicitly on the command line.
    ///
    /// Every field that is `Some` wins over the file value, even when it
    /// equals the default.
    pub fn merge(&mut self, overrides: RegistryOverrides) {
        if let Some(store_path) = overrides.store_path {
            self.store_path = store_path;
        }

        if let Some(delay) = overrides.default_delay_secs {
            self.default_delay_secs = delay;
        }

        if let Some(legacy) = overrides.legacy_keys {
            self.legacy_keys = legacy;
        }

        if let Some(level) = overrides.platform_level {
            self.platform_level = level;
        }

        if let Some(marker) = overrides.marker_path {
            self.marker_path = Some(marker);
        }

        if let Some(dir) = overrides.service_dir {
            self.service_dir = Some(dir);
        }
    }

    /// The keys the registry should use.
    pub fn registry_keys(&self) -> RegistryKeys {
        if self.legacy_keys {
            RegistryKeys::legacy()
        } else {
            self.keys.clone()
        }
    }

    /// The delay stored when none is given.
    pub fn default_delay(&self) -> Duration {
        Duration::from_secs(self.default_delay_secs)
    }

    /// The enablement hook selected by this configuration.
    pub fn toggle(&self) -> Arc<dyn ComponentToggle> {
        match self.marker_path.as_deref() {
            Some(path) if !path.is_empty() => Arc::new(MarkerFileToggle::new(path)),
            _ => Arc::new(NoopToggle),
        }
    }

    /// Open the file-backed registry described by this configuration.
    pub fn open_registry(&self) -> RestartRegistry<FileStore> {
        RestartRegistry::new(Arc::new(FileStore::new(&self.store_path)))
            .with_keys(self.registry_keys())
            .with_default_delay(self.default_delay())
            .with_toggle(self.toggle())
    }

    /// The process launcher described by this configuration.
    pub fn launcher(&self) -> ProcessLauncher {
        let launcher = ProcessLauncher::for_platform_level(self.platform_level);
        match &self.service_dir {
            Some(dir) => launcher.with_service_dir(dir),
            None => launcher,
        }
    }
}
