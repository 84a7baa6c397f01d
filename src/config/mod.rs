//! Application configuration.
//!
//! This module manages configuration with sensible defaults, loading from a
//! YAML file and merging over the built-in values. It feeds endpoint
//! discovery (which registries may fall back to plain HTTP) and the HTTP
//! client (request timeout).

use crate::error::{ImageError, Result};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Root configuration structure.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub registries: Registries,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default()).map_err(Self::config_error)?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder)
    }

    /// Loads a `Config` from an optional file path. When no path is given,
    /// the built-in defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default()).map_err(Self::config_error)?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).required(true));
        }

        Self::from_builder(builder)
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(Self::config_error)
    }

    fn config_error(e: config::ConfigError) -> ImageError {
        ImageError::config_with_source("Failed to load configuration", e)
    }

    /// True when `domain` is configured as an insecure registry that may be
    /// reached over plain HTTP.
    pub fn is_insecure_registry(&self, domain: &str) -> bool {
        self.registries.insecure.iter().any(|r| r == domain)
    }
}

/// Network settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds.
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

/// Registry settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Registries {
    /// Registry hosts that may be contacted over plain HTTP. The default
    /// public registry is never insecure.
    #[serde(default)]
    pub insecure: Vec<String>,
}
