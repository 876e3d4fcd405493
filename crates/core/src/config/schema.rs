//! Configuration schema definitions
//!
//! Every section and field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Android project directory (the one holding `gradlew`)
    #[serde(default = "default_project_dir")]
    pub project_dir: String,

    /// Descriptor used when none is given on the command line
    #[serde(default = "default_descriptor")]
    pub descriptor: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            descriptor: default_descriptor(),
        }
    }
}

fn default_project_dir() -> String {
    "android".to_string()
}

fn default_descriptor() -> String {
    "android/app/build.gradle.kts".to_string()
}

/// Resolver policy
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Plugin ids accepted in addition to the built-in registry
    #[serde(default)]
    pub known_plugins: Vec<String>,

    /// Refuse to resolve a `release` variant signed with the debug keys
    #[serde(default)]
    pub require_release_signing: bool,
}

/// Version catalog sources
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// `local.properties`-style file; `~` and `$VAR` are expanded
    #[serde(default)]
    pub path: Option<String>,

    /// Symbols that take precedence over every other catalog layer
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}
