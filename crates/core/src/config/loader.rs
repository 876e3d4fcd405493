//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist; without one the standard locations are
    /// searched and defaults are used when none is present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn defaults() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }

    /// Catalog file path with `~` and environment variables expanded
    pub fn catalog_path(&self) -> Result<Option<PathBuf>> {
        let Some(raw) = self.schema.catalog.path.as_deref() else {
            return Ok(None);
        };

        let expanded = shellexpand::full(raw).map_err(|e| {
            Error::new(
                ErrorCode::InvalidConfigValue,
                format!("catalog.path = {:?}: {}", raw, e),
            )
        })?;

        Ok(Some(PathBuf::from(expanded.as_ref())))
    }
}

/// Find configuration file in standard locations
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [".droidcfg.toml", "droidcfg.toml", ".config/droidcfg.toml"];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
            .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {}", path.display(), e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert!(config.path.is_none());
        assert_eq!(config.schema.general.descriptor, "android/app/build.gradle.kts");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("droidcfg.toml");
        fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.schema.logging.level, "debug");
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_parse_error_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("droidcfg.toml");
        fs::write(&path, "[logging\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.message.contains("droidcfg.toml"));
    }

    #[test]
    fn test_find_config_file_prefers_hidden() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("droidcfg.toml"), "").unwrap();
        fs::write(dir.path().join(".droidcfg.toml"), "").unwrap();

        let found = find_config_file(dir.path()).unwrap();
        assert!(found.ends_with(".droidcfg.toml"));
    }

    #[test]
    fn test_catalog_path_expands_env() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("DROIDCFG_TEST_SDK_ROOT", "/opt/sdk") };
        let mut config = Config::defaults();
        config.schema.catalog.path = Some("$DROIDCFG_TEST_SDK_ROOT/local.properties".into());

        let path = config.catalog_path().unwrap().unwrap();
        assert_eq!(path, PathBuf::from("/opt/sdk/local.properties"));
    }

    #[test]
    fn test_catalog_path_unset() {
        assert!(Config::defaults().catalog_path().unwrap().is_none());
    }
}
