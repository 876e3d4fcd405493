//! Declarative build descriptor
//!
//! The unresolved input: plugin references, SDK and version bindings (literal
//! or symbolic), language levels, application identity, signing bindings and
//! the shared source root. Loaded from a `build.gradle.kts` file or from an
//! equivalent TOML document.

use crate::kts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while loading a descriptor
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Failed to read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid TOML descriptor: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported descriptor format: {path} (expected .gradle.kts or .toml)")]
    UnsupportedFormat { path: PathBuf },
}

impl From<DescriptorError> for droidcfg_core::Error {
    fn from(err: DescriptorError) -> Self {
        use droidcfg_core::ErrorCode;

        let code = match &err {
            DescriptorError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::FileNotFound
            }
            DescriptorError::Io { .. } => ErrorCode::IoError,
            DescriptorError::UnsupportedFormat { .. } => ErrorCode::InvalidInput,
            DescriptorError::Parse { .. } | DescriptorError::Toml(_) => {
                ErrorCode::DescriptorParseError
            }
        };
        droidcfg_core::Error::new(code, err.to_string()).with_source(err)
    }
}

/// A plugin applied by the descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginReference {
    pub id: String,
}

impl PluginReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A value written either literally or as a reference into the version catalog
///
/// In TOML a symbol is written as `{ symbol = "flutter.minSdkVersion" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding<T> {
    Literal(T),
    Symbol { symbol: String },
}

impl<T> Binding<T> {
    /// Reference a catalog symbol
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Binding::Symbol {
            symbol: symbol.into(),
        }
    }

    /// The symbol name, if this is a symbolic binding
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Binding::Literal(_) => None,
            Binding::Symbol { symbol } => Some(symbol),
        }
    }
}

/// Java language level, as used by `sourceCompatibility`, `targetCompatibility`
/// and Kotlin's `jvmTarget`
///
/// Levels up to Java 8 are stored as their minor number (`1.8` is `8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompatibilityLevel(u8);

impl CompatibilityLevel {
    pub const JAVA_1_8: Self = Self(8);
    pub const JAVA_11: Self = Self(11);
    pub const JAVA_17: Self = Self(17);
    pub const JAVA_21: Self = Self(21);

    /// Feature release number (`8` for 1.8, `17` for 17)
    pub fn release(self) -> u8 {
        self.0
    }
}

impl Default for CompatibilityLevel {
    fn default() -> Self {
        Self::JAVA_1_8
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= 8 {
            write!(f, "1.{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for CompatibilityLevel {
    type Err = String;

    /// Accepts `JavaVersion.VERSION_17`, `VERSION_1_8`, `JvmTarget.JVM_17`,
    /// `17`, `1.8` and `8`. Any `1.N` spelling is release `N`, since Gradle
    /// only names Java 9 and 10 as `VERSION_1_9` and `VERSION_1_10`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let short = raw
            .strip_prefix("JavaVersion.")
            .or_else(|| raw.strip_prefix("JvmTarget."))
            .unwrap_or(raw);
        let number = short
            .strip_prefix("VERSION_")
            .or_else(|| short.strip_prefix("JVM_"))
            .unwrap_or(short)
            .replace('_', ".");

        let release = number
            .strip_prefix("1.")
            .unwrap_or(&number)
            .parse::<u8>()
            .ok()
            .filter(|r| (1..=99).contains(r));

        release
            .map(Self)
            .ok_or_else(|| format!("not a Java language level: {:?}", raw))
    }
}

impl TryFrom<String> for CompatibilityLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompatibilityLevel> for String {
    fn from(level: CompatibilityLevel) -> Self {
        level.to_string()
    }
}

/// `compileOptions` and `kotlinOptions` settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileOptions {
    #[serde(default)]
    pub source_compatibility: Option<CompatibilityLevel>,
    #[serde(default)]
    pub target_compatibility: Option<CompatibilityLevel>,
    #[serde(default)]
    pub jvm_target: Option<CompatibilityLevel>,
}

/// `defaultConfig` identity fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultConfig {
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub min_sdk: Option<Binding<u32>>,
    #[serde(default)]
    pub target_sdk: Option<Binding<u32>>,
    #[serde(default)]
    pub version_code: Option<Binding<u32>>,
    #[serde(default)]
    pub version_name: Option<Binding<String>>,
}

/// A parsed, unresolved build descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Descriptor {
    /// Plugins in declaration order
    #[serde(default)]
    pub plugins: Vec<PluginReference>,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub compile_sdk: Option<Binding<u32>>,

    #[serde(default)]
    pub ndk_version: Option<Binding<String>>,

    #[serde(default)]
    pub compile_options: CompileOptions,

    #[serde(default)]
    pub default_config: DefaultConfig,

    /// Signing configurations declared in `signingConfigs {}`
    #[serde(default)]
    pub signing_configs: Vec<String>,

    /// Build types declared in `buildTypes {}`
    #[serde(default)]
    pub build_types: Vec<String>,

    /// Build variant to signing configuration
    #[serde(default)]
    pub signing_bindings: BTreeMap<String, String>,

    /// Shared application source tree, relative to the descriptor
    #[serde(default)]
    pub source_root: Option<PathBuf>,

    /// File the descriptor was loaded from
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

impl Descriptor {
    /// Load a descriptor, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let content = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut descriptor = match path.extension().and_then(|e| e.to_str()) {
            Some("kts") => kts::parse(&content)?,
            Some("toml") => Self::from_toml(&content)?,
            _ => {
                return Err(DescriptorError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        descriptor.origin = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            plugins = descriptor.plugins.len(),
            "Descriptor loaded"
        );
        Ok(descriptor)
    }

    /// Parse a TOML descriptor
    pub fn from_toml(content: &str) -> Result<Self, DescriptorError> {
        Ok(toml::from_str(content)?)
    }

    /// Directory the descriptor lives in
    pub fn base_dir(&self) -> Option<&Path> {
        self.origin.as_deref().and_then(Path::parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compatibility_level_parsing() {
        let cases = [
            ("JavaVersion.VERSION_17", 17),
            ("VERSION_1_8", 8),
            ("JvmTarget.JVM_21", 21),
            ("11", 11),
            ("1.8", 8),
            ("8", 8),
            ("JavaVersion.VERSION_1_9", 9),
            ("JavaVersion.VERSION_1_10", 10),
            ("1.9", 9),
            ("1.11", 11),
        ];
        for (input, release) in cases {
            let level: CompatibilityLevel = input.parse().unwrap();
            assert_eq!(level.release(), release, "{}", input);
        }
    }

    #[test]
    fn test_compatibility_level_rejects_garbage() {
        assert!("VERSION_HIGHER".parse::<CompatibilityLevel>().is_err());
        assert!("1.".parse::<CompatibilityLevel>().is_err());
        assert!("1.0".parse::<CompatibilityLevel>().is_err());
        assert!("".parse::<CompatibilityLevel>().is_err());
    }

    #[test]
    fn test_compatibility_level_order_and_display() {
        assert!(CompatibilityLevel::JAVA_1_8 < CompatibilityLevel::JAVA_11);
        assert!(CompatibilityLevel::JAVA_17 < CompatibilityLevel::JAVA_21);
        assert_eq!(CompatibilityLevel::JAVA_1_8.to_string(), "1.8");
        assert_eq!(CompatibilityLevel::JAVA_17.to_string(), "17");
        let java_9: CompatibilityLevel = "JavaVersion.VERSION_1_9".parse().unwrap();
        assert_eq!(java_9.to_string(), "9");
        assert!(CompatibilityLevel::JAVA_1_8 < java_9);
    }

    #[test]
    fn test_toml_descriptor() {
        let descriptor = Descriptor::from_toml(
            r#"
            plugins = ["com.android.application", "dev.flutter.flutter-gradle-plugin"]
            compile_sdk = { symbol = "flutter.compileSdkVersion" }
            source_root = "../.."

            [compile_options]
            source_compatibility = "17"
            target_compatibility = "17"

            [default_config]
            application_id = "com.example.app"
            min_sdk = 21
            target_sdk = 34
            version_code = 7
            version_name = "1.2.0"

            [signing_bindings]
            release = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(descriptor.plugins[1].id, "dev.flutter.flutter-gradle-plugin");
        assert_eq!(
            descriptor.compile_sdk,
            Some(Binding::symbol("flutter.compileSdkVersion"))
        );
        assert_eq!(descriptor.default_config.min_sdk, Some(Binding::Literal(21)));
        assert_eq!(
            descriptor.default_config.version_name,
            Some(Binding::Literal("1.2.0".to_string()))
        );
        assert_eq!(
            descriptor.compile_options.target_compatibility,
            Some(CompatibilityLevel::JAVA_17)
        );
        assert_eq!(descriptor.signing_bindings["release"], "debug");
    }

    #[test]
    fn test_toml_rejects_unknown_fields() {
        let err = Descriptor::from_toml("flavors = []").unwrap_err();
        assert!(matches!(err, DescriptorError::Toml(_)));
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle.kts");
        fs::write(&path, "plugins {\n    id(\"com.android.application\")\n}\n").unwrap();

        let descriptor = Descriptor::load(&path).unwrap();
        assert_eq!(descriptor.plugins, vec![PluginReference::new("com.android.application")]);
        assert_eq!(descriptor.base_dir(), Some(dir.path()));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle");
        fs::write(&path, "").unwrap();

        assert!(matches!(
            Descriptor::load(&path),
            Err(DescriptorError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_maps_to_file_not_found() {
        let err = Descriptor::load(Path::new("/nope/build.gradle.kts")).unwrap_err();
        let err: droidcfg_core::Error = err.into();
        assert_eq!(err.code, droidcfg_core::ErrorCode::FileNotFound);
    }
}
