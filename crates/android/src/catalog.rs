//! Shared version catalog
//!
//! Symbolic values such as `flutter.compileSdkVersion` are looked up here.
//! The catalog is passed into the resolver explicitly; nothing is global.
//!
//! The standard stack, first match wins:
//! 1. overrides from `.droidcfg.toml`
//! 2. `local.properties` (`flutter.versionCode`, `flutter.versionName`, `sdk.dir`, ...)
//! 3. [`FlutterDefaults`], the values the Flutter Gradle plugin provides

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by a catalog layer
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("version catalog {path} is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed entry in {path} at line {line}")]
    Malformed { path: PathBuf, line: usize },
}

/// Read-only symbol lookup
pub trait VersionCatalog {
    /// `Ok(None)` when the symbol is not defined by this catalog
    fn lookup(&self, symbol: &str) -> Result<Option<String>, CatalogError>;

    /// Short description for logs
    fn describe(&self) -> String {
        "catalog".to_string()
    }
}

impl<C: VersionCatalog + ?Sized> VersionCatalog for &C {
    fn lookup(&self, symbol: &str) -> Result<Option<String>, CatalogError> {
        (**self).lookup(symbol)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<C: VersionCatalog + ?Sized> VersionCatalog for Box<C> {
    fn lookup(&self, symbol: &str) -> Result<Option<String>, CatalogError> {
        (**self).lookup(symbol)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapCatalog {
    entries: BTreeMap<String, String>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a symbol
    pub fn with(mut self, symbol: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(symbol.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapCatalog {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl VersionCatalog for MapCatalog {
    fn lookup(&self, symbol: &str) -> Result<Option<String>, CatalogError> {
        Ok(self.entries.get(symbol).cloned())
    }

    fn describe(&self) -> String {
        format!("{} overrides", self.entries.len())
    }
}

/// Values exposed by the Flutter Gradle plugin's `flutter` extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FlutterDefaults;

impl FlutterDefaults {
    pub const COMPILE_SDK_VERSION: u32 = 35;
    pub const TARGET_SDK_VERSION: u32 = 35;
    pub const MIN_SDK_VERSION: u32 = 21;
    pub const NDK_VERSION: &'static str = "26.3.11579264";
    /// Used when `local.properties` has no `flutter.versionCode`
    pub const VERSION_CODE: u32 = 1;
    /// Used when `local.properties` has no `flutter.versionName`
    pub const VERSION_NAME: &'static str = "1.0";
}

impl VersionCatalog for FlutterDefaults {
    fn lookup(&self, symbol: &str) -> Result<Option<String>, CatalogError> {
        let value = match symbol {
            "flutter.compileSdkVersion" => Self::COMPILE_SDK_VERSION.to_string(),
            "flutter.targetSdkVersion" => Self::TARGET_SDK_VERSION.to_string(),
            "flutter.minSdkVersion" => Self::MIN_SDK_VERSION.to_string(),
            "flutter.ndkVersion" => Self::NDK_VERSION.to_string(),
            "flutter.versionCode" => Self::VERSION_CODE.to_string(),
            "flutter.versionName" => Self::VERSION_NAME.to_string(),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn describe(&self) -> String {
        "flutter defaults".to_string()
    }
}

/// Java `.properties` file, read on every lookup
///
/// The file is opened inside [`VersionCatalog::lookup`] and closed before it
/// returns, whether the lookup succeeds or fails.
#[derive(Debug, Clone)]
pub struct PropertiesCatalog {
    path: PathBuf,
}

impl PropertiesCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: std::io::Error) -> CatalogError {
        CatalogError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

impl VersionCatalog for PropertiesCatalog {
    fn lookup(&self, symbol: &str) -> Result<Option<String>, CatalogError> {
        let mut content = String::new();
        File::open(&self.path)
            .and_then(|mut file| file.read_to_string(&mut content))
            .map_err(|e| self.unavailable(e))?;

        let mut entries = parse_properties(&content).map_err(|line| CatalogError::Malformed {
            path: self.path.clone(),
            line,
        })?;
        Ok(entries.remove(symbol))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

const PROPERTY_WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// Entries of a `.properties` document, read the way `java.util.Properties.load`
/// reads them. A repeated key keeps its last value.
///
/// `Err` holds the line of a malformed `\uXXXX` escape.
fn parse_properties(content: &str) -> Result<BTreeMap<String, String>, usize> {
    let mut entries = BTreeMap::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let mut logical = line.trim_start_matches(PROPERTY_WHITESPACE).to_string();
        if logical.is_empty() || logical.starts_with(['#', '!']) {
            continue;
        }

        let mut last = index;
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((next_index, next)) => {
                    logical.push_str(next.trim_start_matches(PROPERTY_WHITESPACE));
                    last = next_index;
                }
                None => break,
            }
        }

        let (key, value) = split_property(&logical);
        let key = unescape_property(key).ok_or(index + 1)?;
        let value = unescape_property(value).ok_or(last + 1)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

/// An odd number of trailing backslashes joins the next line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Key up to the first unescaped `=`, `:` or whitespace, then the value
/// after one optional separator
fn split_property(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || PROPERTY_WHITESPACE.contains(&c) {
            key_end = i;
            break;
        }
    }

    let rest = line[key_end..].trim_start_matches(PROPERTY_WHITESPACE);
    let value = match rest.strip_prefix(['=', ':']) {
        Some(after) => after.trim_start_matches(PROPERTY_WHITESPACE),
        None => rest,
    };
    (&line[..key_end], value)
}

fn unescape_property(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Some(out)
}

/// Ordered stack of catalogs; the first layer defining a symbol wins
///
/// A layer that fails is not skipped: its error is returned.
#[derive(Default)]
pub struct LayeredCatalog {
    layers: Vec<Box<dyn VersionCatalog>>,
}

impl LayeredCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer below the existing ones
    pub fn with_layer(mut self, layer: impl VersionCatalog + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Overrides, then the optional properties file, then Flutter defaults
    pub fn flutter(properties: Option<&Path>, overrides: &BTreeMap<String, String>) -> Self {
        let mut catalog = Self::new().with_layer(overrides.clone().into_iter().collect::<MapCatalog>());
        if let Some(path) = properties {
            catalog = catalog.with_layer(PropertiesCatalog::new(path));
        }
        catalog.with_layer(FlutterDefaults)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl VersionCatalog for LayeredCatalog {
    fn lookup(&self, symbol: &str) -> Result<Option<String>, CatalogError> {
        for layer in &self.layers {
            if let Some(value) = layer.lookup(symbol)? {
                tracing::trace!(symbol, layer = %layer.describe(), "Catalog hit");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        self.layers
            .iter()
            .map(|l| l.describe())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
