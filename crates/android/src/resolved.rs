//! Fully resolved build configuration handed to the packaging tool

use crate::descriptor::CompatibilityLevel;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Signing configuration the Android Gradle plugin always provides
pub const DEBUG_SIGNING_CONFIG: &str = "debug";

/// Build variant that ships to users
pub const RELEASE_VARIANT: &str = "release";

/// Non-fatal finding attached to a resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Resolved Java/Kotlin language levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    pub source: CompatibilityLevel,
    pub target: CompatibilityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jvm_target: Option<CompatibilityLevel>,
}

/// Validated, immutable build configuration
///
/// Only the resolver constructs one. Maps and sets are ordered, so two equal
/// configurations serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    namespace: String,
    application_id: String,
    compile_sdk: u32,
    min_sdk: u32,
    target_sdk: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    ndk_version: Option<String>,
    version_code: u32,
    version_name: String,
    plugins: Vec<String>,
    compatibility: Compatibility,
    build_types: BTreeSet<String>,
    signing_configs: BTreeSet<String>,
    signing_bindings: BTreeMap<String, String>,
    source_root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<Diagnostic>,
}

/// Field values gathered by the resolver
pub(crate) struct ResolvedParts {
    pub namespace: String,
    pub application_id: String,
    pub compile_sdk: u32,
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub ndk_version: Option<String>,
    pub version_code: u32,
    pub version_name: String,
    pub plugins: Vec<String>,
    pub compatibility: Compatibility,
    pub build_types: BTreeSet<String>,
    pub signing_configs: BTreeSet<String>,
    pub signing_bindings: BTreeMap<String, String>,
    pub source_root: PathBuf,
    pub source_dir: Option<PathBuf>,
    pub warnings: Vec<Diagnostic>,
}

impl From<ResolvedParts> for ResolvedConfig {
    fn from(p: ResolvedParts) -> Self {
        Self {
            namespace: p.namespace,
            application_id: p.application_id,
            compile_sdk: p.compile_sdk,
            min_sdk: p.min_sdk,
            target_sdk: p.target_sdk,
            ndk_version: p.ndk_version,
            version_code: p.version_code,
            version_name: p.version_name,
            plugins: p.plugins,
            compatibility: p.compatibility,
            build_types: p.build_types,
            signing_configs: p.signing_configs,
            signing_bindings: p.signing_bindings,
            source_root: p.source_root,
            source_dir: p.source_dir,
            warnings: p.warnings,
        }
    }
}

impl ResolvedConfig {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn compile_sdk(&self) -> u32 {
        self.compile_sdk
    }

    pub fn min_sdk(&self) -> u32 {
        self.min_sdk
    }

    pub fn target_sdk(&self) -> u32 {
        self.target_sdk
    }

    pub fn ndk_version(&self) -> Option<&str> {
        self.ndk_version.as_deref()
    }

    pub fn version_code(&self) -> u32 {
        self.version_code
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    /// Plugin ids in application order
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    /// Build types, including the implicit `debug` and `release`
    pub fn build_types(&self) -> &BTreeSet<String> {
        &self.build_types
    }

    /// Declared signing configurations, including the implicit `debug`
    pub fn signing_configs(&self) -> &BTreeSet<String> {
        &self.signing_configs
    }

    pub fn signing_bindings(&self) -> &BTreeMap<String, String> {
        &self.signing_bindings
    }

    /// Signing configuration bound to a build variant
    pub fn signing_config_for(&self, variant: &str) -> Option<&str> {
        self.signing_bindings.get(variant).map(String::as_str)
    }

    /// Shared source tree as written in the descriptor
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Shared source tree joined onto the descriptor's directory
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// `false` when `release` is signed with the debug keys or not signed at all
    pub fn is_production_signed(&self) -> bool {
        matches!(
            self.signing_config_for(RELEASE_VARIANT),
            Some(config) if config != DEBUG_SIGNING_CONFIG
        )
    }

    /// Pretty-printed JSON for the packaging tool
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the canonical JSON encoding, hex encoded
    ///
    /// Fails like [`ResolvedConfig::to_json`] when a path is not valid UTF-8.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
