//! Build configuration resolution
//!
//! A single synchronous pass over a [`Descriptor`]:
//!
//! 1. every plugin id is known and unique
//! 2. every symbolic value resolves against the version catalog
//! 3. application identity is valid (`minSdk <= targetSdk`, ...)
//! 4. `sourceCompatibility <= targetCompatibility`
//! 5. every signing binding names a declared signing configuration
//! 6. release signing policy
//!
//! The first failure is returned and nothing partial escapes. Apart from
//! catalog reads there are no side effects, so resolving the same descriptor
//! against the same catalog always yields equal configurations.

use crate::catalog::{CatalogError, VersionCatalog};
use crate::descriptor::{Binding, CompatibilityLevel, Descriptor};
use crate::registry::{canonical_plugin_id, PluginRegistry};
use crate::resolved::{
    Compatibility, DEBUG_SIGNING_CONFIG, Diagnostic, RELEASE_VARIANT, ResolvedConfig, ResolvedParts,
};
use droidcfg_core::validation::Validator;
use droidcfg_core::ErrorCode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Highest versionCode Google Play accepts
pub const MAX_VERSION_CODE: u32 = 2_100_000_000;

/// Flutter's default when the descriptor has no `flutter { source = ... }`
pub const DEFAULT_SOURCE_ROOT: &str = "../..";

static PACKAGE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap()
});

const PACKAGE_NAME_RULE: &str = "a package name with at least two segments, such as com.example.app";

/// Why a descriptor failed to resolve
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("plugins: unknown plugin id '{id}'")]
    UnknownPlugin { id: String },

    #[error("plugins: plugin id '{id}' is applied more than once")]
    DuplicatePlugin { id: String },

    #[error("{field}: cannot resolve '{symbol}': {reason}")]
    UnresolvedVersion {
        field: String,
        symbol: String,
        reason: String,
    },

    #[error("{field}: required field is missing")]
    MissingField { field: String },

    #[error("{field}: invalid value '{value}': {reason}")]
    InvalidIdentity {
        field: String,
        value: String,
        reason: String,
    },

    #[error(
        "sourceCompatibility: {source_level} is newer than targetCompatibility {target_level}"
    )]
    IncompatibleLanguageLevel {
        source_level: CompatibilityLevel,
        target_level: CompatibilityLevel,
    },

    #[error(
        "buildTypes.{variant}.signingConfig: '{config}' is not a declared signing configuration (declared: {})",
        .declared.join(", ")
    )]
    DanglingSigningReference {
        variant: String,
        config: String,
        declared: Vec<String>,
    },

    #[error("buildTypes.{variant}.signingConfig: signed with the debug keys, production signing is required")]
    PlaceholderSigning { variant: String },
}

impl ResolveError {
    /// Descriptor field the error is about
    pub fn field(&self) -> String {
        match self {
            ResolveError::UnknownPlugin { .. } | ResolveError::DuplicatePlugin { .. } => {
                "plugins".to_string()
            }
            ResolveError::UnresolvedVersion { field, .. }
            | ResolveError::MissingField { field }
            | ResolveError::InvalidIdentity { field, .. } => field.clone(),
            ResolveError::IncompatibleLanguageLevel { .. } => "sourceCompatibility".to_string(),
            ResolveError::DanglingSigningReference { variant, .. }
            | ResolveError::PlaceholderSigning { variant } => {
                format!("buildTypes.{}.signingConfig", variant)
            }
        }
    }

    /// Core error code
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::UnknownPlugin { .. } => ErrorCode::UnknownPlugin,
            ResolveError::DuplicatePlugin { .. } => ErrorCode::DuplicatePlugin,
            ResolveError::UnresolvedVersion { .. } => ErrorCode::UnresolvedVersion,
            ResolveError::MissingField { .. } => ErrorCode::MissingField,
            ResolveError::InvalidIdentity { .. } => ErrorCode::InvalidIdentity,
            ResolveError::IncompatibleLanguageLevel { .. } => ErrorCode::IncompatibleLanguageLevel,
            ResolveError::DanglingSigningReference { .. } => ErrorCode::DanglingSigningReference,
            ResolveError::PlaceholderSigning { .. } => ErrorCode::PlaceholderSigning,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ResolveError::UnknownPlugin { id } => Some(format!(
                "Add \"{}\" to [resolver] known_plugins in .droidcfg.toml if it is intentional",
                id
            )),
            ResolveError::UnresolvedVersion { symbol, .. } => Some(format!(
                "Define {} in local.properties or under [catalog.overrides]",
                symbol
            )),
            ResolveError::DanglingSigningReference { config, .. } => Some(format!(
                "Declare it with signingConfigs {{ create(\"{}\") {{ ... }} }}",
                config
            )),
            ResolveError::PlaceholderSigning { .. } => Some(
                "Create a release signing configuration, or drop --require-release-signing for local builds"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl From<ResolveError> for droidcfg_core::Error {
    fn from(err: ResolveError) -> Self {
        let mut core = droidcfg_core::Error::new(err.code(), err.to_string())
            .with_context(format!("field {}", err.field()));
        if let Some(suggestion) = err.suggestion() {
            core = core.with_suggestion(suggestion);
        }
        core
    }
}

/// Resolution policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvePolicy {
    /// Reject a `release` variant bound to the debug signing configuration
    pub require_release_signing: bool,
}

/// Resolves descriptors against a plugin registry and a version catalog
pub struct Resolver<'a> {
    registry: &'a dyn PluginRegistry,
    catalog: &'a dyn VersionCatalog,
    policy: ResolvePolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a dyn PluginRegistry, catalog: &'a dyn VersionCatalog) -> Self {
        Self {
            registry,
            catalog,
            policy: ResolvePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ResolvePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve a descriptor into an immutable configuration
    #[instrument(skip_all, fields(origin = ?descriptor.origin))]
    pub fn resolve(&self, descriptor: &Descriptor) -> Result<ResolvedConfig, ResolveError> {
        let plugins = self.check_plugins(descriptor)?;

        let dc = &descriptor.default_config;
        let compile_sdk = self.value("compileSdk", descriptor.compile_sdk.as_ref())?;
        let ndk_version = descriptor
            .ndk_version
            .as_ref()
            .map(|b| self.bind("ndkVersion", b))
            .transpose()?;
        let application_id = dc
            .application_id
            .clone()
            .ok_or_else(|| missing("applicationId"))?;
        let min_sdk = self.value("minSdk", dc.min_sdk.as_ref())?;
        let target_sdk = self.value("targetSdk", dc.target_sdk.as_ref())?;
        let version_code = self.value("versionCode", dc.version_code.as_ref())?;
        let version_name: String = self.value("versionName", dc.version_name.as_ref())?;
        let namespace = descriptor
            .namespace
            .clone()
            .unwrap_or_else(|| application_id.clone());

        let identity = Validator::new()
            .required("applicationId", &application_id)
            .matches("applicationId", &application_id, &PACKAGE_NAME, PACKAGE_NAME_RULE)
            .matches("namespace", &namespace, &PACKAGE_NAME, PACKAGE_NAME_RULE)
            .range("minSdk", min_sdk, 1, u32::MAX)
            .ordered("minSdk", ("minSdk", min_sdk), ("targetSdk", target_sdk))
            .range("versionCode", version_code, 1, MAX_VERSION_CODE)
            .required("versionName", &version_name)
            .warn_if(
                "targetSdk",
                target_sdk > compile_sdk,
                "targetSdk is higher than compileSdk",
            )
            .validate();

        if let Some(err) = identity.first_error() {
            return Err(ResolveError::InvalidIdentity {
                field: err.field.clone(),
                value: err.actual.clone().unwrap_or_default(),
                reason: err.message.clone(),
            });
        }

        let mut warnings: Vec<Diagnostic> = identity
            .warnings()
            .iter()
            .map(|w| Diagnostic {
                field: w.field.clone(),
                message: w.message.clone(),
            })
            .collect();

        let compatibility = self.check_compatibility(descriptor, &mut warnings)?;
        let (build_types, signing_configs) = self.check_signing(descriptor, &mut warnings)?;

        let source_root = descriptor
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_ROOT));
        let source_dir = descriptor.base_dir().map(|dir| dir.join(&source_root));

        for w in &warnings {
            warn!(field = %w.field, "{}", w.message);
        }
        debug!(
            application_id = %application_id,
            min_sdk,
            target_sdk,
            compile_sdk,
            "Descriptor resolved"
        );

        Ok(ResolvedParts {
            namespace,
            application_id,
            compile_sdk,
            min_sdk,
            target_sdk,
            ndk_version,
            version_code,
            version_name,
            plugins,
            compatibility,
            build_types,
            signing_configs,
            signing_bindings: descriptor.signing_bindings.clone(),
            source_root,
            source_dir,
            warnings,
        }
        .into())
    }

    fn check_plugins(&self, descriptor: &Descriptor) -> Result<Vec<String>, ResolveError> {
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(descriptor.plugins.len());

        for plugin in &descriptor.plugins {
            if !self.registry.is_known(&plugin.id) {
                return Err(ResolveError::UnknownPlugin {
                    id: plugin.id.clone(),
                });
            }
            if !seen.insert(canonical_plugin_id(&plugin.id)) {
                return Err(ResolveError::DuplicatePlugin {
                    id: plugin.id.clone(),
                });
            }
            ids.push(plugin.id.clone());
        }

        debug!(count = ids.len(), "Plugins verified");
        Ok(ids)
    }

    fn value<T>(&self, field: &str, binding: Option<&Binding<T>>) -> Result<T, ResolveError>
    where
        T: FromStr + Clone,
        T::Err: Display,
    {
        let binding = binding.ok_or_else(|| missing(field))?;
        self.bind(field, binding)
    }

    fn bind<T>(&self, field: &str, binding: &Binding<T>) -> Result<T, ResolveError>
    where
        T: FromStr + Clone,
        T::Err: Display,
    {
        let symbol = match binding {
            Binding::Literal(value) => return Ok(value.clone()),
            Binding::Symbol { symbol } => symbol,
        };

        let unresolved = |reason: String| ResolveError::UnresolvedVersion {
            field: field.to_string(),
            symbol: symbol.clone(),
            reason,
        };

        let raw = self
            .catalog
            .lookup(symbol)
            .map_err(|e: CatalogError| unresolved(e.to_string()))?
            .ok_or_else(|| unresolved(format!("not defined in {}", self.catalog.describe())))?;

        let value = raw
            .trim()
            .parse::<T>()
            .map_err(|e| unresolved(format!("catalog value '{}' is invalid: {}", raw, e)))?;

        debug!(field, symbol = %symbol, value = %raw.trim(), "Symbol resolved");
        Ok(value)
    }

    fn check_compatibility(
        &self,
        descriptor: &Descriptor,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<Compatibility, ResolveError> {
        let options = &descriptor.compile_options;
        let source = options.source_compatibility.unwrap_or_default();
        let target = options.target_compatibility.unwrap_or(source);

        if source > target {
            return Err(ResolveError::IncompatibleLanguageLevel {
                source_level: source,
                target_level: target,
            });
        }

        if let Some(jvm_target) = options.jvm_target {
            if jvm_target != target {
                warnings.push(Diagnostic {
                    field: "jvmTarget".to_string(),
                    message: format!(
                        "Kotlin jvmTarget {} differs from targetCompatibility {}",
                        jvm_target, target
                    ),
                });
            }
        }

        Ok(Compatibility {
            source,
            target,
            jvm_target: options.jvm_target,
        })
    }

    fn check_signing(
        &self,
        descriptor: &Descriptor,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<(BTreeSet<String>, BTreeSet<String>), ResolveError> {
        let signing_configs: BTreeSet<String> = std::iter::once(DEBUG_SIGNING_CONFIG.to_string())
            .chain(descriptor.signing_configs.iter().cloned())
            .collect();

        for (variant, config) in &descriptor.signing_bindings {
            if !signing_configs.contains(config) {
                return Err(ResolveError::DanglingSigningReference {
                    variant: variant.clone(),
                    config: config.clone(),
                    declared: signing_configs.iter().cloned().collect(),
                });
            }
        }

        if descriptor.signing_bindings.get(RELEASE_VARIANT).map(String::as_str)
            == Some(DEBUG_SIGNING_CONFIG)
        {
            if self.policy.require_release_signing {
                return Err(ResolveError::PlaceholderSigning {
                    variant: RELEASE_VARIANT.to_string(),
                });
            }
            warnings.push(Diagnostic {
                field: format!("buildTypes.{}.signingConfig", RELEASE_VARIANT),
                message: "release is signed with the debug keys; not suitable for distribution"
                    .to_string(),
            });
        }

        let build_types: BTreeSet<String> = [DEBUG_SIGNING_CONFIG, RELEASE_VARIANT]
            .into_iter()
            .map(str::to_string)
            .chain(descriptor.build_types.iter().cloned())
            .chain(descriptor.signing_bindings.keys().cloned())
            .collect();

        Ok((build_types, signing_configs))
    }
}

fn missing(field: &str) -> ResolveError {
    ResolveError::MissingField {
        field: field.to_string(),
    }
}

/// Resolve with an explicit registry, catalog and policy
pub fn resolve(
    descriptor: &Descriptor,
    registry: &dyn PluginRegistry,
    catalog: &dyn VersionCatalog,
    policy: ResolvePolicy,
) -> Result<ResolvedConfig, ResolveError> {
    Resolver::new(registry, catalog)
        .with_policy(policy)
        .resolve(descriptor)
}
