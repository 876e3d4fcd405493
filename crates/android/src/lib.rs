//! Android build configuration for droidcfg
//!
//! This crate turns an Android application's build descriptor into a
//! validated configuration:
//! - Descriptor model and the `build.gradle.kts` reader
//! - Plugin registry and version catalogs
//! - The resolver and its resolved configuration
//! - Gradle packaging

pub mod catalog;
pub mod descriptor;
pub mod gradle;
pub mod kts;
pub mod registry;
pub mod resolved;
pub mod resolver;

pub use catalog::{
    CatalogError, FlutterDefaults, LayeredCatalog, MapCatalog, PropertiesCatalog, VersionCatalog,
};
pub use descriptor::{
    Binding, CompatibilityLevel, CompileOptions, DefaultConfig, Descriptor, DescriptorError,
    PluginReference,
};
pub use gradle::{GradlePackager, PackageOutcome, PackageRequest, Packager};
pub use registry::{canonical_plugin_id, PluginRegistry, StaticPluginRegistry, BUILTIN_PLUGINS};
pub use resolved::{Compatibility, Diagnostic, ResolvedConfig};
pub use resolver::{resolve, ResolveError, ResolvePolicy, Resolver};
