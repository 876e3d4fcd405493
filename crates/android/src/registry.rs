//! Known Gradle plugin ids

use std::collections::BTreeSet;

/// Plugin ids shipped with the Android, Kotlin, Flutter and Google toolchains
pub const BUILTIN_PLUGINS: &[&str] = &[
    // Android Gradle plugin
    "com.android.application",
    "com.android.library",
    "com.android.test",
    "com.android.dynamic-feature",
    // Kotlin
    "kotlin-android",
    "kotlin-kapt",
    "kotlin-parcelize",
    "org.jetbrains.kotlin.android",
    "org.jetbrains.kotlin.kapt",
    "org.jetbrains.kotlin.plugin.compose",
    "org.jetbrains.kotlin.plugin.parcelize",
    "org.jetbrains.kotlin.plugin.serialization",
    "com.google.devtools.ksp",
    // Flutter
    "dev.flutter.flutter-gradle-plugin",
    "dev.flutter.flutter-plugin-loader",
    // Google / Firebase
    "com.google.gms.google-services",
    "com.google.firebase.crashlytics",
    "com.google.firebase.firebase-perf",
    "com.google.firebase.appdistribution",
    "com.google.dagger.hilt.android",
    "androidx.navigation.safeargs.kotlin",
];

/// Legacy short ids and the plugin each one applies
const PLUGIN_ALIASES: &[(&str, &str)] = &[
    ("kotlin-android", "org.jetbrains.kotlin.android"),
    ("kotlin-kapt", "org.jetbrains.kotlin.kapt"),
    ("kotlin-parcelize", "org.jetbrains.kotlin.plugin.parcelize"),
];

/// The id a plugin is applied under, whichever alias named it
///
/// `id("kotlin-android")` and `kotlin("android")` apply the same plugin.
pub fn canonical_plugin_id(id: &str) -> &str {
    PLUGIN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == id)
        .map_or(id, |(_, canonical)| canonical)
}

/// Answers whether a plugin id can be applied
pub trait PluginRegistry {
    fn is_known(&self, id: &str) -> bool;
}

impl<F> PluginRegistry for F
where
    F: Fn(&str) -> bool,
{
    fn is_known(&self, id: &str) -> bool {
        self(id)
    }
}

/// Fixed set of plugin ids
#[derive(Debug, Clone, Default)]
pub struct StaticPluginRegistry {
    ids: BTreeSet<String>,
}

impl StaticPluginRegistry {
    /// Registry holding [`BUILTIN_PLUGINS`]
    pub fn builtin() -> Self {
        Self::default().with_plugins(BUILTIN_PLUGINS.iter().copied())
    }

    /// Add plugin ids
    pub fn with_plugins<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Known ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl PluginRegistry for StaticPluginRegistry {
    fn is_known(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_knows_flutter_template_plugins() {
        let registry = StaticPluginRegistry::builtin();
        for id in [
            "com.android.application",
            "kotlin-android",
            "dev.flutter.flutter-gradle-plugin",
            "com.google.gms.google-services",
        ] {
            assert!(registry.is_known(id), "{}", id);
        }
        assert!(!registry.is_known("com.example.unknown"));
        assert_eq!(registry.len(), BUILTIN_PLUGINS.len());
    }

    #[test]
    fn test_with_plugins_extends() {
        let registry = StaticPluginRegistry::builtin().with_plugins(["com.acme.build"]);
        assert!(registry.is_known("com.acme.build"));
        assert!(registry.is_known("com.android.library"));
    }

    #[test]
    fn test_ids_are_sorted() {
        let registry = StaticPluginRegistry::default().with_plugins(["b", "a", "c"]);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_closure_registry() {
        let registry = |id: &str| id.starts_with("com.android.");
        assert!(registry.is_known("com.android.application"));
        assert!(!registry.is_known("kotlin-android"));
    }

    #[test]
    fn test_canonical_plugin_id() {
        assert_eq!(canonical_plugin_id("kotlin-android"), "org.jetbrains.kotlin.android");
        assert_eq!(canonical_plugin_id("kotlin-kapt"), "org.jetbrains.kotlin.kapt");
        assert_eq!(
            canonical_plugin_id("kotlin-parcelize"),
            "org.jetbrains.kotlin.plugin.parcelize"
        );
        assert_eq!(
            canonical_plugin_id("org.jetbrains.kotlin.android"),
            "org.jetbrains.kotlin.android"
        );
        assert_eq!(canonical_plugin_id("com.android.application"), "com.android.application");
    }

    #[test]
    fn test_match_is_exact() {
        let registry = StaticPluginRegistry::builtin();
        assert!(!registry.is_known("com.android.application "));
        assert!(!registry.is_known("COM.ANDROID.APPLICATION"));
    }
}
