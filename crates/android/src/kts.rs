//! Gradle Kotlin DSL reader for `build.gradle.kts`
//!
//! This is not a Kotlin parser. It splits the script into statements and
//! blocks (respecting strings and comments), tracks the block path, and
//! extracts the handful of assignments and calls that make up an Android
//! application descriptor. Everything else is skipped.

use crate::descriptor::{Binding, CompatibilityLevel, Descriptor, DescriptorError, PluginReference};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::str::FromStr;

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+)$").unwrap());

static PLUGIN_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(id|kotlin)\s*\(\s*"([^"]+)"\s*\)(?:\s+version\s+"[^"]*")?(?:\s+apply\s+(?:true|false))?$"#)
        .unwrap()
});

static BLOCK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([A-Za-z_][A-Za-z0-9_]*)(?:\s*\(\s*"([^"]*)"\s*\))?$"#).unwrap()
});

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"((?:[^"\\]|\\.)*)"$"#).unwrap());

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

static JAVA_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(JavaVersion\.VERSION_[0-9_]+|JvmTarget\.JVM_[0-9_]+)(?:\.toString\(\))?$").unwrap()
});

static SIGNING_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^signingConfigs(?:\??\.(?:getByName|named)\(\s*"([^"]+)"\s*\)(?:\??\.get\(\))?|\[\s*"([^"]+)"\s*\])$"#)
        .unwrap()
});

static SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)+$").unwrap());

/// Calls that open a named container element (`create("release") { ... }`)
const CONTAINER_CALLS: &[&str] = &["create", "getByName", "named", "register", "maybeCreate"];

/// Container-wide lambdas (`buildTypes { all { ... } }`) that do not name an element
const CONTAINER_LAMBDAS: &[&str] = &["all", "configureEach", "forEach", "whenObjectAdded"];

/// Kotlin plugin shorthand: `kotlin("android")` applies `org.jetbrains.kotlin.android`
const KOTLIN_PLUGIN_PREFIX: &str = "org.jetbrains.kotlin.";

/// Parse a `build.gradle.kts` script into a [`Descriptor`]
pub fn parse(source: &str) -> Result<Descriptor, DescriptorError> {
    let mut reader = Reader::default();
    scan(source, &mut reader)?;
    Ok(reader.descriptor)
}

/// A block on the path from the script root to the current statement
#[derive(Debug, Clone)]
struct Block {
    name: String,
    arg: Option<String>,
    line: usize,
}

impl Block {
    fn from_header(header: &str, line: usize) -> Self {
        match BLOCK_HEADER.captures(header) {
            Some(caps) => Block {
                name: caps[1].to_string(),
                arg: caps.get(2).map(|m| m.as_str().to_string()),
                line,
            },
            // Lambdas, generic calls, `if`/`else`: opaque to the reader
            None => Block {
                name: header.to_string(),
                arg: None,
                line,
            },
        }
    }

    /// Element name for `release { }` or `create("release") { }`
    fn element_name(&self) -> Option<&str> {
        match &self.arg {
            Some(arg) if CONTAINER_CALLS.contains(&self.name.as_str()) => Some(arg.as_str()),
            Some(_) => None,
            None if CONTAINER_LAMBDAS.contains(&self.name.as_str()) => None,
            None if BLOCK_HEADER.is_match(&self.name) => Some(self.name.as_str()),
            None => None,
        }
    }
}

#[derive(Debug, Default)]
struct Reader {
    descriptor: Descriptor,
    stack: Vec<Block>,
}

impl Reader {
    fn open(&mut self, header: &str, line: usize) {
        let block = Block::from_header(header, line);
        let mut path = block_path(&self.stack);
        path.push(&block.name);

        match path.as_slice() {
            ["android", "signingConfigs", _] => {
                if let Some(name) = block.element_name() {
                    push_unique(&mut self.descriptor.signing_configs, name);
                }
            }
            ["android", "buildTypes", _] => {
                if let Some(name) = block.element_name() {
                    push_unique(&mut self.descriptor.build_types, name);
                }
            }
            _ => {}
        }

        self.stack.push(block);
    }

    fn close(&mut self, line: usize) -> Result<(), DescriptorError> {
        self.stack.pop().map(|_| ()).ok_or(DescriptorError::Parse {
            line,
            message: "unexpected '}' with no open block".to_string(),
        })
    }

    fn statement(&mut self, text: &str, line: usize) -> Result<(), DescriptorError> {
        let path = block_path(&self.stack);

        if path.as_slice() == ["plugins"] {
            let caps = PLUGIN_CALL.captures(text).ok_or_else(|| DescriptorError::Parse {
                line,
                message: format!("unsupported plugin declaration: {}", text),
            })?;
            let id = match &caps[1] {
                "kotlin" => format!("{}{}", KOTLIN_PLUGIN_PREFIX, &caps[2]),
                _ => caps[2].to_string(),
            };
            self.descriptor.plugins.push(PluginReference::new(id));
            return Ok(());
        }

        let Some(caps) = ASSIGNMENT.captures(text) else {
            tracing::debug!(line, statement = text, "Skipping statement");
            return Ok(());
        };
        let key = &caps[1];
        let value = caps[2].trim();

        let d = &mut self.descriptor;
        match (path.as_slice(), key) {
            (["android"], "namespace") => d.namespace = Some(string(value, key, line)?),
            (["android"], "compileSdk") => d.compile_sdk = Some(binding(value, key, line)?),
            (["android"], "ndkVersion") => d.ndk_version = Some(binding(value, key, line)?),

            (["android", "compileOptions"], "sourceCompatibility") => {
                d.compile_options.source_compatibility = Some(level(value, key, line)?)
            }
            (["android", "compileOptions"], "targetCompatibility") => {
                d.compile_options.target_compatibility = Some(level(value, key, line)?)
            }
            (["android", "kotlinOptions"], "jvmTarget") => {
                d.compile_options.jvm_target = Some(level(value, key, line)?)
            }

            (["android", "defaultConfig"], "applicationId") => {
                d.default_config.application_id = Some(string(value, key, line)?)
            }
            (["android", "defaultConfig"], "minSdk") => {
                d.default_config.min_sdk = Some(binding(value, key, line)?)
            }
            (["android", "defaultConfig"], "targetSdk") => {
                d.default_config.target_sdk = Some(binding(value, key, line)?)
            }
            (["android", "defaultConfig"], "versionCode") => {
                d.default_config.version_code = Some(binding(value, key, line)?)
            }
            (["android", "defaultConfig"], "versionName") => {
                d.default_config.version_name = Some(binding(value, key, line)?)
            }

            (["android", "buildTypes", _], "signingConfig") => {
                let variant = self
                    .stack
                    .last()
                    .and_then(Block::element_name)
                    .map(str::to_string);
                let Some(variant) = variant else {
                    tracing::debug!(line, "signingConfig outside a named build type");
                    return Ok(());
                };
                match signing_ref(value, line)? {
                    Some(config) => {
                        d.signing_bindings.insert(variant, config);
                    }
                    None => {
                        d.signing_bindings.remove(&variant);
                    }
                }
            }

            (["flutter"], "source") => d.source_root = Some(PathBuf::from(string(value, key, line)?)),

            _ => tracing::debug!(line, key, "Skipping assignment"),
        }

        Ok(())
    }

    fn finish(&self) -> Result<(), DescriptorError> {
        match self.stack.last() {
            Some(block) => Err(DescriptorError::Parse {
                line: block.line,
                message: format!("block '{}' is never closed", block.name),
            }),
            None => Ok(()),
        }
    }
}

fn block_path(stack: &[Block]) -> Vec<&str> {
    stack.iter().map(|b| b.name.as_str()).collect()
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

fn unsupported(key: &str, value: &str, line: usize) -> DescriptorError {
    DescriptorError::Parse {
        line,
        message: format!("unsupported value for {}: {}", key, value),
    }
}

fn string(value: &str, key: &str, line: usize) -> Result<String, DescriptorError> {
    STRING_LITERAL
        .captures(value)
        .map(|caps| unescape(&caps[1]))
        .ok_or_else(|| unsupported(key, value, line))
}

fn binding<T: FromStr>(value: &str, key: &str, line: usize) -> Result<Binding<T>, DescriptorError> {
    if SYMBOL.is_match(value) {
        return Ok(Binding::symbol(value));
    }

    let literal = if INTEGER.is_match(value) {
        value.to_string()
    } else {
        string(value, key, line)?
    };

    literal
        .parse::<T>()
        .map(Binding::Literal)
        .map_err(|_| unsupported(key, value, line))
}

fn level(value: &str, key: &str, line: usize) -> Result<CompatibilityLevel, DescriptorError> {
    let raw = match JAVA_VERSION.captures(value) {
        Some(caps) => caps[1].to_string(),
        None => string(value, key, line)?,
    };
    raw.parse().map_err(|_| unsupported(key, value, line))
}

/// `Some(name)` for a signing configuration reference, `None` for `null`
fn signing_ref(value: &str, line: usize) -> Result<Option<String>, DescriptorError> {
    if value == "null" {
        return Ok(None);
    }
    SIGNING_REF
        .captures(value)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| Some(m.as_str().to_string()))
        .ok_or_else(|| unsupported("signingConfig", value, line))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment(usize),
    Str,
    RawStr,
    Char,
}

/// Split the script into block headers, statements and block ends
fn scan(source: &str, reader: &mut Reader) -> Result<(), DescriptorError> {
    let chars: Vec<char> = source.chars().collect();
    let mut state = State::Code;
    let mut current = String::new();
    let mut start_line = 1;
    let mut line = 1;
    let mut parens = 0usize;
    let mut string_line = 1;
    let mut i = 0;

    let at = |i: usize, s: &str| -> bool {
        s.chars().enumerate().all(|(k, c)| chars.get(i + k) == Some(&c))
    };

    while i < chars.len() {
        let c = chars[i];

        match state {
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    continue;
                }
            }
            State::BlockComment(depth) => {
                if at(i, "*/") {
                    state = if depth == 1 { State::Code } else { State::BlockComment(depth - 1) };
                    i += 2;
                    continue;
                }
                if at(i, "/*") {
                    state = State::BlockComment(depth + 1);
                    i += 2;
                    continue;
                }
            }
            State::Str | State::Char => {
                current.push(c);
                if c == '\\' {
                    if let Some(&next) = chars.get(i + 1) {
                        current.push(next);
                        i += 1;
                    }
                } else if (state == State::Str && c == '"') || (state == State::Char && c == '\'') {
                    state = State::Code;
                } else if c == '\n' {
                    return Err(DescriptorError::Parse {
                        line: string_line,
                        message: "unterminated string literal".to_string(),
                    });
                }
            }
            State::RawStr => {
                if at(i, "\"\"\"") {
                    current.push_str("\"\"\"");
                    state = State::Code;
                    i += 3;
                    continue;
                }
                current.push(c);
            }
            State::Code => {
                if at(i, "//") {
                    state = State::LineComment;
                    i += 2;
                    continue;
                }
                if at(i, "/*") {
                    state = State::BlockComment(1);
                    i += 2;
                    continue;
                }
                match c {
                    '"' if at(i, "\"\"\"") => {
                        begin(&mut current, &mut start_line, line);
                        current.push_str("\"\"\"");
                        state = State::RawStr;
                        string_line = line;
                        i += 3;
                        continue;
                    }
                    '"' | '\'' => {
                        begin(&mut current, &mut start_line, line);
                        current.push(c);
                        state = if c == '"' { State::Str } else { State::Char };
                        string_line = line;
                    }
                    '(' => {
                        parens += 1;
                        current.push(c);
                    }
                    ')' => {
                        parens = parens.saturating_sub(1);
                        current.push(c);
                    }
                    '{' => {
                        let header_line = if current.trim().is_empty() { line } else { start_line };
                        reader.open(current.trim(), header_line);
                        current.clear();
                        parens = 0;
                    }
                    '}' => {
                        flush(&mut current, start_line, reader)?;
                        reader.close(line)?;
                        parens = 0;
                    }
                    ';' => flush(&mut current, start_line, reader)?,
                    '\n' => {
                        if continues(&current, parens) || chain_follows(&chars, i + 1) {
                            if !current.ends_with('.') {
                                current.push(' ');
                            }
                        } else {
                            flush(&mut current, start_line, reader)?;
                        }
                    }
                    '?' if at(i, "?.") => {
                        join_member_access(&mut current);
                        current.push_str("?.");
                        i += 2;
                        continue;
                    }
                    '.' => {
                        join_member_access(&mut current);
                        begin(&mut current, &mut start_line, line);
                        current.push('.');
                    }
                    c if c.is_whitespace() => {
                        if !current.is_empty() && !current.ends_with('.') {
                            current.push(c);
                        }
                    }
                    c => {
                        begin(&mut current, &mut start_line, line);
                        current.push(c);
                    }
                }
            }
        }

        if c == '\n' {
            line += 1;
        }
        i += 1;
    }

    match state {
        State::Str | State::Char | State::RawStr => {
            return Err(DescriptorError::Parse {
                line: string_line,
                message: "unterminated string literal".to_string(),
            });
        }
        State::BlockComment(_) => {
            return Err(DescriptorError::Parse {
                line,
                message: "unterminated block comment".to_string(),
            });
        }
        State::Code | State::LineComment => {}
    }

    flush(&mut current, start_line, reader)?;
    reader.finish()
}

fn begin(current: &mut String, start_line: &mut usize, line: usize) {
    if current.trim().is_empty() {
        *start_line = line;
    }
}

/// A statement carries on to the next line inside parentheses or after a
/// trailing operator
fn continues(current: &str, parens: usize) -> bool {
    let trimmed = current.trim_end();
    parens > 0 || trimmed.ends_with('=') || trimmed.ends_with('.') || trimmed.ends_with(',')
}

/// Whether the next significant token, past whitespace and comments, is a
/// member access (`.name` or `?.name`) continuing the current expression
fn chain_follows(chars: &[char], mut j: usize) -> bool {
    let at = |j: usize, s: &str| s.chars().enumerate().all(|(k, c)| chars.get(j + k) == Some(&c));

    while j < chars.len() {
        if chars[j].is_whitespace() {
            j += 1;
        } else if at(j, "//") {
            while j < chars.len() && chars[j] != '\n' {
                j += 1;
            }
        } else if at(j, "/*") {
            let mut depth = 0usize;
            while j < chars.len() {
                if at(j, "/*") {
                    depth += 1;
                    j += 2;
                } else if at(j, "*/") {
                    depth -= 1;
                    j += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    j += 1;
                }
            }
        } else {
            return (chars[j] == '.' && !at(j, "..")) || at(j, "?.");
        }
    }
    false
}

/// `a .b` and `a\n    .b` read as `a.b`
fn join_member_access(current: &mut String) {
    let len = current.trim_end().len();
    current.truncate(len);
}

fn flush(current: &mut String, line: usize, reader: &mut Reader) -> Result<(), DescriptorError> {
    let text = current.trim().to_string();
    current.clear();
    if text.is_empty() {
        return Ok(());
    }
    reader.statement(&text, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLUTTER_APP: &str = r#"
plugins {
    id("com.android.application")
    id("kotlin-android")
    // The Flutter Gradle Plugin must be applied after the Android and Kotlin Gradle plugins.
    id("dev.flutter.flutter-gradle-plugin")
    id("com.google.gms.google-services")
}

android {
    namespace = "com.example.gym_buddy_ali_try"
    compileSdk = flutter.compileSdkVersion
    ndkVersion = flutter.ndkVersion

    compileOptions {
        sourceCompatibility = JavaVersion.VERSION_17
        targetCompatibility = JavaVersion.VERSION_17
    }

    kotlinOptions {
        jvmTarget = JavaVersion.VERSION_17.toString()
    }

    defaultConfig {
        applicationId = "com.example.gym_buddy_ali_try"
        minSdk = flutter.minSdkVersion
        targetSdk = flutter.targetSdkVersion
        versionCode = flutter.versionCode
        versionName = flutter.versionName
    }

    buildTypes {
        release {
            /* Signing with the debug keys for now, so `flutter run --release` works. */
            signingConfig = signingConfigs.getByName("debug")
        }
    }
}

flutter {
    source = "../.."
}
"#;

    #[test]
    fn test_parse_flutter_app() {
        let d = parse(FLUTTER_APP).unwrap();

        let ids: Vec<_> = d.plugins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "com.android.application",
                "kotlin-android",
                "dev.flutter.flutter-gradle-plugin",
                "com.google.gms.google-services",
            ]
        );
        assert_eq!(d.namespace.as_deref(), Some("com.example.gym_buddy_ali_try"));
        assert_eq!(d.compile_sdk, Some(Binding::symbol("flutter.compileSdkVersion")));
        assert_eq!(d.ndk_version, Some(Binding::symbol("flutter.ndkVersion")));
        assert_eq!(d.compile_options.source_compatibility, Some(CompatibilityLevel::JAVA_17));
        assert_eq!(d.compile_options.target_compatibility, Some(CompatibilityLevel::JAVA_17));
        assert_eq!(d.compile_options.jvm_target, Some(CompatibilityLevel::JAVA_17));
        assert_eq!(
            d.default_config.application_id.as_deref(),
            Some("com.example.gym_buddy_ali_try")
        );
        assert_eq!(d.default_config.min_sdk, Some(Binding::symbol("flutter.minSdkVersion")));
        assert_eq!(d.default_config.version_name, Some(Binding::symbol("flutter.versionName")));
        assert_eq!(d.build_types, vec!["release"]);
        assert_eq!(d.signing_bindings.get("release").map(String::as_str), Some("debug"));
        assert!(d.signing_configs.is_empty());
        assert_eq!(d.source_root, Some(PathBuf::from("../..")));
    }

    #[test]
    fn test_parse_literals_and_signing_configs() {
        let d = parse(
            r#"
plugins {
    id("com.android.application") version "8.7.0" apply false
    kotlin("android")
}
android {
    compileSdk = 35
    defaultConfig {
        applicationId = "com.example.app"
        minSdk = 21
        targetSdk = 34
        versionCode = 12
        versionName = "2.1.0"
    }
    signingConfigs {
        create("upload") {
            storeFile = file("upload.jks")
            storePassword = System.getenv("STORE_PASSWORD")
        }
    }
    buildTypes {
        getByName("release") {
            isMinifyEnabled = true
            signingConfig = signingConfigs.getByName("upload")
        }
        create("staging") { signingConfig = signingConfigs["debug"] }
    }
}
"#,
        )
        .unwrap();

        assert_eq!(d.plugins[0].id, "com.android.application");
        assert_eq!(d.plugins[1].id, "org.jetbrains.kotlin.android");
        assert_eq!(d.compile_sdk, Some(Binding::Literal(35)));
        assert_eq!(d.default_config.min_sdk, Some(Binding::Literal(21)));
        assert_eq!(d.default_config.version_code, Some(Binding::Literal(12)));
        assert_eq!(d.default_config.version_name, Some(Binding::Literal("2.1.0".into())));
        assert_eq!(d.signing_configs, vec!["upload"]);
        assert_eq!(d.build_types, vec!["release", "staging"]);
        assert_eq!(d.signing_bindings["release"], "upload");
        assert_eq!(d.signing_bindings["staging"], "debug");
    }

    #[test]
    fn test_signing_config_null_removes_binding() {
        let d = parse(
            "android {\n buildTypes {\n release {\n signingConfig = signingConfigs.getByName(\"debug\")\n signingConfig = null\n }\n }\n}\n",
        )
        .unwrap();
        assert!(d.signing_bindings.is_empty());
        assert_eq!(d.build_types, vec!["release"]);
    }

    #[test]
    fn test_multiline_statement() {
        let d = parse(
            "android {\n    buildTypes {\n        release {\n            signingConfig =\n                signingConfigs.getByName(\"debug\")\n        }\n    }\n}\n",
        )
        .unwrap();
        assert_eq!(d.signing_bindings["release"], "debug");
    }

    #[test]
    fn test_chained_call_on_next_line() {
        let d = parse(
            r#"
android {
    buildTypes {
        release {
            signingConfig = signingConfigs
                // upload keys live in CI
                .getByName("debug")
        }
        getByName("debug") {
            signingConfig = signingConfigs
                ?.getByName("debug")
        }
    }
    compileOptions {
        sourceCompatibility = JavaVersion
            .VERSION_1_9
    }
}
"#,
        )
        .unwrap();
        assert_eq!(d.signing_bindings["release"], "debug");
        assert_eq!(d.build_types, vec!["release", "debug"]);
        assert_eq!(
            d.compile_options.source_compatibility.map(CompatibilityLevel::release),
            Some(9)
        );
    }

    #[test]
    fn test_statement_ends_when_next_line_is_not_a_member_access() {
        let d = parse("android {\n    namespace = \"a.b\"\n    compileSdk = 35\n}\n").unwrap();
        assert_eq!(d.namespace.as_deref(), Some("a.b"));
        assert_eq!(d.compile_sdk, Some(Binding::Literal(35)));
    }

    #[test]
    fn test_single_line_blocks_and_semicolons() {
        let d = parse(
            "android { namespace = \"a.b\"; defaultConfig { minSdk = 24; targetSdk = 34 } }",
        )
        .unwrap();
        assert_eq!(d.namespace.as_deref(), Some("a.b"));
        assert_eq!(d.default_config.min_sdk, Some(Binding::Literal(24)));
        assert_eq!(d.default_config.target_sdk, Some(Binding::Literal(34)));
    }

    #[test]
    fn test_braces_in_strings_and_comments_are_ignored() {
        let d = parse(
            r#"
/* android { /* nested */ compileSdk = 1 } */
android {
    namespace = "com.example.{odd}"   // trailing } comment
}
"#,
        )
        .unwrap();
        assert_eq!(d.namespace.as_deref(), Some("com.example.{odd}"));
        assert!(d.compile_sdk.is_none());
    }

    #[test]
    fn test_unknown_blocks_are_skipped() {
        let d = parse(
            r#"
android {
    packaging { resources.excludes += "/META-INF/{AL2.0,LGPL2.1}" }
    applicationVariants.all { variant ->
        variant.outputs.forEach { println(it) }
    }
    lint { abortOnError = false }
}
dependencies {
    implementation("androidx.core:core-ktx:1.13.1")
}
"#,
        )
        .unwrap();
        assert!(d.plugins.is_empty());
        assert!(d.build_types.is_empty());
    }

    #[test]
    fn test_unbalanced_close() {
        let err = parse("android {\n}\n}\n").unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_unclosed_block_reports_opening_line() {
        let err = parse("\n\nandroid {\n  namespace = \"a.b\"\n").unwrap_err();
        match err {
            DescriptorError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("android"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("android {\n    namespace = \"com.example\n}\n").unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_plugin_alias_is_rejected() {
        let err = parse("plugins {\n    alias(libs.plugins.android.application)\n}\n").unwrap_err();
        match err {
            DescriptorError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("alias"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_value() {
        let err = parse("android {\n    compileSdk = 30 + 4\n}\n").unwrap_err();
        assert!(err.to_string().contains("compileSdk"));
    }

    #[test]
    fn test_string_escapes() {
        let d = parse("android { defaultConfig { versionName = \"1.0 \\\"beta\\\"\" } }").unwrap();
        assert_eq!(
            d.default_config.version_name,
            Some(Binding::Literal("1.0 \"beta\"".into()))
        );
    }
}
