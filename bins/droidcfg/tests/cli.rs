//! Integration tests for the droidcfg binary
//!
//! Each test lays out a small Flutter-style Android project in a temporary
//! directory and runs the binary from its root.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DESCRIPTOR: &str = r#"
plugins {
    id("com.android.application")
    id("kotlin-android")
    id("dev.flutter.flutter-gradle-plugin")
}

android {
    namespace = "com.example.app"
    compileSdk = flutter.compileSdkVersion

    compileOptions {
        sourceCompatibility = JavaVersion.VERSION_17
        targetCompatibility = JavaVersion.VERSION_17
    }

    defaultConfig {
        applicationId = "com.example.app"
        minSdk = MIN_SDK
        targetSdk = TARGET_SDK
        versionCode = flutter.versionCode
        versionName = flutter.versionName
    }

    buildTypes {
        release {
            signingConfig = signingConfigs.getByName("debug")
        }
    }
}

flutter {
    source = "../.."
}
"#;

const LOCAL_PROPERTIES: &str = "\
sdk.dir=/opt/android-sdk
flutter.versionName=2.4.1
flutter.versionCode=42
";

fn project(min_sdk: u32, target_sdk: u32) -> TempDir {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("android/app");
    fs::create_dir_all(&app).unwrap();
    fs::write(
        app.join("build.gradle.kts"),
        DESCRIPTOR
            .replace("MIN_SDK", &min_sdk.to_string())
            .replace("TARGET_SDK", &target_sdk.to_string()),
    )
    .unwrap();
    fs::write(dir.path().join("android/local.properties"), LOCAL_PROPERTIES).unwrap();
    dir
}

fn droidcfg(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("droidcfg").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("droidcfg")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("plugins"))
        .stdout(predicate::str::contains("package"));
}

#[test]
fn test_resolve_default_descriptor() {
    let dir = project(21, 34);

    droidcfg(&dir)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.app"))
        .stdout(predicate::str::contains("2.4.1"))
        .stderr(predicate::str::contains("debug keys"));
}

#[test]
fn test_resolve_json() {
    let dir = project(21, 34);

    let output = droidcfg(&dir)
        .args(["resolve", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["applicationId"], "com.example.app");
    assert_eq!(json["minSdk"], 21);
    assert_eq!(json["targetSdk"], 34);
    assert_eq!(json["versionCode"], 42);
    assert_eq!(json["compileSdk"], 35);
    assert_eq!(json["signingBindings"]["release"], "debug");
}

#[test]
fn test_min_sdk_above_target_sdk_fails() {
    let dir = project(30, 21);

    droidcfg(&dir)
        .arg("resolve")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("minSdk"))
        .stderr(predicate::str::contains("30"));
}

#[test]
fn test_json_error_report() {
    let dir = project(30, 21);

    droidcfg(&dir)
        .args(["resolve", "--format", "json"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("E9003"));
}

#[test]
fn test_unknown_plugin_fails() {
    let dir = project(21, 34);
    let path = dir.path().join("android/app/build.gradle.kts");
    let source = fs::read_to_string(&path).unwrap().replace(
        "id(\"kotlin-android\")",
        "id(\"kotlin-android\")\n    id(\"com.acme.magic\")",
    );
    fs::write(&path, source).unwrap();

    droidcfg(&dir)
        .arg("resolve")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("com.acme.magic"));

    fs::write(
        dir.path().join(".droidcfg.toml"),
        "[resolver]\nknown_plugins = [\"com.acme.magic\"]\n",
    )
    .unwrap();

    droidcfg(&dir).arg("resolve").assert().success();
}

#[test]
fn test_require_release_signing() {
    let dir = project(21, 34);

    droidcfg(&dir)
        .args(["--require-release-signing", "resolve"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("release"));
}

#[test]
fn test_missing_catalog_symbol() {
    let dir = project(21, 34);
    let path = dir.path().join("android/app/build.gradle.kts");
    let source = fs::read_to_string(&path)
        .unwrap()
        .replace("flutter.versionName", "flutter.buildName");
    fs::write(&path, source).unwrap();

    droidcfg(&dir)
        .arg("resolve")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("flutter.buildName"));
}

#[test]
fn test_explicit_missing_catalog_fails() {
    let dir = project(21, 34);

    droidcfg(&dir)
        .args(["resolve", "--catalog", "nowhere/local.properties"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn test_missing_descriptor() {
    let dir = TempDir::new().unwrap();

    droidcfg(&dir)
        .args(["resolve", "android/app/build.gradle.kts"])
        .assert()
        .failure();
}

#[test]
fn test_explicit_missing_config() {
    let dir = project(21, 34);

    droidcfg(&dir)
        .args(["--config", "missing.toml", "resolve"])
        .assert()
        .code(3);
}

#[test]
fn test_invalid_log_format_fails() {
    let dir = project(21, 34);
    fs::write(dir.path().join(".droidcfg.toml"), "[logging]\nformat = \"xml\"\n").unwrap();

    droidcfg(&dir)
        .arg("resolve")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("logging.format"))
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_misspelled_config_key_fails() {
    let dir = project(21, 34);
    fs::write(
        dir.path().join(".droidcfg.toml"),
        "[resolver]\nrequire_release_signin = true\n",
    )
    .unwrap();

    droidcfg(&dir)
        .arg("resolve")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("require_release_signin"));
}

#[test]
fn test_plugins() {
    let dir = TempDir::new().unwrap();

    droidcfg(&dir)
        .arg("plugins")
        .assert()
        .success()
        .stdout(predicate::str::contains("com.android.application"))
        .stdout(predicate::str::contains("dev.flutter.flutter-gradle-plugin"));
}

#[test]
fn test_package_unknown_variant() {
    let dir = project(21, 34);

    droidcfg(&dir)
        .args(["package", "--variant", "nightly", "--project-dir", "android"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nightly"));
}
