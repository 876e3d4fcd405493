//! Gradle packaging
//!
//! Hands a [`ResolvedConfig`] to the Gradle build: the configuration is
//! written to `build/droidcfg/resolved.json` and the variant's assemble or
//! bundle task is run through the project's wrapper.

use crate::resolved::ResolvedConfig;
use droidcfg_core::error::{Error, Result, ResultExt};
use droidcfg_core::process::{run_command_in_dir, run_command_streaming_in_dir, which_command};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolved configuration location, relative to the project directory
pub const RESOLVED_CONFIG_PATH: &str = "build/droidcfg/resolved.json";

#[cfg(windows)]
const WRAPPER: &str = "gradlew.bat";
#[cfg(not(windows))]
const WRAPPER: &str = "gradlew";

/// What to package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub variant: String,
    /// Android App Bundle instead of an APK
    pub bundle: bool,
}

impl Default for PackageRequest {
    fn default() -> Self {
        Self {
            variant: crate::resolved::RELEASE_VARIANT.to_string(),
            bundle: false,
        }
    }
}

/// Result of a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    pub task: String,
    pub exit_code: i32,
    pub resolved_path: PathBuf,
}

impl PackageOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Consumes a resolved configuration and produces a package
pub trait Packager {
    fn package(&self, config: &ResolvedConfig, request: &PackageRequest) -> Result<PackageOutcome>;
}

/// Gradle task for a variant: `assembleRelease`, `bundleStaging`, ...
pub fn task_name(variant: &str, bundle: bool) -> String {
    let verb = if bundle { "bundle" } else { "assemble" };
    let mut chars = variant.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", verb, first.to_uppercase(), chars.as_str()),
        None => verb.to_string(),
    }
}

/// Runs Gradle in an Android project directory
#[derive(Debug, Clone)]
pub struct GradlePackager {
    project_dir: PathBuf,
    streaming: bool,
}

impl GradlePackager {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            streaming: true,
        }
    }

    /// Capture Gradle output instead of inheriting the terminal
    pub fn captured(mut self) -> Self {
        self.streaming = false;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// The project's Gradle wrapper, else `gradle` on `PATH`
    pub fn gradle_command(&self) -> Result<PathBuf> {
        let wrapper = self.project_dir.join(WRAPPER);
        if wrapper.is_file() {
            return fs::canonicalize(&wrapper)
                .map_err(Error::from)
                .context(format!("Failed to resolve {}", wrapper.display()));
        }

        which_command("gradle").ok_or_else(|| {
            Error::command_not_found("gradle").with_suggestion(format!(
                "Generate a wrapper in {} with `gradle wrapper`, or install Gradle",
                self.project_dir.display()
            ))
        })
    }

    /// Write the configuration where the build scripts can read it
    pub fn write_resolved(&self, config: &ResolvedConfig) -> Result<PathBuf> {
        let path = self.project_dir.join(RESOLVED_CONFIG_PATH);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(Error::from)
                .context(format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&path, config.to_json()?)
            .map_err(Error::from)
            .context(format!("Failed to write {}", path.display()))?;

        debug!(path = %path.display(), fingerprint = %config.fingerprint()?, "Resolved config written");
        Ok(path)
    }
}

impl Packager for GradlePackager {
    fn package(&self, config: &ResolvedConfig, request: &PackageRequest) -> Result<PackageOutcome> {
        if !config.build_types().contains(&request.variant) {
            let known: Vec<&str> = config.build_types().iter().map(String::as_str).collect();
            return Err(Error::validation(format!(
                "Unknown build variant '{}'",
                request.variant
            ))
            .with_suggestion(format!("Known variants: {}", known.join(", "))));
        }

        let resolved_path = self.write_resolved(config)?;
        let gradle = self.gradle_command()?;
        let program = gradle.to_string_lossy();
        let task = task_name(&request.variant, request.bundle);

        info!(task = %task, project = %self.project_dir.display(), "Running Gradle");
        let exit_code = if self.streaming {
            run_command_streaming_in_dir(&program, &[&task], &self.project_dir)?
        } else {
            let result = run_command_in_dir(&program, &[&task], &self.project_dir)?;
            debug!(output = %result.combined_output(), "Gradle output");
            result.exit_code
        };

        Ok(PackageOutcome {
            task,
            exit_code,
            resolved_path,
        })
    }
}
