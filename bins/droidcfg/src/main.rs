//! droidcfg CLI
//!
//! Resolves an Android application's build descriptor into a validated
//! configuration and hands it to Gradle.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use droidcfg_android::{
    Descriptor, GradlePackager, LayeredCatalog, PackageRequest, Packager, ResolvePolicy,
    ResolvedConfig, Resolver, StaticPluginRegistry,
};
use droidcfg_cli::output::{format_count, format_duration, format_list, Status};
use droidcfg_core::config::Config;
use droidcfg_core::error::{exit_codes, Error, ErrorCode};
use droidcfg_telemetry::{LogFormat, TelemetryConfig, Timer};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "droidcfg")]
#[command(about = "Resolve and validate Android build descriptors")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Reject release builds signed with the debug keys
    #[arg(long, global = true)]
    require_release_signing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a descriptor and print the configuration
    Resolve {
        /// Build descriptor (build.gradle.kts or .toml)
        descriptor: Option<PathBuf>,
        /// local.properties to read symbols from
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List known plugin ids
    Plugins,

    /// Resolve, then run the Gradle packaging task
    Package {
        /// Build descriptor (build.gradle.kts or .toml)
        descriptor: Option<PathBuf>,
        /// local.properties to read symbols from
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Build variant
        #[arg(long, default_value = "release")]
        variant: String,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Android project directory (holds gradlew)
        #[arg(long)]
        project_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let json = matches!(
        cli.command,
        Commands::Resolve {
            format: OutputFormat::Json,
            ..
        }
    );

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => std::process::exit(fail(&err, json)),
    };

    let format = match config.schema.logging.format.parse::<LogFormat>() {
        Ok(format) => format,
        Err(e) => {
            let err = Error::new(
                ErrorCode::InvalidConfigValue,
                format!("logging.format = {:?}: {}", config.schema.logging.format, e),
            );
            std::process::exit(fail(&err, json));
        }
    };

    let telemetry = TelemetryConfig {
        log_level: config.schema.logging.level.clone(),
        format,
        ..TelemetryConfig::default()
    }
    .with_verbosity(cli.verbose, cli.quiet);
    droidcfg_telemetry::init_with_config(telemetry)?;

    let ctx = Context {
        config,
        quiet: cli.quiet,
        policy: ResolvePolicy {
            require_release_signing: cli.require_release_signing,
        },
    };

    let exit_code = match cli.command {
        Commands::Resolve {
            descriptor,
            catalog,
            format,
        } => run_resolve(&ctx, descriptor, catalog, format),
        Commands::Plugins => run_plugins(&ctx),
        Commands::Package {
            descriptor,
            catalog,
            variant,
            bundle,
            project_dir,
        } => run_package(
            &ctx,
            descriptor,
            catalog,
            PackageRequest { variant, bundle },
            project_dir,
        ),
    };

    std::process::exit(exit_code);
}

struct Context {
    config: Config,
    quiet: bool,
    policy: ResolvePolicy,
}

impl Context {
    fn registry(&self) -> StaticPluginRegistry {
        StaticPluginRegistry::builtin()
            .with_plugins(self.config.schema.resolver.known_plugins.iter().cloned())
    }

    fn policy(&self) -> ResolvePolicy {
        ResolvePolicy {
            require_release_signing: self.policy.require_release_signing
                || self.config.schema.resolver.require_release_signing,
        }
    }

    fn descriptor_path(&self, arg: Option<PathBuf>) -> PathBuf {
        arg.unwrap_or_else(|| PathBuf::from(&self.config.schema.general.descriptor))
    }

    /// `--catalog`, else `[catalog] path`, else `<descriptor dir>/../local.properties` if present
    fn catalog(&self, descriptor: &Path, explicit: Option<PathBuf>) -> droidcfg_core::Result<LayeredCatalog> {
        let properties = match explicit {
            Some(path) => Some(path),
            None => match self.config.catalog_path()? {
                Some(path) => Some(path),
                None => default_properties(descriptor),
            },
        };

        if let Some(path) = &properties {
            tracing::debug!(path = %path.display(), "Using properties catalog");
        }
        Ok(LayeredCatalog::flutter(
            properties.as_deref(),
            &self.config.schema.catalog.overrides,
        ))
    }

    fn resolve(&self, descriptor: &Path, catalog: Option<PathBuf>) -> droidcfg_core::Result<ResolvedConfig> {
        let timer = Timer::start("resolve");
        let parsed = Descriptor::load(descriptor)?;
        let catalog = self.catalog(descriptor, catalog)?;
        let registry = self.registry();

        let resolved = Resolver::new(&registry, &catalog)
            .with_policy(self.policy())
            .resolve(&parsed)?;
        tracing::info!(elapsed = %format_duration(timer.stop()), "Resolution complete");
        Ok(resolved)
    }
}

fn default_properties(descriptor: &Path) -> Option<PathBuf> {
    let dir = descriptor.parent()?;
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    let path = dir.join("..").join("local.properties");
    path.is_file().then_some(path)
}

fn fail(err: &Error, json: bool) -> i32 {
    if json {
        match serde_json::to_string_pretty(&err.to_report()) {
            Ok(report) => println!("{}", report),
            Err(_) => Status::report(err),
        }
    } else {
        Status::report(err);
    }
    err.exit_code()
}

fn run_resolve(
    ctx: &Context,
    descriptor: Option<PathBuf>,
    catalog: Option<PathBuf>,
    format: OutputFormat,
) -> i32 {
    let json = format == OutputFormat::Json;
    let descriptor = ctx.descriptor_path(descriptor);

    let resolved = match ctx.resolve(&descriptor, catalog) {
        Ok(resolved) => resolved,
        Err(err) => return fail(&err, json),
    };

    if json {
        return match resolved.to_json() {
            Ok(out) => {
                println!("{}", out);
                exit_codes::SUCCESS
            }
            Err(e) => fail(&Error::from(e), json),
        };
    }

    let fingerprint = match resolved.fingerprint() {
        Ok(fingerprint) => fingerprint,
        Err(e) => return fail(&Error::from(e), json),
    };

    print_warnings(ctx, &resolved);
    print_resolved(&descriptor, &resolved, &fingerprint);
    exit_codes::SUCCESS
}

fn print_warnings(ctx: &Context, resolved: &ResolvedConfig) {
    if ctx.quiet {
        return;
    }
    for warning in resolved.warnings() {
        Status::warning(&warning.to_string());
    }
}

fn print_resolved(descriptor: &Path, resolved: &ResolvedConfig, fingerprint: &str) {
    Status::header(&format!("{} ({})", resolved.application_id(), descriptor.display()));

    Status::field("namespace", resolved.namespace());
    Status::field("applicationId", resolved.application_id());
    Status::field("compileSdk", &resolved.compile_sdk().to_string());
    Status::field("minSdk", &resolved.min_sdk().to_string());
    Status::field("targetSdk", &resolved.target_sdk().to_string());
    if let Some(ndk) = resolved.ndk_version() {
        Status::field("ndkVersion", ndk);
    }
    Status::field("versionCode", &resolved.version_code().to_string());
    Status::field("versionName", resolved.version_name());

    let compat = resolved.compatibility();
    let mut levels = format!("source {}, target {}", compat.source, compat.target);
    if let Some(jvm) = compat.jvm_target {
        levels.push_str(&format!(", jvm {}", jvm));
    }
    Status::field("java", &levels);

    Status::field("plugins", &format_list(resolved.plugins()));
    let build_types: Vec<&String> = resolved.build_types().iter().collect();
    Status::field("buildTypes", &format_list(&build_types));
    let signing: Vec<&String> = resolved.signing_configs().iter().collect();
    Status::field("signingConfigs", &format_list(&signing));
    Status::field(
        "release signing",
        match resolved.signing_config_for("release") {
            Some(config) if resolved.is_production_signed() => config,
            Some(_) => "debug keys (not for distribution)",
            None => "unsigned",
        },
    );

    let source = resolved
        .source_dir()
        .unwrap_or_else(|| resolved.source_root());
    Status::field("source", &source.display().to_string());
    Status::field("fingerprint", &fingerprint[..16]);
}

fn run_plugins(ctx: &Context) -> i32 {
    let registry = ctx.registry();
    if !ctx.quiet {
        Status::header(&format!(
            "Known plugins: {}",
            format_count(registry.len(), "id", "ids")
        ));
    }
    for id in registry.ids() {
        println!("{}", id);
    }
    exit_codes::SUCCESS
}

fn run_package(
    ctx: &Context,
    descriptor: Option<PathBuf>,
    catalog: Option<PathBuf>,
    request: PackageRequest,
    project_dir: Option<PathBuf>,
) -> i32 {
    let descriptor = ctx.descriptor_path(descriptor);
    let resolved = match ctx.resolve(&descriptor, catalog) {
        Ok(resolved) => resolved,
        Err(err) => return fail(&err, false),
    };
    print_warnings(ctx, &resolved);

    let project_dir =
        project_dir.unwrap_or_else(|| PathBuf::from(&ctx.config.schema.general.project_dir));
    let packager = GradlePackager::new(project_dir);

    if !ctx.quiet {
        Status::info(&format!(
            "Packaging {} {} ({})...",
            resolved.application_id(),
            request.variant,
            if request.bundle { "bundle" } else { "APK" }
        ));
    }

    let timer = Timer::start("package");
    match packager.package(&resolved, &request) {
        Ok(outcome) if outcome.success() => {
            if !ctx.quiet {
                Status::success(&format!(
                    "{} succeeded in {}",
                    outcome.task,
                    format_duration(timer.stop())
                ));
            }
            exit_codes::SUCCESS
        }
        Ok(outcome) => {
            let err = Error::new(
                ErrorCode::GradleError,
                format!("{} failed with exit code {}", outcome.task, outcome.exit_code),
            )
            .with_context(format!("resolved config at {}", outcome.resolved_path.display()));
            Status::report(&err);
            if outcome.exit_code > 0 {
                outcome.exit_code
            } else {
                exit_codes::FAILURE
            }
        }
        Err(err) => fail(&err, false),
    }
}
