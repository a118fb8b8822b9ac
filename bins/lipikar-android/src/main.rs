//! Lipikar Android CLI
//!
//! Release signing checks and Gradle packaging for the Lipikar Android app.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lipikar_android::build_config::{AndroidBuildConfig, BuildType};
use lipikar_android::packaging::{PackagingPlan, ReleaseSigning, SigningConfig};
use lipikar_android::{gradle, signing};
use lipikar_cli::output::{format_count, format_duration, format_size, Status};
use lipikar_cli::progress;
use lipikar_core::config::Config;
use lipikar_core::error::{exit_codes, Error, ErrorCode};
use lipikar_core::process;
use lipikar_telemetry::{TelemetryConfig, Timer};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lipikar-android")]
#[command(about = "Release signing and packaging for Lipikar Android")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Android project directory (overrides the config)
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect release signing credentials
    Signing {
        #[command(subcommand)]
        action: SigningAction,
    },

    /// Print the effective Android build descriptor
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the app with Gradle
    Build {
        /// Build the release variant
        #[arg(long)]
        release: bool,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Clean before building
        #[arg(long)]
        clean: bool,
        /// Print the packaging plan without running Gradle
        #[arg(long)]
        dry_run: bool,
    },

    /// Diagnose the release environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SigningAction {
    /// Show the credentials loaded from the keystore properties file
    Show {
        /// Keystore properties file (defaults to <project-dir>/key.properties)
        #[arg(long)]
        properties: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Print passwords instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Verify that a release build could be signed
    Check {
        /// Keystore properties file (defaults to <project-dir>/key.properties)
        #[arg(long)]
        properties: Option<PathBuf>,
    },
}

/// Paths shared by all commands
struct Workspace {
    config: Config,
    android_dir: PathBuf,
    default_key_properties: PathBuf,
}

impl Workspace {
    fn new(config: Config, project_dir: Option<PathBuf>) -> lipikar_core::Result<Self> {
        let android_dir = match project_dir {
            Some(dir) => dir,
            None => config.android_dir()?,
        };
        let default_key_properties = config.key_properties_in(&android_dir)?;
        Ok(Self {
            config,
            android_dir,
            default_key_properties,
        })
    }

    fn key_properties(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| self.default_key_properties.clone())
    }

    fn build_config(&self) -> lipikar_core::Result<AndroidBuildConfig> {
        AndroidBuildConfig::resolve(&self.config.schema.android, &self.android_dir)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::for_verbosity(cli.verbose, cli.quiet);
    if cli.no_color {
        owo_colors::set_override(false);
        telemetry = telemetry.without_ansi();
    }

    lipikar_telemetry::init_with_config(telemetry)?;

    let exit_code = match Config::load(cli.config.as_deref())
        .and_then(|config| Workspace::new(config, cli.project_dir))
    {
        Ok(ws) => match cli.command {
            Commands::Signing { action } => match action {
                SigningAction::Show {
                    properties,
                    json,
                    reveal,
                } => run_signing_show(&ws.key_properties(properties), json, reveal),
                SigningAction::Check { properties } => {
                    run_signing_check(&ws.key_properties(properties), cli.quiet)
                }
            },
            Commands::Config { json } => run_config(&ws, json),
            Commands::Build {
                release,
                bundle,
                clean,
                dry_run,
            } => {
                let build_type = if release {
                    BuildType::Release
                } else {
                    BuildType::Debug
                };
                run_build(&ws, build_type, bundle, clean, dry_run, cli.quiet)
            }
            Commands::Doctor { json } => run_doctor(&ws, json),
        },
        Err(e) => report_error(&e),
    };

    std::process::exit(exit_code);
}

/// Name the looked-up properties file when no credentials were found there
fn with_lookup_path(err: Error, path: &Path) -> Error {
    if err.code == ErrorCode::SigningUnavailable {
        err.with_context(format!("Looked for {}", path.display()))
    } else {
        err
    }
}

/// Print an error with its context and suggestion, returning its exit code
fn report_error(err: &Error) -> i32 {
    Status::error(&format!("[{}] {}", err.code, err.message));
    if let Some(ctx) = &err.context {
        eprintln!("  {}", ctx);
    }
    if let Some(suggestion) = &err.suggestion {
        eprintln!("  Suggestion: {}", suggestion);
    }
    err.exit_code()
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            exit_codes::SUCCESS
        }
        Err(e) => report_error(&e.into()),
    }
}

fn run_signing_show(path: &Path, json: bool, reveal: bool) -> i32 {
    let credentials = match signing::load(path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };

    let summary = credentials.as_ref().map(|c| c.summary(reveal));
    if json {
        return print_json(&summary);
    }

    let Some(summary) = summary else {
        Status::info("No release signing configured; debug builds are unaffected");
        return exit_codes::SUCCESS;
    };

    Status::header("Release signing");
    Status::field("Properties", Some(&summary.properties_path.display().to_string()));
    Status::field("Key alias", summary.key_alias.as_deref());
    Status::field("Key password", summary.key_password.as_deref());
    Status::field(
        "Store file",
        summary
            .store_file
            .as_ref()
            .map(|p| p.display().to_string())
            .as_deref(),
    );
    Status::field("Store password", summary.store_password.as_deref());
    println!();

    if !summary.missing_keys.is_empty() {
        Status::warning(&format!(
            "Missing {}: {}",
            format_count(summary.missing_keys.len(), "key", "keys"),
            summary.missing_keys.join(", ")
        ));
    } else if summary.store_file_exists == Some(false) {
        Status::warning("Keystore file does not exist");
    } else {
        Status::success("All signing values present");
    }

    exit_codes::SUCCESS
}

fn run_signing_check(path: &Path, quiet: bool) -> i32 {
    let result = signing::load(path)
        .and_then(|credentials| ReleaseSigning::from_credentials(credentials.as_ref()))
        .map_err(|e| with_lookup_path(e, path));

    match result {
        Ok(release) => {
            if !quiet {
                Status::success(&format!(
                    "Release signing ready: key '{}' in {}",
                    release.key_alias,
                    release.store_file.display()
                ));
            }
            exit_codes::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_config(ws: &Workspace, json: bool) -> i32 {
    let build = match ws.build_config() {
        Ok(b) => b,
        Err(e) => return report_error(&e),
    };

    if json {
        return print_json(&build);
    }

    Status::header("Android build descriptor");
    if let Some(path) = &ws.config.path {
        Status::field("Config file", Some(&path.display().to_string()));
    }
    Status::field("Namespace", Some(&build.namespace));
    Status::field("Application id", Some(&build.application_id));
    Status::field(
        "SDK",
        Some(&format!(
            "min {} / target {} / compile {}",
            build.min_sdk, build.target_sdk, build.compile_sdk
        )),
    );
    Status::field("Version code", Some(&build.version_code.to_string()));
    Status::field("Version name", build.version_name.as_deref());
    Status::field("NDK", build.ndk_version.as_deref());
    Status::field("Java", Some(&build.java_version.to_string()));
    Status::field(
        "Release minify",
        Some(if build.release.minify { "enabled" } else { "disabled" }),
    );
    for file in &build.release.proguard_files {
        Status::field("Proguard file", Some(&file.to_string()));
    }

    exit_codes::SUCCESS
}

fn run_build(
    ws: &Workspace,
    build_type: BuildType,
    bundle: bool,
    clean: bool,
    dry_run: bool,
    quiet: bool,
) -> i32 {
    let build = match ws.build_config() {
        Ok(b) => b,
        Err(e) => return report_error(&e),
    };

    // Debug builds use the built-in debug key and never read key.properties
    let key_properties = ws.key_properties(None);
    let credentials = match build_type {
        BuildType::Debug => None,
        BuildType::Release => match signing::load(&key_properties) {
            Ok(c) => c,
            Err(e) => return report_error(&e),
        },
    };

    let plan = match PackagingPlan::new(&build, build_type, credentials.as_ref()) {
        Ok(p) => p,
        Err(e) => return report_error(&with_lookup_path(e, &key_properties)),
    };

    let task = if bundle {
        build_type.bundle_task()
    } else {
        build_type.assemble_task()
    };

    if dry_run {
        let summary = plan.summary();
        Status::header(&format!("Packaging plan: {}", task));
        Status::field("Application id", Some(&summary.application_id));
        Status::field("Version code", Some(&summary.version_code.to_string()));
        Status::field("Version name", summary.version_name.as_deref());
        Status::field("Signing", Some(summary.signing));
        Status::field("Key alias", Some(&summary.key_alias));
        Status::field("Store file", Some(&summary.store_file.display().to_string()));
        Status::field("Minify", Some(if summary.minify { "yes" } else { "no" }));
        for file in &summary.proguard_files {
            Status::field("Proguard file", Some(file));
        }
        if let SigningConfig::Release(_) = plan.signing {
            for (name, _) in plan.gradle_env() {
                Status::field("Gradle env", Some(&name));
            }
        }
        return exit_codes::SUCCESS;
    }

    if clean {
        if !quiet {
            Status::info("Cleaning...");
        }
        match gradle::clean(&ws.android_dir) {
            Ok(r) if r.success => {}
            Ok(r) => {
                let err = Error::gradle(
                    format!("Gradle task clean failed with exit code {}", r.exit_code),
                    &r.combined_output(),
                );
                return report_error(&err);
            }
            Err(e) => return report_error(&e),
        }
    }

    let label = format!("Building {} {}...", build_type, if bundle { "bundle" } else { "APK" });
    let spinner = if quiet {
        progress::hidden()
    } else {
        progress::spinner(&label)
    };
    let timer = Timer::start(task);

    let result = if bundle {
        gradle::bundle(&ws.android_dir, &plan)
    } else {
        gradle::assemble(&ws.android_dir, &plan)
    };
    let elapsed = timer.stop();

    match result {
        Ok(r) if r.success => {
            progress::finish_success(
                &spinner,
                &format!("Build succeeded in {}", format_duration(elapsed)),
            );
            if let Some(artifact) = gradle::find_artifact(&ws.android_dir, build_type, bundle) {
                let size = std::fs::metadata(&artifact).map(|m| m.len()).unwrap_or(0);
                if !quiet {
                    Status::info(&format!("{} ({})", artifact.display(), format_size(size)));
                }
            }
            exit_codes::SUCCESS
        }
        Ok(r) => {
            progress::finish_error(&spinner, "Build failed");
            report_error(&Error::gradle(
                format!("Gradle task {} failed with exit code {}", task, r.exit_code),
                &r.combined_output(),
            ))
        }
        Err(e) => {
            progress::finish_error(&spinner, "Build error");
            report_error(&e)
        }
    }
}

#[derive(Serialize)]
struct Check {
    name: &'static str,
    ok: bool,
    required: bool,
    detail: String,
}

fn run_doctor(ws: &Workspace, json: bool) -> i32 {
    let tool = |name: &'static str, required: bool| {
        let path = process::which_command(name);
        Check {
            name,
            ok: path.is_some(),
            required,
            detail: path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not found in PATH".to_string()),
        }
    };
    let file = |name: &'static str, path: PathBuf, required: bool| Check {
        name,
        ok: path.is_file(),
        required,
        detail: path.display().to_string(),
    };

    let checks = vec![
        tool("java", true),
        tool("keytool", false),
        file(
            "gradle wrapper",
            ws.android_dir.join(gradle::wrapper_name()),
            true,
        ),
        file("key.properties", ws.key_properties(None), false),
        file(
            "debug keystore",
            lipikar_android::packaging::DebugSigning::builtin().store_file,
            false,
        ),
    ];

    let healthy = checks.iter().all(|c| c.ok || !c.required);

    if json {
        print_json(&checks);
    } else {
        Status::header("Environment");
        for check in &checks {
            let line = format!("{}: {}", check.name, check.detail);
            match (check.ok, check.required) {
                (true, _) => Status::success(&line),
                (false, true) => Status::error(&line),
                (false, false) => Status::warning(&line),
            }
        }
    }

    if healthy {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    }
}
