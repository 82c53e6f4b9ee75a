//! Command-line front end for the hearth FHIR R5 models
//!
//! `hearth validate` checks JSON resources, `hearth inspect` summarises one
//! and `hearth types` lists the resource types the models cover.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hearth_models::r5::resources::SUPPORTED_TYPES;
use hearth_models::{Preset, Resource, ValidationOutcome, Validator, ValidatorConfig};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(about = "Validate and inspect FHIR R5 resources")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate one or more JSON resources
    Validate {
        /// Files to validate
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// YAML validator configuration
        #[arg(long, short, env = "HEARTH_CONFIG", value_name = "PATH")]
        config: Option<PathBuf>,

        /// Configuration preset, ignored when --config is given
        #[arg(long, value_enum, default_value = "strict")]
        preset: PresetArg,

        /// Stop each file at its first error
        #[arg(long)]
        fail_fast: bool,

        /// Cap on issues reported per file
        #[arg(long, value_name = "N")]
        max_issues: Option<usize>,

        /// Output format
        #[arg(long, short = 'o', value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Summarise a resource: type, id and bundle contents
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List supported resource types
    Types,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Structural,
    Strict,
}

impl From<PresetArg> for Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Structural => Preset::Structural,
            PresetArg::Strict => Preset::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so stdout stays machine readable. `RUST_LOG` wins over
/// the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hearth={level},hearth_models={level}")));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Validate {
            files,
            config,
            preset,
            fail_fast,
            max_issues,
            format,
        } => {
            let config = load_config(config.as_deref(), preset.into(), fail_fast, max_issues)?;
            let validator = Validator::from_config(&config)?;
            validate_files(&validator, &files, format)
        }
        Commands::Inspect { file } => {
            inspect(&file)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Types => {
            for resource_type in SUPPORTED_TYPES {
                println!("{resource_type}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(
    path: Option<&Path>,
    preset: Preset,
    fail_fast: bool,
    max_issues: Option<usize>,
) -> Result<ValidatorConfig> {
    let mut config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading validator configuration");
            ValidatorConfig::from_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => ValidatorConfig::preset(preset),
    };

    if fail_fast {
        config.exec.fail_fast = true;
    }
    if let Some(max_issues) = max_issues {
        config.exec.max_issues = max_issues;
    }
    Ok(config)
}

fn read_json(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn validate_files(validator: &Validator, files: &[PathBuf], format: OutputFormat) -> Result<ExitCode> {
    let mut failed = 0usize;
    let mut reports = Vec::with_capacity(files.len());

    for path in files {
        // An unreadable file fails on its own and the rest still run
        let value = match read_json(path) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "skipping file");
                failed += 1;
                match format {
                    OutputFormat::Text => println!("{}: error: {err:#}", path.display()),
                    OutputFormat::Json => reports.push(json!({
                        "file": path.display().to_string(),
                        "error": format!("{err:#}"),
                    })),
                }
                continue;
            }
        };
        let outcome = validator.validate_value(&value);
        tracing::debug!(
            file = %path.display(),
            errors = outcome.error_count(),
            warnings = outcome.warning_count(),
            "validated"
        );
        if !outcome.valid {
            failed += 1;
        }

        match format {
            OutputFormat::Text => print_text(path, &outcome),
            OutputFormat::Json => reports.push(json_report(path, &outcome)?),
        }
    }

    if format == OutputFormat::Json {
        // A single readable file prints the bare OperationOutcome
        let document = if reports.len() == 1 && reports[0].get("outcome").is_some() {
            let mut report = reports.remove(0);
            report["outcome"].take()
        } else {
            Value::Array(reports)
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else if files.len() > 1 {
        println!("{} of {} file(s) failed validation", failed, files.len());
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_text(path: &Path, outcome: &ValidationOutcome) {
    let status = if outcome.valid { "valid" } else { "invalid" };
    println!(
        "{}: {} ({} error(s), {} warning(s))",
        path.display(),
        status,
        outcome.error_count(),
        outcome.warning_count()
    );
    for issue in &outcome.issues {
        println!("  {issue}");
    }
}

fn json_report(path: &Path, outcome: &ValidationOutcome) -> Result<Value> {
    let operation_outcome = serde_json::to_value(outcome.to_operation_outcome())?;
    Ok(json!({
        "file": path.display().to_string(),
        "outcome": operation_outcome,
    }))
}

fn inspect(path: &Path) -> Result<()> {
    let value = read_json(path)?;
    let resource = Resource::from_value(value)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    println!("resourceType: {}", resource.resource_type());
    println!("id: {}", resource.id().unwrap_or("-"));
    if let Some(version) = resource.meta().and_then(|meta| meta.version_id.as_deref()) {
        println!("versionId: {version}");
    }

    if let Some(bundle) = resource.as_bundle() {
        println!("type: {}", bundle.bundle_type);
        println!("entries: {}", bundle.entry_count());
        for (resource_type, count) in bundle.resource_type_counts() {
            println!("  {resource_type}: {count}");
        }
    }

    let unknown: Vec<&String> = resource
        .additional()
        .keys()
        .filter(|key| !key.starts_with('_'))
        .collect();
    if !unknown.is_empty() {
        tracing::warn!(count = unknown.len(), "resource carries unrecognized elements");
    }
    Ok(())
}
