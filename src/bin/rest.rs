//! Rest CLI - Command-line interface for Synheart Rest
//!
//! Commands:
//! - estimate: Compute a bedtime from wake-up time, sleep goal and coffee intake
//! - doctor: Diagnose model artifact and environment
//! - schema: Print the model artifact schema

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chrono::Local;
use synheart_rest::alert::BedtimeAlert;
use synheart_rest::model::{LinearModelArtifact, LinearSleepModel, SleepModel, FEATURE_NAMES};
use synheart_rest::types::{CoffeeAmount, SleepAmount, TimeComponents};
use synheart_rest::{ComputeError, ModelConfiguration, RestProcessor, PRODUCER_NAME, REST_VERSION};

/// Rest - On-device bedtime estimation
#[derive(Parser)]
#[command(name = "rest")]
#[command(author = "Synheart AI Inc")]
#[command(version = REST_VERSION)]
#[command(about = "Estimate an ideal bedtime from a sleep model", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a bedtime
    Estimate {
        /// Model artifact path (overrides the config file)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Model configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wake-up time (HH:MM)
        #[arg(short, long)]
        wake: String,

        /// Desired sleep in hours (4-12, quarter-hour steps)
        #[arg(short, long, default_value = "8.0")]
        sleep: f64,

        /// Cups of coffee per day (1-20)
        #[arg(short, long, default_value = "1")]
        coffee: u32,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Diagnose model artifact and environment
    Doctor {
        /// Model artifact to check (overrides the config file)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Model configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the model artifact schema
    Schema {
        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Alert title and message
    Text,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "synheart_rest=debug"
    } else {
        "synheart_rest=warn"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    // stdout carries reports, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RestCliError> {
    match cli.command {
        Commands::Estimate {
            model,
            config,
            wake,
            sleep,
            coffee,
            output_format,
        } => cmd_estimate(
            model.as_deref(),
            config.as_deref(),
            &wake,
            sleep,
            coffee,
            output_format,
        ),

        Commands::Doctor {
            model,
            config,
            json,
        } => cmd_doctor(model.as_deref(), config.as_deref(), json),

        Commands::Schema { json_schema } => cmd_schema(json_schema),
    }
}

fn cmd_estimate(
    model: Option<&Path>,
    config: Option<&Path>,
    wake: &str,
    sleep: f64,
    coffee: u32,
    output_format: OutputFormat,
) -> Result<(), RestCliError> {
    // Input validation happens before the model is touched
    let sleep_amount = SleepAmount::new(sleep)?;
    let coffee_amount = CoffeeAmount::new(coffee)?;
    let wake_up = TimeComponents::parse(wake);

    let model_config = load_model_config(model, config)?;
    if model_config.artifact_path.is_none() {
        return Err(RestCliError::NoModel);
    }

    let result = RestProcessor::load(&model_config).and_then(|processor| {
        processor.report(
            Local::now().date_naive(),
            &wake_up,
            sleep_amount,
            coffee_amount,
        )
    });

    match output_format {
        OutputFormat::Text => {
            let alert = match &result {
                Ok(report) => BedtimeAlert::success_with_message(report.bedtime_display.as_str()),
                Err(e) => BedtimeAlert::failure(e),
            };
            println!("{}", alert.title);
            println!("{}", alert.message);
            result?;
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&result?)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&result?)?),
    }

    Ok(())
}

fn cmd_doctor(model: Option<&Path>, config: Option<&Path>, json: bool) -> Result<(), RestCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();
    let model_config = load_model_config(model, config)?;

    checks.push(DoctorCheck {
        name: "rest_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Rest version {}", REST_VERSION),
    });

    if let Some(model_path) = model_config.artifact_path.as_deref() {
        checks.push(check_model(model_path, &model_config));
    } else {
        checks.push(DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Warning,
            message: "No model artifact given (use --model or --config)".to_string(),
        });
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: REST_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Rest Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(RestCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Load the artifact directly so the doctor can report the real cause
fn check_model(path: &Path, config: &ModelConfiguration) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Error,
            message: format!("Model artifact does not exist: {}", path.display()),
        };
    }

    match LinearSleepModel::from_path(path, config) {
        Ok(model) => DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Ok,
            message: format!("Model '{}' loaded", model.name()),
        },
        Err(e) => DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    }
}

fn cmd_schema(json_schema: bool) -> Result<(), RestCliError> {
    if json_schema {
        println!("{}", get_artifact_json_schema());
    } else {
        println!("Model Artifact Schema (format_version 1)");
        println!();
        println!("- format_version: 1");
        println!("- name: model name used in reports");
        println!("- output: must be \"actual_sleep\"");
        println!("- output_unit: \"hours\" (default) or \"seconds\"");
        println!("- intercept: number");
        println!("- coefficients: {{ {} }}", FEATURE_NAMES.join(", "));
        println!();
        println!("Prediction = intercept + sum(coefficient * feature), where");
        println!("  wake            = wake-up time in seconds since midnight");
        println!("  estimated_sleep = desired sleep in hours");
        println!("  coffee          = cups of coffee per day");
        println!();
        println!("Example:");
        println!("{}", serde_json::to_string_pretty(&example_artifact())?);
    }

    Ok(())
}

// Helper functions

/// Config file first, then `--model` on top
fn load_model_config(
    model: Option<&Path>,
    config: Option<&Path>,
) -> Result<ModelConfiguration, RestCliError> {
    let mut model_config = match config {
        Some(path) => ModelConfiguration::from_json(&fs::read_to_string(path)?)?,
        None => ModelConfiguration::default(),
    };
    if let Some(path) = model {
        model_config.artifact_path = Some(path.to_path_buf());
    }
    Ok(model_config)
}

fn example_artifact() -> LinearModelArtifact {
    LinearModelArtifact {
        format_version: 1,
        name: "SleepCalculator".to_string(),
        output: "actual_sleep".to_string(),
        output_unit: Default::default(),
        intercept: 0.0,
        coefficients: FEATURE_NAMES
            .iter()
            .map(|name| (name.to_string(), 0.0))
            .collect(),
    }
}

fn get_artifact_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/rest.linear_model.v1.json",
        "title": "rest.linear_model.v1",
        "description": "Synheart Rest linear sleep model artifact",
        "type": "object",
        "required": ["format_version", "name", "output", "intercept", "coefficients"],
        "properties": {
            "format_version": { "type": "integer", "const": 1 },
            "name": { "type": "string" },
            "output": { "type": "string", "const": "actual_sleep" },
            "output_unit": { "type": "string", "enum": ["hours", "seconds"] },
            "intercept": { "type": "number" },
            "coefficients": {
                "type": "object",
                "required": FEATURE_NAMES,
                "additionalProperties": false,
                "properties": {
                    "wake": { "type": "number" },
                    "estimated_sleep": { "type": "number" },
                    "coffee": { "type": "number" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum RestCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoModel,
    DoctorFailed,
}

impl From<io::Error> for RestCliError {
    fn from(e: io::Error) -> Self {
        RestCliError::Io(e)
    }
}

impl From<ComputeError> for RestCliError {
    fn from(e: ComputeError) -> Self {
        RestCliError::Compute(e)
    }
}

impl From<serde_json::Error> for RestCliError {
    fn from(e: serde_json::Error) -> Self {
        RestCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RestCliError> for CliError {
    fn from(e: RestCliError) -> Self {
        match e {
            RestCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RestCliError::Compute(e) => CliError {
                code: e.code().to_string(),
                message: e.to_string(),
                hint: match e {
                    ComputeError::ModelLoad | ComputeError::Prediction => {
                        Some("Run 'rest doctor --model <path>' for details".to_string())
                    }
                    _ => None,
                },
            },
            RestCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RestCliError::NoModel => CliError {
                code: "NO_MODEL".to_string(),
                message: "No model artifact configured".to_string(),
                hint: Some("Pass --model or a --config with artifact_path".to_string()),
            },
            RestCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Debug, PartialEq, serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
