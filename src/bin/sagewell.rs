//! Sagewell CLI - Command-line interface for the wellness pipeline
//!
//! Commands:
//! - summarize: Aggregate samples into per-metric summaries
//! - analyze: Run the full pipeline against an in-memory store
//! - doctor: Diagnose analyst configuration without calling the service

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use sagewell::aggregate::SampleAggregator;
use sagewell::analyst::{AnalystConfig, API_KEY_ENV, MODEL_ENV, PLACEHOLDER_API_KEY};
use sagewell::catalog::InMemoryCatalog;
use sagewell::pipeline::WellnessProcessor;
use sagewell::store::InMemoryStore;
use sagewell::types::{MetricType, Practice, Sample};
use sagewell::{PRODUCER_NAME, SAGEWELL_VERSION};

/// Sagewell - Wellness analysis engine for wearable data
#[derive(Parser)]
#[command(name = "sagewell")]
#[command(author = "Sagewell Labs")]
#[command(version = SAGEWELL_VERSION)]
#[command(about = "Turn wearable samples into wellness scores and insights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate samples into per-metric summaries
    Summarize {
        /// Input file with a JSON array of samples (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Run the full analysis pipeline against an in-memory store
    Analyze {
        /// Input file with a JSON array of samples (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// User identifier the records are scoped to
        #[arg(long, default_value = "local-user")]
        user_id: String,

        /// Optional practice catalog file (JSON array of practices)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Diagnose analyst configuration without calling the service
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SagewellCliError> {
    match cli.command {
        Commands::Summarize {
            input,
            output_format,
        } => cmd_summarize(&input, output_format),

        Commands::Analyze {
            input,
            user_id,
            catalog,
            output_format,
        } => cmd_analyze(&input, &user_id, catalog.as_deref(), output_format),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn cmd_summarize(input: &PathBuf, output_format: OutputFormat) -> Result<(), SagewellCliError> {
    let samples = read_samples(input)?;
    let summary = SampleAggregator::summarize(&samples);

    // Render in canonical metric order
    let mut rendered = serde_json::Map::new();
    for metric in MetricType::ALL {
        if let Some(metric_summary) = summary.get(&metric) {
            rendered.insert(
                metric.as_str().to_string(),
                serde_json::to_value(metric_summary)?,
            );
        }
    }

    print_value(&serde_json::Value::Object(rendered), &output_format)?;
    Ok(())
}

fn cmd_analyze(
    input: &PathBuf,
    user_id: &str,
    catalog_path: Option<&std::path::Path>,
    output_format: OutputFormat,
) -> Result<(), SagewellCliError> {
    let samples = read_samples(input)?;

    let practices: Vec<Practice> = match catalog_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let processor = WellnessProcessor::new(
        Box::new(InMemoryCatalog::new(practices)),
        Box::new(InMemoryStore::new()),
    );

    let result = processor
        .process(user_id, &samples)
        .map_err(SagewellCliError::Pipeline)?;

    print_value(&serde_json::to_value(&result)?, &output_format)?;
    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), SagewellCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "sagewell_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Sagewell version {}", SAGEWELL_VERSION),
    });

    // Analyst credential status decides live vs mock analysis
    let analyst_check = match std::env::var(API_KEY_ENV) {
        Ok(key) if key == PLACEHOLDER_API_KEY => DoctorCheck {
            name: "analyst".to_string(),
            status: CheckStatus::Warning,
            message: format!("{API_KEY_ENV} is the placeholder key; mock analysis will be used"),
        },
        Ok(key) if key.is_empty() => DoctorCheck {
            name: "analyst".to_string(),
            status: CheckStatus::Warning,
            message: format!("{API_KEY_ENV} is empty; mock analysis will be used"),
        },
        Ok(_) => {
            let model = AnalystConfig::from_env()
                .map(|c| c.model)
                .unwrap_or_default();
            DoctorCheck {
                name: "analyst".to_string(),
                status: CheckStatus::Ok,
                message: format!("analyst configured (model: {model})"),
            }
        }
        Err(_) => DoctorCheck {
            name: "analyst".to_string(),
            status: CheckStatus::Warning,
            message: format!("{API_KEY_ENV} not set; mock analysis will be used"),
        },
    };
    checks.push(analyst_check);

    if let Ok(model) = std::env::var(MODEL_ENV) {
        checks.push(DoctorCheck {
            name: "model_override".to_string(),
            status: CheckStatus::Ok,
            message: format!("{MODEL_ENV}={model}"),
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
            message: "stdin is a pipe (ready for '-' input)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SAGEWELL_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sagewell Doctor Report");
        println!("======================");
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

    Ok(())
}

// Helper functions

fn read_samples(input: &PathBuf) -> Result<Vec<Sample>, SagewellCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let samples: Vec<Sample> = serde_json::from_str(&input_data)?;
    if samples.is_empty() {
        return Err(SagewellCliError::NoSamples);
    }
    Ok(samples)
}

fn print_value(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), SagewellCliError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum SagewellCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Pipeline(sagewell::PipelineError),
    NoSamples,
}

impl From<io::Error> for SagewellCliError {
    fn from(e: io::Error) -> Self {
        SagewellCliError::Io(e)
    }
}

impl From<serde_json::Error> for SagewellCliError {
    fn from(e: serde_json::Error) -> Self {
        SagewellCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SagewellCliError> for CliError {
    fn from(e: SagewellCliError) -> Self {
        match e {
            SagewellCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SagewellCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax; samples need dataType/value/timestamp".to_string()),
            },
            SagewellCliError::Pipeline(e) => CliError {
                code: "PIPELINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'sagewell doctor' to check configuration".to_string()),
            },
            SagewellCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No samples found in input".to_string(),
                hint: Some("Sync wearable data first; input must be a non-empty JSON array".to_string()),
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

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    #[allow(dead_code)]
    Error,
}
